use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn bfconv_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("bfconv"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

/// A note using every Obsidian feature the converter rewrites.
#[allow(dead_code)]
pub const OBSIDIAN_NOTE: &str = "---\ntitle: Note\ntags:\n  - rust\n---\n> [!warning] \
                                 Careful\n> body\n\nInline $x$.\n";
