mod common;

use bfconv_core::AnyEmptyResult;
use common::OBSIDIAN_NOTE;
use common::bfconv_cmd;
use predicates::prelude::*;
use similar_asserts::assert_eq;

#[test]
fn convert_rewrites_documents_in_place() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("note.md"), OBSIDIAN_NOTE)?;
	std::fs::write(tmp.path().join("plain.md"), "# Plain\n")?;

	bfconv_cmd()
		.arg("convert")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains(
			"converted note.md (callout, math, list-field)",
		))
		.stdout(predicate::str::contains("unchanged plain.md"))
		.stdout(predicate::str::contains(
			"Processed 2 file(s): 1 converted, 0 failed.",
		));

	let content = std::fs::read_to_string(tmp.path().join("note.md"))?;
	assert_eq!(
		content,
		"---\ntitle: Note\ntags: [\"rust\"]\n---\n\n{{< katex >}}\n\n{{< alert \"warning\" \
		 title=\"Careful\" >}}\nbody\n{{< /alert >}}\n\n\nInline \\(x\\).\n"
	);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("plain.md"))?,
		"# Plain\n"
	);

	Ok(())
}

#[test]
fn convert_twice_is_a_no_op() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("note.md"), OBSIDIAN_NOTE)?;

	bfconv_cmd()
		.arg("convert")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	let first = std::fs::read_to_string(tmp.path().join("note.md"))?;

	bfconv_cmd()
		.arg("convert")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("unchanged note.md"))
		.stdout(predicate::str::contains("0 converted"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("note.md"))?, first);

	Ok(())
}

#[test]
fn convert_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("note.md"), OBSIDIAN_NOTE)?;

	bfconv_cmd()
		.arg("convert")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("would convert note.md"))
		.stdout(predicate::str::contains("callouts: warning"))
		.stdout(predicate::str::contains("katex shortcode added"))
		.stdout(predicate::str::contains("Dry run: no files were written."));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("note.md"))?,
		OBSIDIAN_NOTE
	);

	Ok(())
}

#[test]
fn convert_diff_shows_changed_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("note.md"), OBSIDIAN_NOTE)?;

	bfconv_cmd()
		.arg("convert")
		.arg("--dry-run")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("-> [!warning] Careful"))
		.stdout(predicate::str::contains("+{{< alert \"warning\" title=\"Careful\" >}}"));

	Ok(())
}

#[test]
fn convert_respects_pattern_and_recursive_flags() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir(tmp.path().join("posts"))?;
	std::fs::write(tmp.path().join("posts/deep.markdown"), OBSIDIAN_NOTE)?;
	std::fs::write(tmp.path().join("top.md"), OBSIDIAN_NOTE)?;

	bfconv_cmd()
		.arg("convert")
		.arg("--recursive")
		.arg("--pattern")
		.arg("*.markdown")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Processed 1 file(s): 1 converted"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("top.md"))?,
		OBSIDIAN_NOTE
	);
	assert_ne!(
		std::fs::read_to_string(tmp.path().join("posts/deep.markdown"))?,
		OBSIDIAN_NOTE
	);

	Ok(())
}

#[test]
fn convert_uses_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("bfconv.toml"),
		"recursive = true\n\n[exclude]\npatterns = [\"drafts/\"]\n\n[convert]\nlist_fields = \
		 [\"series\"]\n",
	)?;
	std::fs::create_dir_all(tmp.path().join("drafts"))?;
	std::fs::create_dir_all(tmp.path().join("posts"))?;
	std::fs::write(tmp.path().join("drafts/wip.md"), OBSIDIAN_NOTE)?;
	std::fs::write(
		tmp.path().join("posts/series.md"),
		"---\nseries:\n  - Intro\ntags:\n  - kept\n---\n",
	)?;

	bfconv_cmd()
		.arg("convert")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Processed 1 file(s)"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("posts/series.md"))?,
		"---\nseries: [\"Intro\"]\ntags:\n  - kept\n---\n"
	);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("drafts/wip.md"))?,
		OBSIDIAN_NOTE
	);

	Ok(())
}

#[test]
fn convert_single_file_path() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("single.md");
	std::fs::write(&file, "```mermaid\ngraph TD\n```\n")?;

	bfconv_cmd()
		.arg("convert")
		.arg("--path")
		.arg(&file)
		.assert()
		.success()
		.stdout(predicate::str::contains("converted single.md (diagram)"));

	assert_eq!(
		std::fs::read_to_string(&file)?,
		"{{< mermaid >}}\ngraph TD\n{{< /mermaid >}}\n"
	);

	Ok(())
}

#[test]
fn convert_missing_root_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	bfconv_cmd()
		.arg("convert")
		.arg("--path")
		.arg(tmp.path().join("missing"))
		.assert()
		.code(2)
		.stderr(predicate::str::contains("directory does not exist"));

	Ok(())
}

#[test]
fn convert_invalid_config_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("bfconv.toml"), "recursive = \"yes\"\n")?;

	bfconv_cmd()
		.arg("convert")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn convert_reports_unreadable_documents_and_continues() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("good.md"), OBSIDIAN_NOTE)?;
	std::fs::write(tmp.path().join("bad.md"), [0xff, 0xfe, 0x00])?;

	bfconv_cmd()
		.arg("convert")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stdout(predicate::str::contains("error bad.md"))
		.stdout(predicate::str::contains("converted good.md"))
		.stdout(predicate::str::contains(
			"Processed 2 file(s): 1 converted, 1 failed.",
		));

	Ok(())
}

#[test]
fn no_subcommand_prints_hint() {
	bfconv_cmd()
		.assert()
		.code(1)
		.stderr(predicate::str::contains("No subcommand specified"));
}
