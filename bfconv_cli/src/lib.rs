use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Convert Obsidian markdown notes into Hugo Blowfish content.",
	long_about = "bfconv rewrites Obsidian flavoured markdown into the shortcodes and front \
	              matter the Hugo Blowfish theme expects.\n\nMermaid fences become `{{< mermaid \
	              >}}` blocks, callouts become `{{< alert >}}` blocks, inline math is rewritten \
	              for KaTeX, and block-style `tags` and `categories` lists are collapsed into \
	              arrays.\n\nQuick start:\n  bfconv convert --dry-run  Preview what would \
	              change\n  bfconv convert            Convert every document in place\n  bfconv \
	              check              Fail when a document still needs converting"
)]
pub struct BfconvCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Directory containing the documents, or a single document.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// File name glob selecting documents. Defaults to `*.md`.
	#[arg(long, global = true)]
	pub pattern: Option<String>,

	/// Also process documents in subdirectories.
	#[arg(long, short, global = true, default_value_t = false)]
	pub recursive: bool,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Convert every discovered document in place.
	///
	/// Runs the diagram, callout, math and list field stages over each
	/// document and writes it back only when its text changed. A document
	/// that cannot be read or written is reported and the remaining
	/// documents are still converted.
	Convert {
		/// Preview changes without writing files. Lists the stages that
		/// would change each document and what they found.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Show a unified diff for each document that changes.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// Check that every document is already converted.
	///
	/// Exits with status 1 when any document would change. Ideal for CI
	/// pipelines that publish the converted content.
	Check {
		/// Show a unified diff for each document that would change.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Add a field to the front matter of every document.
	///
	/// Documents that already declare the key are left untouched, as are
	/// documents without front matter.
	SetField {
		/// The key to add, e.g. `showComments`.
		#[arg(long)]
		key: String,

		/// The YAML value written after the key.
		#[arg(long)]
		value: String,

		/// Insert the field directly after this key when present.
		#[arg(long)]
		after: Option<String>,

		/// Preview which documents would change without writing them.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
