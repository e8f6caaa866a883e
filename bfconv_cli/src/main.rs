use std::path::Path;
use std::path::PathBuf;
use std::process;

use bfconv_cli::BfconvCli;
use bfconv_cli::Commands;
use bfconv_cli::OutputFormat;
use bfconv_core::BatchReport;
use bfconv_core::BfconvConfig;
use bfconv_core::ConvertOptions;
use bfconv_core::DiscoverOptions;
use bfconv_core::DocumentOutcome;
use bfconv_core::DocumentStatus;
use bfconv_core::Findings;
use bfconv_core::Mode;
use bfconv_core::discover;
use bfconv_core::front_matter::FieldPatch;
use bfconv_core::patch_documents;
use bfconv_core::process_documents;
use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
	let args = BfconvCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Convert { dry_run, diff }) => run_convert(&args, *dry_run, *diff),
		Some(Commands::Check { diff, format }) => run_check(&args, *diff, *format),
		Some(Commands::SetField {
			key,
			value,
			after,
			dry_run,
		}) => {
			let mut patch = FieldPatch::new(key, value);
			if let Some(after) = after {
				patch = patch.after(after);
			}
			run_set_field(&args, &patch, *dry_run)
		}
		None => {
			eprintln!("No subcommand specified. Run `bfconv --help` for usage.");
			process::exit(1);
		}
	};

	match result {
		Ok(code) => process::exit(code),
		Err(e) => {
			// Try to render through miette for rich diagnostics with help text
			// and error codes.
			match e.downcast::<bfconv_core::BfconvError>() {
				Ok(bfconv_err) => {
					let report: miette::Report = (*bfconv_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr. `RUST_LOG` overrides the level picked by `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_filter = if verbose { "bfconv=debug" } else { "bfconv=warn" };
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_ansi(use_color),
		)
		.init();
}

fn resolve_root(args: &BfconvCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// The directory config files are looked up in.
fn config_root(root: &Path) -> &Path {
	if root.is_file() {
		root.parent().unwrap_or(root)
	} else {
		root
	}
}

/// Load the config and discover documents, letting CLI flags override the
/// config file.
fn load_run(args: &BfconvCli) -> CliResult<(PathBuf, Vec<PathBuf>, ConvertOptions)> {
	let root = resolve_root(args);
	let config = BfconvConfig::load(config_root(&root))?.unwrap_or_default();

	let mut discover_options: DiscoverOptions = config.discover_options();
	if let Some(pattern) = &args.pattern {
		discover_options.pattern.clone_from(pattern);
	}
	if args.recursive {
		discover_options.recursive = true;
	}

	tracing::debug!(
		root = %root.display(),
		pattern = %discover_options.pattern,
		recursive = discover_options.recursive,
		"resolved run options"
	);
	let convert_options = config.convert_options()?;
	let paths = discover(&root, &discover_options)?;
	Ok((root, paths, convert_options))
}

fn run_convert(args: &BfconvCli, dry_run: bool, show_diff: bool) -> CliResult<i32> {
	let (root, paths, options) = load_run(args)?;
	if paths.is_empty() {
		println!("No documents found.");
		return Ok(0);
	}

	let mode = if dry_run { Mode::Preview } else { Mode::Write };
	let report = process_documents(&paths, &options, mode);
	print_outcomes(&report, &root, show_diff, true);
	println!("{}", summary(&report, "converted"));

	if dry_run {
		println!("Dry run: no files were written.");
	}

	Ok(if report.has_failures() { 2 } else { 0 })
}

fn run_check(args: &BfconvCli, show_diff: bool, format: OutputFormat) -> CliResult<i32> {
	let (root, paths, options) = load_run(args)?;
	let report = process_documents(&paths, &options, Mode::Preview);
	let stale: Vec<&DocumentOutcome> = report
		.outcomes
		.iter()
		.filter(|outcome| outcome.is_changed())
		.collect();
	let failed: Vec<&DocumentOutcome> = report
		.outcomes
		.iter()
		.filter(|outcome| outcome.is_failed())
		.collect();

	match format {
		OutputFormat::Json => {
			let stale_entries: Vec<serde_json::Value> = stale
				.iter()
				.map(|outcome| {
					serde_json::json!({
						"file": make_relative(&outcome.path, &root),
						"stages": stage_names(&outcome.status),
					})
				})
				.collect();
			let error_entries: Vec<serde_json::Value> = failed
				.iter()
				.map(|outcome| {
					serde_json::json!({
						"file": make_relative(&outcome.path, &root),
						"message": status_message(&outcome.status),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": stale.is_empty() && failed.is_empty(),
				"stale": stale_entries,
				"errors": error_entries,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if stale.is_empty() && failed.is_empty() {
				println!(
					"Check passed: all {} document(s) are converted.",
					report.found()
				);
			} else {
				print_outcomes(&report, &root, show_diff, false);
				eprintln!();
				eprintln!(
					"Check failed: {} document(s) need converting, {} failed. Run `bfconv convert` \
					 to fix.",
					stale.len(),
					failed.len()
				);
			}
		}
	}

	Ok(if !failed.is_empty() {
		2
	} else if !stale.is_empty() {
		1
	} else {
		0
	})
}

fn run_set_field(args: &BfconvCli, patch: &FieldPatch, dry_run: bool) -> CliResult<i32> {
	let (root, paths, _) = load_run(args)?;
	if paths.is_empty() {
		println!("No documents found.");
		return Ok(0);
	}

	let mode = if dry_run { Mode::Preview } else { Mode::Write };
	let report = patch_documents(&paths, patch, mode);
	print_outcomes(&report, &root, false, true);
	println!("{}", summary(&report, "updated"));
	if report.skipped() > 0 {
		println!(
			"{} document(s) skipped because they have no front matter.",
			report.skipped()
		);
	}
	if dry_run {
		println!("Dry run: no files were written.");
	}

	Ok(if report.has_failures() { 2 } else { 0 })
}

fn summary(report: &BatchReport, changed_label: &str) -> String {
	format!(
		"Processed {} file(s): {} {changed_label}, {} failed.",
		report.found(),
		report.changed(),
		report.failed()
	)
}

/// Print one line per document. Unchanged documents are only listed when
/// `show_unchanged` is set.
fn print_outcomes(report: &BatchReport, root: &Path, show_diff: bool, show_unchanged: bool) {
	let preview = report.mode == Mode::Preview;

	for outcome in &report.outcomes {
		let rel = make_relative(&outcome.path, root);
		match &outcome.status {
			DocumentStatus::Changed { stages } => {
				if stages.is_empty() {
					let label = if preview { "would update" } else { "updated" };
					println!("{} {rel}", colored!(label, green));
				} else {
					let label = if preview { "would convert" } else { "converted" };
					let names: Vec<&str> = stages.iter().map(|stage| stage.name()).collect();
					println!(
						"{} {rel} ({})",
						colored!(label, green),
						names.join(", ")
					);
				}
				if preview {
					for finding in describe_findings(&outcome.findings) {
						println!("    {}", colored!(finding, dimmed));
					}
				}
				if show_diff {
					if let Some(texts) = &outcome.preview {
						print_diff(&texts.original, &texts.updated);
					}
				}
			}
			DocumentStatus::Unchanged => {
				if show_unchanged {
					println!("{} {rel}", colored!("unchanged", dimmed));
				}
			}
			DocumentStatus::Skipped(reason) => {
				println!("{} {rel}: {reason}", colored!("skipped", yellow));
			}
			DocumentStatus::Failed(error) => {
				println!("{} {rel}: {error}", colored!("error", red));
			}
		}
	}
}

fn describe_findings(findings: &Findings) -> Vec<String> {
	let mut lines = Vec::new();
	if findings.diagrams > 0 {
		lines.push(format!("diagram blocks: {}", findings.diagrams));
	}
	if !findings.callouts.is_empty() {
		lines.push(format!("callouts: {}", findings.callouts.join(", ")));
	}
	if findings.math.has_math() {
		lines.push(format!(
			"math: {} inline, {} block",
			findings.math.inline, findings.math.block
		));
	}
	if findings.marker_inserted {
		lines.push("katex shortcode added".to_string());
	}
	for field in &findings.list_fields {
		lines.push(format!("list field: {}", field.to_inline()));
	}
	lines
}

fn stage_names(status: &DocumentStatus) -> Vec<&'static str> {
	match status {
		DocumentStatus::Changed { stages } => stages.iter().map(|stage| stage.name()).collect(),
		_ => Vec::new(),
	}
}

fn status_message(status: &DocumentStatus) -> String {
	match status {
		DocumentStatus::Failed(error) | DocumentStatus::Skipped(error) => error.to_string(),
		DocumentStatus::Changed { .. } | DocumentStatus::Unchanged => String::new(),
	}
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("   {change}");
			}
		}
		if change.missing_newline() {
			println!();
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	if path == root {
		return path
			.file_name()
			.map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().to_string());
	}

	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
