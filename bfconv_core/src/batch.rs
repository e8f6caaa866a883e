use std::path::Path;
use std::path::PathBuf;

use crate::front_matter::FieldInsertion;
use crate::front_matter::FieldPatch;
use crate::front_matter::insert_field;
use crate::pipeline::ConvertOptions;
use crate::pipeline::Findings;
use crate::pipeline::Stage;
use crate::pipeline::convert;
use crate::BfconvError;

/// Whether a batch writes its results back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	/// Write every changed document.
	Write,
	/// Compute changes without writing anything.
	Preview,
}

/// What happened to a single document.
#[derive(Debug)]
pub enum DocumentStatus {
	/// The document changed, or would change in preview mode. `stages` lists
	/// the conversion stages responsible and is empty for field patches.
	Changed { stages: Vec<Stage> },
	/// Nothing to do.
	Unchanged,
	/// The document cannot take the change and was left alone.
	Skipped(BfconvError),
	/// Reading or writing the document failed.
	Failed(BfconvError),
}

/// The original and rewritten text of a changed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
	pub original: String,
	pub updated: String,
}

#[derive(Debug)]
pub struct DocumentOutcome {
	pub path: PathBuf,
	pub status: DocumentStatus,
	/// What the conversion found in the original text.
	pub findings: Findings,
	pub preview: Option<Preview>,
}

impl DocumentOutcome {
	pub fn is_changed(&self) -> bool {
		matches!(self.status, DocumentStatus::Changed { .. })
	}

	pub fn is_failed(&self) -> bool {
		matches!(self.status, DocumentStatus::Failed(_))
	}
}

/// Outcomes for every document in a batch, in processing order.
#[derive(Debug)]
pub struct BatchReport {
	pub mode: Mode,
	pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
	/// Number of documents processed.
	pub fn found(&self) -> usize {
		self.outcomes.len()
	}

	pub fn changed(&self) -> usize {
		self.outcomes.iter().filter(|outcome| outcome.is_changed()).count()
	}

	pub fn unchanged(&self) -> usize {
		self.outcomes
			.iter()
			.filter(|outcome| matches!(outcome.status, DocumentStatus::Unchanged))
			.count()
	}

	pub fn skipped(&self) -> usize {
		self.outcomes
			.iter()
			.filter(|outcome| matches!(outcome.status, DocumentStatus::Skipped(_)))
			.count()
	}

	pub fn failed(&self) -> usize {
		self.outcomes.iter().filter(|outcome| outcome.is_failed()).count()
	}

	pub fn has_failures(&self) -> bool {
		self.outcomes.iter().any(DocumentOutcome::is_failed)
	}
}

/// A single document's rewrite, before anything touches the disk.
enum Rewrite {
	Changed {
		content: String,
		stages: Vec<Stage>,
		findings: Findings,
	},
	Unchanged {
		findings: Findings,
	},
	Skipped(BfconvError),
}

fn process_one(
	path: &Path,
	mode: Mode,
	rewrite: &mut impl FnMut(&Path, &str) -> Rewrite,
) -> DocumentOutcome {
	let failed = |error: BfconvError| {
		tracing::warn!(path = %path.display(), %error, "failed to process document");
		DocumentOutcome {
			path: path.to_path_buf(),
			status: DocumentStatus::Failed(error),
			findings: Findings::default(),
			preview: None,
		}
	};

	let original = match std::fs::read_to_string(path) {
		Ok(content) => content,
		Err(source) => {
			return failed(BfconvError::InputAccess {
				path: path.to_path_buf(),
				source,
			});
		}
	};

	match rewrite(path, &original) {
		Rewrite::Unchanged { findings } => {
			tracing::debug!(path = %path.display(), "document unchanged");
			DocumentOutcome {
				path: path.to_path_buf(),
				status: DocumentStatus::Unchanged,
				findings,
				preview: None,
			}
		}
		Rewrite::Skipped(reason) => {
			tracing::debug!(path = %path.display(), %reason, "document skipped");
			DocumentOutcome {
				path: path.to_path_buf(),
				status: DocumentStatus::Skipped(reason),
				findings: Findings::default(),
				preview: None,
			}
		}
		Rewrite::Changed {
			content,
			stages,
			findings,
		} => {
			if mode == Mode::Write {
				if let Err(source) = std::fs::write(path, &content) {
					let mut outcome = failed(BfconvError::OutputAccess {
						path: path.to_path_buf(),
						source,
					});
					outcome.findings = findings;
					return outcome;
				}
				tracing::info!(path = %path.display(), "wrote document");
			}

			DocumentOutcome {
				path: path.to_path_buf(),
				status: DocumentStatus::Changed { stages },
				findings,
				preview: Some(Preview {
					original,
					updated: content,
				}),
			}
		}
	}
}

fn run_batch(
	paths: &[PathBuf],
	mode: Mode,
	mut rewrite: impl FnMut(&Path, &str) -> Rewrite,
) -> BatchReport {
	let outcomes = paths
		.iter()
		.map(|path| process_one(path, mode, &mut rewrite))
		.collect();

	BatchReport { mode, outcomes }
}

/// Run the conversion pipeline over every document in `paths`.
///
/// Each document is handled on its own: a read or write failure is recorded
/// in its outcome and the batch moves on. A document is only written when
/// its converted text differs from the original.
pub fn process_documents(paths: &[PathBuf], options: &ConvertOptions, mode: Mode) -> BatchReport {
	run_batch(paths, mode, |_, original| {
		let conversion = convert(original, options);
		if conversion.is_changed() {
			Rewrite::Changed {
				content: conversion.content,
				stages: conversion.changed_stages,
				findings: conversion.findings,
			}
		} else {
			Rewrite::Unchanged {
				findings: conversion.findings,
			}
		}
	})
}

/// Add a front matter field to every document in `paths`.
///
/// Documents that already declare the key are unchanged. Documents without
/// front matter are skipped.
pub fn patch_documents(paths: &[PathBuf], patch: &FieldPatch, mode: Mode) -> BatchReport {
	run_batch(paths, mode, |path, original| {
		match insert_field(original, patch) {
			FieldInsertion::Inserted(content) => {
				Rewrite::Changed {
					content,
					stages: Vec::new(),
					findings: Findings::default(),
				}
			}
			FieldInsertion::AlreadyPresent => {
				Rewrite::Unchanged {
					findings: Findings::default(),
				}
			}
			FieldInsertion::NoFrontMatter => {
				Rewrite::Skipped(BfconvError::MalformedMetadata {
					path: path.to_path_buf(),
				})
			}
		}
	})
}
