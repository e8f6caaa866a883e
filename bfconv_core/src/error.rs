use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum BfconvError {
	#[error(transparent)]
	#[diagnostic(code(bfconv::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read `{}`: {source}", path.display())]
	#[diagnostic(
		code(bfconv::input_access),
		help("check that the file exists, is readable and is valid UTF-8")
	)]
	InputAccess {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write `{}`: {source}", path.display())]
	#[diagnostic(
		code(bfconv::output_access),
		help("check that the file is writable")
	)]
	OutputAccess {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("no front matter found in `{}`", path.display())]
	#[diagnostic(
		code(bfconv::malformed_metadata),
		help("front matter must start on the first line with `---` and be closed by another `---` line")
	)]
	MalformedMetadata { path: PathBuf },

	#[error("directory does not exist: `{}`", path.display())]
	#[diagnostic(code(bfconv::missing_root))]
	MissingRoot { path: PathBuf },

	#[error("invalid file pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(bfconv::invalid_pattern),
		help("use a glob such as `*.md` or `*.{{md,markdown}}`")
	)]
	InvalidPattern { pattern: String, reason: String },

	#[error("invalid diagram keyword `{0}`")]
	#[diagnostic(
		code(bfconv::invalid_diagram_keyword),
		help("set `convert.diagram` to a fenced-block language such as `mermaid`")
	)]
	InvalidDiagramKeyword(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(bfconv::config_parse),
		help("check that bfconv.toml is valid TOML with optional [exclude] and [convert] sections")
	)]
	ConfigParse(String),
}

impl BfconvError {
	/// The document path this error refers to, if it is a per-document error.
	pub fn path(&self) -> Option<&PathBuf> {
		match self {
			Self::InputAccess { path, .. }
			| Self::OutputAccess { path, .. }
			| Self::MalformedMetadata { path } => Some(path),
			_ => None,
		}
	}
}

pub type BfconvResult<T> = Result<T, BfconvError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
