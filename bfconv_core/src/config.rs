use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::BfconvError;
use crate::BfconvResult;
use crate::ConvertOptions;
use crate::diagram::DiagramMatcher;
use crate::DiscoverOptions;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["bfconv.toml", ".bfconv.toml", ".config/bfconv.toml"];

/// Configuration loaded from a `bfconv.toml` file.
///
/// ```toml
/// pattern = "*.md"
/// recursive = true
/// disable_gitignore = false
///
/// [exclude]
/// patterns = ["drafts/", "*.private.md"]
///
/// [convert]
/// diagram = "mermaid"
/// list_fields = ["categories", "tags"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct BfconvConfig {
	/// File name glob selecting the documents to convert.
	#[serde(default)]
	pub pattern: Option<String>,
	/// Descend into subdirectories of the root.
	#[serde(default)]
	pub recursive: Option<bool>,
	/// When true, the root `.gitignore` is not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Settings for the conversion stages.
	#[serde(default)]
	pub convert: ConvertConfig,
}

/// Configuration for excluding files and directories from discovery.
///
/// Patterns follow gitignore syntax and are relative to the root. Supports
/// negation (`!pattern`) and directory markers (trailing `/`).
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertConfig {
	/// Fenced-block language to wrap in a diagram shortcode.
	#[serde(default)]
	pub diagram: Option<String>,
	/// Front matter fields collapsed into single-line arrays.
	#[serde(default)]
	pub list_fields: Option<Vec<String>>,
}

impl BfconvConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> BfconvResult<Option<BfconvConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: BfconvConfig =
			toml::from_str(&content).map_err(|e| BfconvError::ConfigParse(e.to_string()))?;

		tracing::debug!(path = %config_path.display(), "loaded config");
		Ok(Some(config))
	}

	/// Conversion settings with defaults filled in. Fails when
	/// `convert.diagram` is not a usable fence language.
	pub fn convert_options(&self) -> BfconvResult<ConvertOptions> {
		let defaults = ConvertOptions::default();
		let diagrams = match &self.convert.diagram {
			Some(keyword) => DiagramMatcher::new(keyword)?,
			None => defaults.diagrams,
		};

		Ok(ConvertOptions {
			diagrams,
			list_fields: self
				.convert
				.list_fields
				.clone()
				.unwrap_or(defaults.list_fields),
		})
	}

	/// Discovery settings with defaults filled in.
	pub fn discover_options(&self) -> DiscoverOptions {
		let defaults = DiscoverOptions::default();
		DiscoverOptions {
			pattern: self.pattern.clone().unwrap_or(defaults.pattern),
			recursive: self.recursive.unwrap_or(defaults.recursive),
			exclude_patterns: self.exclude.patterns.clone(),
			disable_gitignore: self.disable_gitignore,
		}
	}
}

#[cfg(test)]
mod tests {
	use similar_asserts::assert_eq;

	use super::*;
	use crate::AnyEmptyResult;

	#[test]
	fn missing_config_is_none() -> AnyEmptyResult {
		let tmp = tempfile::tempdir()?;

		assert!(BfconvConfig::load(tmp.path())?.is_none());
		Ok(())
	}

	#[test]
	fn loads_full_config() -> AnyEmptyResult {
		let tmp = tempfile::tempdir()?;
		std::fs::write(
			tmp.path().join("bfconv.toml"),
			r#"pattern = "*.markdown"
recursive = true
disable_gitignore = true

[exclude]
patterns = ["drafts/"]

[convert]
diagram = "plantuml"
list_fields = ["series"]
"#,
		)?;

		let config = BfconvConfig::load(tmp.path())?.ok_or("config not found")?;
		let discover = config.discover_options();
		let convert = config.convert_options()?;

		assert_eq!(discover.pattern, "*.markdown");
		assert!(discover.recursive);
		assert!(discover.disable_gitignore);
		assert_eq!(discover.exclude_patterns, vec!["drafts/"]);
		assert_eq!(convert.diagrams.keyword(), "plantuml");
		assert_eq!(convert.list_fields, vec!["series"]);
		Ok(())
	}

	#[test]
	fn empty_config_uses_defaults() -> AnyEmptyResult {
		let tmp = tempfile::tempdir()?;
		std::fs::write(tmp.path().join(".bfconv.toml"), "")?;

		let config = BfconvConfig::load(tmp.path())?.ok_or("config not found")?;

		assert_eq!(config.convert_options()?, ConvertOptions::default());
		assert_eq!(config.discover_options(), DiscoverOptions::default());
		Ok(())
	}

	#[test]
	fn prefers_root_config_over_dot_config() -> AnyEmptyResult {
		let tmp = tempfile::tempdir()?;
		std::fs::create_dir(tmp.path().join(".config"))?;
		std::fs::write(tmp.path().join(".config/bfconv.toml"), "pattern = \"*.txt\"")?;
		std::fs::write(tmp.path().join("bfconv.toml"), "pattern = \"*.md\"")?;

		assert_eq!(
			BfconvConfig::resolve_path(tmp.path()),
			Some(tmp.path().join("bfconv.toml"))
		);
		Ok(())
	}

	#[test]
	fn empty_diagram_keyword_is_rejected() -> AnyEmptyResult {
		let tmp = tempfile::tempdir()?;
		std::fs::write(tmp.path().join("bfconv.toml"), "[convert]\ndiagram = \"\"\n")?;

		let config = BfconvConfig::load(tmp.path())?.ok_or("config not found")?;

		assert!(matches!(
			config.convert_options(),
			Err(BfconvError::InvalidDiagramKeyword(_))
		));
		Ok(())
	}

	#[test]
	fn invalid_config_is_an_error() -> AnyEmptyResult {
		let tmp = tempfile::tempdir()?;
		std::fs::write(tmp.path().join("bfconv.toml"), "recursive = \"yes\"")?;

		let error = BfconvConfig::load(tmp.path()).expect_err("should fail to parse");

		assert!(matches!(error, BfconvError::ConfigParse(_)));
		Ok(())
	}
}
