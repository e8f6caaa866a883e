use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobMatcher;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::BfconvError;
use crate::BfconvResult;

/// Default file name glob for documents.
pub const DEFAULT_PATTERN: &str = "*.md";

/// How to find the documents under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverOptions {
	/// Glob matched against each file name, or against the path relative to
	/// the root when it contains a `/`.
	pub pattern: String,
	/// Descend into subdirectories.
	pub recursive: bool,
	/// Gitignore-style patterns for files and directories to skip.
	pub exclude_patterns: Vec<String>,
	/// Ignore the root `.gitignore`.
	pub disable_gitignore: bool,
}

impl Default for DiscoverOptions {
	fn default() -> Self {
		Self {
			pattern: DEFAULT_PATTERN.to_string(),
			recursive: false,
			exclude_patterns: Vec::new(),
			disable_gitignore: false,
		}
	}
}

struct Walker {
	root: PathBuf,
	matcher: GlobMatcher,
	recursive: bool,
	gitignore: Gitignore,
	custom_exclude: Gitignore,
	visited_dirs: HashSet<PathBuf>,
}

/// Find every document under `root` matching `options`, sorted by path.
///
/// A `root` that is itself a file is returned as the only document.
pub fn discover(root: &Path, options: &DiscoverOptions) -> BfconvResult<Vec<PathBuf>> {
	if !root.exists() {
		return Err(BfconvError::MissingRoot {
			path: root.to_path_buf(),
		});
	}

	if root.is_file() {
		return Ok(vec![root.to_path_buf()]);
	}

	let matcher = build_matcher(&options.pattern)?;
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;

	let mut walker = Walker {
		root: root.to_path_buf(),
		matcher,
		recursive: options.recursive,
		gitignore,
		custom_exclude,
		visited_dirs: HashSet::new(),
	};
	let mut files = Vec::new();
	walker.walk_dir(root, &mut files)?;

	files.sort();
	tracing::debug!(count = files.len(), root = %root.display(), "discovered documents");
	Ok(files)
}

fn build_matcher(pattern: &str) -> BfconvResult<GlobMatcher> {
	Glob::new(pattern)
		.map(|glob| glob.compile_matcher())
		.map_err(|e| {
			BfconvError::InvalidPattern {
				pattern: pattern.to_string(),
				reason: e.kind().to_string(),
			}
		})
}

/// Build a `Gitignore` matcher from `[exclude]` patterns. These follow
/// `.gitignore` syntax and are applied on top of any `.gitignore` rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> BfconvResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			BfconvError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}
	builder.build().map_err(|e| {
		BfconvError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from the root's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::warn!(path = %gitignore_path.display(), %error, "skipping unreadable .gitignore");
		}
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

impl Walker {
	fn walk_dir(&mut self, dir: &Path, files: &mut Vec<PathBuf>) -> BfconvResult<()> {
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !self.visited_dirs.insert(canonical) {
			tracing::debug!(path = %dir.display(), "skipping already visited directory");
			return Ok(());
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();
			let is_dir = path.is_dir();

			if is_dir
				&& path
					.file_name()
					.and_then(|name| name.to_str())
					.is_some_and(is_ignored_directory_name)
			{
				continue;
			}

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.custom_exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				if self.recursive {
					self.walk_dir(&path, files)?;
				}
			} else if self.is_document(&path) {
				files.push(path);
			}
		}

		Ok(())
	}

	fn is_document(&self, path: &Path) -> bool {
		if self.matcher.glob().glob().contains('/') {
			return path
				.strip_prefix(&self.root)
				.is_ok_and(|relative| self.matcher.is_match(relative));
		}

		path.file_name()
			.is_some_and(|name| self.matcher.is_match(Path::new(name)))
	}
}
