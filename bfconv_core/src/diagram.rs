use regex::Captures;
use regex::Regex;

use crate::BfconvError;
use crate::BfconvResult;

/// Default fenced-block language rewritten into a diagram shortcode.
pub const DEFAULT_DIAGRAM_KEYWORD: &str = "mermaid";

/// Matches fenced blocks tagged with one diagram keyword.
///
/// The opening fence must carry exactly the keyword as its info string and
/// the closing fence must sit on its own line. The body is matched lazily so
/// consecutive diagrams stay separate. Both `\n` and `\r\n` line endings are
/// recognised.
#[derive(Debug, Clone)]
pub struct DiagramMatcher {
	keyword: String,
	pattern: Regex,
}

impl DiagramMatcher {
	/// Compile the matcher for `keyword`. The keyword must be non-empty and
	/// free of whitespace.
	pub fn new(keyword: &str) -> BfconvResult<Self> {
		if keyword.is_empty() || keyword.chars().any(char::is_whitespace) {
			return Err(BfconvError::InvalidDiagramKeyword(keyword.to_string()));
		}

		let pattern = format!(
			r"(?ms)^```{}[ \t]*\r?\n(.*?)\r?\n```[ \t]*\r?$",
			regex::escape(keyword)
		);
		// The keyword is escaped, so the pattern is always valid.
		let pattern =
			Regex::new(&pattern).unwrap_or_else(|e| unreachable!("invalid diagram pattern: {e}"));

		Ok(Self {
			keyword: keyword.to_string(),
			pattern,
		})
	}

	pub fn keyword(&self) -> &str {
		&self.keyword
	}

	/// Rewrite every matching fenced block into a
	/// `{{< keyword >}} … {{< /keyword >}}` shortcode. Diagram bodies are
	/// copied through untouched.
	pub fn convert(&self, content: &str) -> String {
		let keyword = &self.keyword;
		self.pattern
			.replace_all(content, |caps: &Captures<'_>| {
				let body = caps.get(1).map_or("", |m| m.as_str());
				let opening = caps[0].split('\n').next().unwrap_or_default();
				let newline = if opening.ends_with('\r') { "\r\n" } else { "\n" };
				let closing_cr = if caps[0].ends_with('\r') { "\r" } else { "" };
				format!(
					"{{{{< {keyword} >}}}}{newline}{body}{newline}{{{{< /{keyword} >}}}}{closing_cr}"
				)
			})
			.into_owned()
	}

	/// Return the bodies of every block [`DiagramMatcher::convert`] would
	/// rewrite.
	pub fn find<'a>(&self, content: &'a str) -> Vec<&'a str> {
		self.pattern
			.captures_iter(content)
			.filter_map(|caps| caps.get(1).map(|m| m.as_str()))
			.collect()
	}
}

impl Default for DiagramMatcher {
	fn default() -> Self {
		Self::new(DEFAULT_DIAGRAM_KEYWORD)
			.unwrap_or_else(|e| unreachable!("default diagram keyword rejected: {e}"))
	}
}

impl PartialEq for DiagramMatcher {
	fn eq(&self, other: &Self) -> bool {
		self.keyword == other.keyword
	}
}

impl Eq for DiagramMatcher {}
