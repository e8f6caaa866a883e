//! Obsidian math to KaTeX math.
//!
//! Inline math written as `$…$` becomes `\(…\)`. Display math written as
//! `$$…$$` already has the shape KaTeX expects and is left alone. Fenced code
//! blocks and inline code spans are never rewritten.
//!
//! Blowfish only loads KaTeX on pages that contain the `{{< katex >}}`
//! shortcode, so when a document has math and no shortcode one is inserted
//! right after the front matter, or after a `<!--more-->` summary divider
//! that closely follows it.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::front_matter;

/// The shortcode that makes Blowfish load KaTeX for a page.
pub const ACTIVATION_SHORTCODE: &str = "{{< katex >}}";

/// The summary divider the shortcode may follow.
pub const CONTENT_BREAK: &str = "<!--more-->";

/// How many characters after the front matter are searched for
/// [`CONTENT_BREAK`].
pub const CONTENT_BREAK_WINDOW: usize = 200;

static CODE_REGION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?s)```.*?```|`[^`\n]+`")
		.unwrap_or_else(|e| unreachable!("invalid code region pattern: {e}"))
});

static ACTIVATION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)\{\{<\s*katex\s*>")
		.unwrap_or_else(|e| unreachable!("invalid activation marker pattern: {e}"))
});

/// A slice of a document, either code or prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
	Code(&'a str),
	Text(&'a str),
}

/// Split `content` into code regions and the prose between them, in source
/// order. Concatenating the segments reproduces `content`.
fn segments(content: &str) -> Vec<Segment<'_>> {
	let mut segments = Vec::new();
	let mut last_end = 0;

	for code in CODE_REGION.find_iter(content) {
		if code.start() > last_end {
			segments.push(Segment::Text(&content[last_end..code.start()]));
		}
		segments.push(Segment::Code(code.as_str()));
		last_end = code.end();
	}

	if last_end < content.len() {
		segments.push(Segment::Text(&content[last_end..]));
	}

	segments
}

fn text_segments(content: &str) -> impl Iterator<Item = &str> {
	segments(content)
		.into_iter()
		.filter_map(|segment| {
			match segment {
				Segment::Text(text) => Some(text),
				Segment::Code(_) => None,
			}
		})
}

/// Byte ranges (delimiters included) of inline math spans in `text`.
///
/// A span opens with a `$` that is not next to another `$`, holds at least
/// one character and no `$` or newline, and closes with a `$` that is not
/// followed by another `$`. Display math delimiters therefore never match.
fn find_inline_math(text: &str) -> Vec<Range<usize>> {
	let bytes = text.as_bytes();
	let mut spans = Vec::new();
	let mut index = 0;

	while index < bytes.len() {
		let opens = bytes[index] == b'$'
			&& (index == 0 || bytes[index - 1] != b'$')
			&& bytes.get(index + 1).is_some_and(|&next| next != b'$');

		if opens {
			let mut close = index + 1;
			while close < bytes.len() && bytes[close] != b'$' && bytes[close] != b'\n' {
				close += 1;
			}

			let closes = close < bytes.len()
				&& bytes[close] == b'$'
				&& bytes.get(close + 1) != Some(&b'$');
			if closes {
				spans.push(index..close + 1);
				index = close + 1;
				continue;
			}
		}

		index += 1;
	}

	spans
}

/// Number of `$$ … $$` pairs in `text`.
fn count_block_math(text: &str) -> usize {
	let mut count = 0;
	let mut rest = text;

	while let Some(open) = rest.find("$$") {
		let after_open = &rest[open + 2..];
		let Some(close) = after_open.find("$$") else {
			break;
		};
		count += 1;
		rest = &after_open[close + 2..];
	}

	count
}

/// Whether inline math content was already converted by an earlier run.
fn is_converted(math: &str) -> bool {
	let trimmed = math.trim_start();
	trimmed.starts_with("\\(") || trimmed.starts_with("\\[")
}

/// Counts of math found outside code regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MathStats {
	/// Inline `$…$` spans.
	pub inline: usize,
	/// Display `$$…$$` blocks.
	pub block: usize,
}

impl MathStats {
	pub fn has_math(&self) -> bool {
		self.inline > 0 || self.block > 0
	}
}

/// Count the math in `content`, ignoring code regions.
pub fn scan_math(content: &str) -> MathStats {
	text_segments(content).fold(MathStats::default(), |mut stats, text| {
		stats.inline += find_inline_math(text).len();
		stats.block += count_block_math(text);
		stats
	})
}

/// Whether `content` holds any inline or display math, code regions
/// included. Used as the guard for [`convert_math`], so a document whose only
/// math sits in code still gets the KaTeX shortcode.
pub fn detect_math(content: &str) -> bool {
	!find_inline_math(content).is_empty() || count_block_math(content) > 0
}

/// Whether `content` declares the KaTeX shortcode anywhere.
pub fn has_activation_marker(content: &str) -> bool {
	ACTIVATION_MARKER.is_match(content)
}

/// Rewrite inline math spans to `\(…\)` outside code regions.
pub fn rewrite_inline_math(content: &str) -> String {
	let mut result = String::with_capacity(content.len() + 16);

	for segment in segments(content) {
		let text = match segment {
			Segment::Code(code) => {
				result.push_str(code);
				continue;
			}
			Segment::Text(text) => text,
		};

		let mut last_end = 0;
		for span in find_inline_math(text) {
			let math = &text[span.start + 1..span.end - 1];
			if is_converted(math) {
				continue;
			}
			result.push_str(&text[last_end..span.start]);
			result.push_str("\\(");
			result.push_str(math);
			result.push_str("\\)");
			last_end = span.end;
		}
		result.push_str(&text[last_end..]);
	}

	result
}

/// Insert the KaTeX shortcode after the front matter, or after a nearby
/// `<!--more-->`. Returns `None` when the document has no front matter.
pub fn insert_activation_marker(content: &str) -> Option<String> {
	let front_matter = front_matter::locate(content)?;
	let after_front_matter = &content[front_matter.end..];
	let window_len = after_front_matter
		.char_indices()
		.nth(CONTENT_BREAK_WINDOW)
		.map_or(after_front_matter.len(), |(offset, _)| offset);

	let (insert_at, insertion) = match after_front_matter[..window_len].find(CONTENT_BREAK) {
		Some(offset) => {
			(
				front_matter.end + offset + CONTENT_BREAK.len(),
				format!("\n\n{ACTIVATION_SHORTCODE}\n\n"),
			)
		}
		None => (front_matter.end, format!("\n{ACTIVATION_SHORTCODE}\n\n")),
	};

	let mut result = String::with_capacity(content.len() + insertion.len());
	result.push_str(&content[..insert_at]);
	result.push_str(&insertion);
	result.push_str(&content[insert_at..]);
	Some(result)
}

/// Convert math for KaTeX and make sure the page activates it.
///
/// Documents without any math are returned unchanged.
pub fn convert_math(content: &str) -> String {
	if !detect_math(content) {
		return content.to_string();
	}

	let rewritten = rewrite_inline_math(content);
	if has_activation_marker(&rewritten) {
		return rewritten;
	}

	match insert_activation_marker(&rewritten) {
		Some(activated) => activated,
		None => {
			tracing::debug!("math found but no front matter to anchor the katex shortcode");
			rewritten
		}
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;
	use similar_asserts::assert_eq;

	use super::*;

	#[test]
	fn rewrites_inline_math() {
		assert_eq!(
			convert_math("inline $x+y$ formula"),
			"inline \\(x+y\\) formula"
		);
	}

	#[test]
	fn leaves_block_math_unchanged() {
		let input = "$$\nx=y\n$$";

		assert_eq!(convert_math(input), input);
	}

	#[rstest]
	#[case::fenced("```\nlet price = $a$;\n```\n")]
	#[case::fenced_with_language("```bash\necho $HOME and $PATH\n```")]
	#[case::inline_code("use `$x$` literally")]
	fn never_rewrites_inside_code(#[case] input: &str) {
		assert_eq!(convert_math(input), input);
	}

	#[test]
	fn rewrites_around_code_regions() {
		assert_eq!(
			convert_math("$a$ then `$b$` then $c$"),
			"\\(a\\) then `$b$` then \\(c\\)"
		);
	}

	#[rstest]
	#[case::double_dollar_line("$$x$$", vec![])]
	#[case::after_unclosed_block("$$a$ b$", vec![3..7])]
	#[case::empty("$$", vec![])]
	#[case::newline_inside("$a\nb$", vec![])]
	#[case::simple("$a$", vec![0..3])]
	#[case::two_spans("$a$ and $b$", vec![0..3, 8..11])]
	#[case::closing_before_block("$a$$$", vec![])]
	#[case::unicode("é $α$", vec![3..7])]
	fn finds_inline_math(#[case] text: &str, #[case] expected: Vec<Range<usize>>) {
		assert_eq!(find_inline_math(text), expected);
	}

	#[test]
	fn skips_already_converted_math() {
		let input = "already $\\(x\\)$ done";

		assert_eq!(rewrite_inline_math(input), input);
	}

	#[test]
	fn counts_block_math_pairs() {
		assert_eq!(count_block_math("$$a$$ text $$\nb\n$$ $$"), 2);
	}

	#[test]
	fn inserts_marker_after_front_matter() {
		let input = "---\ntitle: Math\n---\nThe value $x$.\n";

		assert_eq!(
			convert_math(input),
			"---\ntitle: Math\n---\n\n{{< katex >}}\n\nThe value \\(x\\).\n"
		);
	}

	#[test]
	fn inserts_marker_after_nearby_content_break() {
		let input = "---\ntitle: Math\n---\nSummary.\n<!--more-->\n\n$$\nE=mc^2\n$$\n";

		assert_eq!(
			convert_math(input),
			"---\ntitle: Math\n---\nSummary.\n<!--more-->\n\n{{< katex >}}\n\n\n\n$$\nE=mc^2\n$$\n"
		);
	}

	#[test]
	fn ignores_distant_content_break() {
		let summary = "word ".repeat(50);
		let input = format!("---\ntitle: Math\n---\n{summary}\n<!--more-->\n$x$\n");
		let output = convert_math(&input);

		assert!(output.starts_with("---\ntitle: Math\n---\n\n{{< katex >}}\n\n"));
		assert_eq!(output.matches(ACTIVATION_SHORTCODE).count(), 1);
	}

	#[test]
	fn keeps_existing_marker() {
		let input = "---\ntitle: Math\n---\n{{<KaTeX >}}\n$x$\n";

		assert_eq!(
			convert_math(input),
			"---\ntitle: Math\n---\n{{<KaTeX >}}\n\\(x\\)\n"
		);
	}

	#[test]
	fn rewrites_without_front_matter_but_adds_no_marker() {
		assert_eq!(convert_math("just $x$\n"), "just \\(x\\)\n");
	}

	#[test]
	fn code_only_math_still_activates_katex() {
		let input = "---\ntitle: Code\n---\nUse `$x$` here\n";

		assert_eq!(
			convert_math(input),
			"---\ntitle: Code\n---\n\n{{< katex >}}\n\nUse `$x$` here\n"
		);
	}

	#[rstest]
	#[case::inline_code("`$x$`", true)]
	#[case::fenced("```\n$$\nx\n$$\n```", true)]
	#[case::lone_dollar("costs $5 today", false)]
	#[case::plain("no math", false)]
	fn detects_math_anywhere(#[case] content: &str, #[case] expected: bool) {
		assert_eq!(detect_math(content), expected);
	}

	#[test]
	fn conversion_is_idempotent() {
		let input = "---\ntitle: Math\n---\nLet $a^2 + b^2 = c^2$ hold.\n\n$$\n\\int f\n$$\n";
		let once = convert_math(input);

		assert_eq!(convert_math(&once), once);
	}

	#[test]
	fn scans_math_outside_code() {
		let stats = scan_math("$a$ `$b$` $$\nc\n$$");

		assert_eq!(stats, MathStats { inline: 1, block: 1 });
	}
}
