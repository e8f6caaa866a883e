//! Obsidian callouts to Blowfish `alert` shortcodes.
//!
//! ```text
//! > [!warning] Careful            {{< alert "warning" title="Careful" >}}
//! > line one              →       line one
//! > line two                      line two
//!                                 {{< /alert >}}
//! ```
//!
//! The scanner is a two-state automaton driven by a line cursor. While
//! scanning, a header line opens a callout; while inside a callout, every
//! blockquote line is collected into the body and the first other line closes
//! the callout and is then handled as an ordinary line.

use std::sync::LazyLock;

use regex::Regex;

static CALLOUT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)^\s{0,3}>\s*\[!(?P<type>[^\]\s]+)\]\s*(?P<modifier>[+-])?\s*(?P<title>.*)$")
		.unwrap_or_else(|e| unreachable!("invalid callout header pattern: {e}"))
});

static BLOCKQUOTE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s{0,3}>\s?")
		.unwrap_or_else(|e| unreachable!("invalid blockquote pattern: {e}"))
});

/// Map an Obsidian callout type onto a Blowfish alert style.
///
/// Returns `None` for the quote category, which renders without a style.
/// Unknown types keep their own lowercased name.
pub fn style_key(callout_type: &str) -> Option<String> {
	let lowered = callout_type.to_lowercase();
	let canonical = match lowered.as_str() {
		"note" | "todo" | "abstract" | "summary" | "tldr" | "example" => "note",
		"info" | "important" | "question" | "help" | "faq" => "info",
		"tip" | "hint" => "tip",
		"success" | "check" | "done" => "success",
		"warning" | "caution" | "attention" => "warning",
		"failure" | "fail" | "missing" | "danger" | "error" | "bug" => "danger",
		"quote" => return None,
		_ => return Some(lowered),
	};

	Some(canonical.to_string())
}

/// A parsed callout ready to be emitted as an alert shortcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callout {
	/// The type tag exactly as written, e.g. `Warning`.
	pub callout_type: String,
	/// The style key derived from the type.
	pub style: Option<String>,
	/// The free-text title after the type tag, if any.
	pub title: Option<String>,
	/// Body lines with their blockquote prefix removed.
	pub body: Vec<String>,
}

impl Callout {
	/// Parse a callout header line.
	pub fn from_header(line: &str) -> Option<Self> {
		let caps = CALLOUT_HEADER.captures(line)?;
		let callout_type = caps.name("type")?.as_str().trim().to_string();
		let title = caps
			.name("title")
			.map(|m| m.as_str().trim())
			.filter(|title| !title.is_empty())
			.map(str::to_string);

		Some(Self {
			style: style_key(&callout_type),
			callout_type,
			title,
			body: Vec::new(),
		})
	}

	/// The explicit title, or the capitalized type tag.
	pub fn effective_title(&self) -> String {
		match &self.title {
			Some(title) => title.clone(),
			None => capitalize(&self.callout_type),
		}
	}

	/// The `{{< alert … >}}` opening line.
	pub fn opening(&self) -> String {
		let mut opening = String::from("{{< alert");
		if let Some(style) = &self.style {
			opening.push_str(&format!(" \"{style}\""));
		}
		opening.push_str(&format!(" title=\"{}\"", self.effective_title()));
		opening.push_str(" >}}");
		opening
	}

	fn trim_trailing_blank_lines(&mut self) {
		while self.body.last().is_some_and(|line| line.trim().is_empty()) {
			self.body.pop();
		}
	}

	fn emit(mut self, output: &mut Vec<String>) {
		self.trim_trailing_blank_lines();
		output.push(self.opening());
		output.extend(self.body);
		output.push("{{< /alert >}}".to_string());
		output.push(String::new());
	}
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(value: &str) -> String {
	let mut chars = value.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}

fn strip_blockquote_prefix(line: &str) -> Option<&str> {
	BLOCKQUOTE_PREFIX.find(line).map(|m| &line[m.end()..])
}

enum State {
	Scanning,
	InCallout(Callout),
}

/// Rewrite every callout in `content` into an alert shortcode block.
///
/// Content without a callout header is returned unchanged.
pub fn convert_callouts(content: &str) -> String {
	let lines: Vec<&str> = content.lines().collect();
	if !lines.iter().any(|line| CALLOUT_HEADER.is_match(line)) {
		return content.to_string();
	}

	let mut output: Vec<String> = Vec::with_capacity(lines.len());
	let mut state = State::Scanning;
	let mut cursor = 0;

	while cursor < lines.len() {
		let line = lines[cursor];
		state = match state {
			State::Scanning => {
				cursor += 1;
				match Callout::from_header(line) {
					Some(callout) => State::InCallout(callout),
					None => {
						output.push(line.to_string());
						State::Scanning
					}
				}
			}
			State::InCallout(mut callout) => {
				match strip_blockquote_prefix(line) {
					Some(stripped) => {
						callout.body.push(stripped.to_string());
						cursor += 1;
						State::InCallout(callout)
					}
					// The closing line is not consumed; the next iteration
					// handles it while scanning.
					None => {
						callout.emit(&mut output);
						State::Scanning
					}
				}
			}
		};
	}

	if let State::InCallout(callout) = state {
		callout.emit(&mut output);
	}

	let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
	let mut result = output.join(newline);
	if content.ends_with('\n') && !result.ends_with('\n') {
		result.push_str(newline);
	}
	result
}

/// The type tags of every callout header in `content`, in source order.
pub fn find_callout_types(content: &str) -> Vec<String> {
	content
		.lines()
		.filter_map(Callout::from_header)
		.map(|callout| callout.callout_type)
		.collect()
}
