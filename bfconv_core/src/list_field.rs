//! Block-style YAML lists in front matter to single-line arrays.
//!
//! ```text
//! tags:                 tags: ["rust","hugo"]
//!   - rust        →
//!   - hugo
//! ```
//!
//! Only the front matter is rewritten. Bullet lines in the body are never
//! touched, and a `---` thematic break is never mistaken for an item because
//! the dash must be followed by whitespace.

use std::ops::Range;

use crate::front_matter;
use crate::front_matter::Line;
use crate::front_matter::LineOffsets;

/// Field names collapsed when no configuration overrides them.
pub const DEFAULT_LIST_FIELDS: [&str; 2] = ["categories", "tags"];

/// A recognised list field found in front matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListField {
	/// The key as written in the document.
	pub key: String,
	/// The item values, trimmed, in source order.
	pub items: Vec<String>,
}

impl ListField {
	/// Render as `key: ["a","b"]`.
	pub fn to_inline(&self) -> String {
		let items: Vec<String> = self.items.iter().map(|item| format!("\"{item}\"")).collect();
		format!("{}: [{}]", self.key, items.join(","))
	}
}

/// A field together with the body lines it occupies.
struct FieldRun {
	field: ListField,
	lines: Range<usize>,
}

fn strip_cr(line: &str) -> &str {
	line.strip_suffix('\r').unwrap_or(line)
}

/// The key of a `key:` line with no inline value, when `key` is one of
/// `fields` (compared case-insensitively).
fn list_field_key<'a, S: AsRef<str>>(line: &'a str, fields: &[S]) -> Option<&'a str> {
	let line = strip_cr(line);
	let key = front_matter::field_key(line)?;
	let (_, value) = line.split_once(':')?;
	if !value.trim().is_empty() {
		return None;
	}

	fields
		.iter()
		.any(|field| field.as_ref().eq_ignore_ascii_case(key))
		.then_some(key)
}

/// The value of a `- value` bullet line.
fn bullet_item(line: &str) -> Option<&str> {
	let rest = strip_cr(line).trim_start_matches([' ', '\t']);
	let rest = rest.strip_prefix('-')?;
	if !rest.starts_with([' ', '\t']) {
		return None;
	}

	let value = rest.trim();
	(!value.is_empty()).then_some(value)
}

fn find_runs<S: AsRef<str>>(lines: &[Line<'_>], fields: &[S]) -> Vec<FieldRun> {
	let mut runs = Vec::new();
	let mut index = 0;

	while index < lines.len() {
		let Some(key) = list_field_key(lines[index].text, fields) else {
			index += 1;
			continue;
		};

		let items: Vec<String> = lines[index + 1..]
			.iter()
			.map_while(|line| bullet_item(line.text))
			.map(str::to_string)
			.collect();
		let end = index + 1 + items.len();

		runs.push(FieldRun {
			field: ListField {
				key: key.to_string(),
				items,
			},
			lines: index..end,
		});
		index = end;
	}

	runs
}

/// The recognised list fields in the document's front matter.
pub fn find_list_fields<S: AsRef<str>>(content: &str, fields: &[S]) -> Vec<ListField> {
	let Some(front_matter) = front_matter::locate(content) else {
		return Vec::new();
	};

	let lines: Vec<Line<'_>> = LineOffsets::new(front_matter.body(content)).collect();
	find_runs(&lines, fields)
		.into_iter()
		.map(|run| run.field)
		.collect()
}

/// Collapse every recognised block-style list field in the front matter
/// into a single-line array. Fields declared without items become `[]`.
pub fn convert_list_fields<S: AsRef<str>>(content: &str, fields: &[S]) -> String {
	let Some(front_matter) = front_matter::locate(content) else {
		return content.to_string();
	};

	let body = front_matter.body(content);
	let lines: Vec<Line<'_>> = LineOffsets::new(body).collect();
	let runs = find_runs(&lines, fields);
	if runs.is_empty() {
		return content.to_string();
	}

	let mut converted = String::with_capacity(body.len());
	let mut next_line = 0;
	for run in runs {
		for line in &lines[next_line..run.lines.start] {
			converted.push_str(&body[line.start..line.end]);
		}

		let last = lines[run.lines.end - 1];
		converted.push_str(&run.field.to_inline());
		converted.push_str(&body[last.start + strip_cr(last.text).len()..last.end]);
		next_line = run.lines.end;
	}
	for line in &lines[next_line..] {
		converted.push_str(&body[line.start..line.end]);
	}

	let mut result = String::with_capacity(content.len());
	result.push_str(&content[..front_matter.body.start]);
	result.push_str(&converted);
	result.push_str(&content[front_matter.body.end..]);
	result
}
