//! Front matter location and single-field patching.
//!
//! Front matter is only recognised when the very first line of the document
//! is exactly `---` and a later line is exactly `---`. Anything else means
//! the document has no metadata block and the stages that need one become
//! no-ops.

use std::ops::Range;

/// The delimiter line that opens and closes a front matter block.
pub const FRONT_MATTER_DELIMITER: &str = "---";

/// Byte offsets of a front matter block inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
	/// The metadata between the two delimiter lines. Includes the trailing
	/// newline of the last metadata line when the block is not empty.
	pub body: Range<usize>,
	/// Offset just past the closing delimiter line, including its newline
	/// when the document continues after it.
	pub end: usize,
}

impl FrontMatter {
	/// The metadata text between the delimiter lines.
	pub fn body<'a>(&self, content: &'a str) -> &'a str {
		&content[self.body.clone()]
	}
}

/// Find the front matter block at the start of `content`.
pub fn locate(content: &str) -> Option<FrontMatter> {
	let mut lines = LineOffsets::new(content);
	let first = lines.next()?;
	if !is_delimiter(first.text) {
		return None;
	}

	let body_start = first.end;
	for line in lines {
		if is_delimiter(line.text) {
			return Some(FrontMatter {
				body: body_start..line.start,
				end: line.end,
			});
		}
	}

	None
}

fn is_delimiter(line: &str) -> bool {
	line.strip_suffix('\r').unwrap_or(line) == FRONT_MATTER_DELIMITER
}

/// A single line of a document with its byte offsets. `end` includes the
/// line's `\n` terminator when present.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
	pub start: usize,
	pub end: usize,
	pub text: &'a str,
}

/// Iterator over lines together with their byte offsets.
pub(crate) struct LineOffsets<'a> {
	content: &'a str,
	offset: usize,
}

impl<'a> LineOffsets<'a> {
	pub(crate) fn new(content: &'a str) -> Self {
		Self { content, offset: 0 }
	}
}

impl<'a> Iterator for LineOffsets<'a> {
	type Item = Line<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.offset >= self.content.len() {
			return None;
		}

		let rest = &self.content[self.offset..];
		let start = self.offset;
		let (text, consumed) = match rest.find('\n') {
			Some(index) => (&rest[..index], index + 1),
			None => (rest, rest.len()),
		};
		self.offset += consumed;

		Some(Line {
			start,
			end: self.offset,
			text,
		})
	}
}

/// A metadata field to add to a document's front matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPatch {
	/// The key to add, e.g. `showComments`.
	pub key: String,
	/// The raw YAML value written after `key: `.
	pub value: String,
	/// Insert the new field directly after this key when present.
	pub after: Option<String>,
}

impl FieldPatch {
	pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			value: value.into(),
			after: None,
		}
	}

	#[must_use]
	pub fn after(mut self, key: impl Into<String>) -> Self {
		self.after = Some(key.into());
		self
	}
}

/// Outcome of applying a [`FieldPatch`] to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInsertion {
	/// The field was added; holds the new document text.
	Inserted(String),
	/// The front matter already declares the key.
	AlreadyPresent,
	/// The document has no front matter block.
	NoFrontMatter,
}

/// Add `patch.key: patch.value` to the document's front matter.
///
/// The new line goes after the `patch.after` key when the front matter has
/// one, otherwise after the last metadata line.
pub fn insert_field(content: &str, patch: &FieldPatch) -> FieldInsertion {
	let Some(front_matter) = locate(content) else {
		return FieldInsertion::NoFrontMatter;
	};

	let body_lines: Vec<Line<'_>> = LineOffsets::new(front_matter.body(content))
		.map(|line| Line {
			start: line.start + front_matter.body.start,
			end: line.end + front_matter.body.start,
			text: line.text,
		})
		.collect();

	if body_lines
		.iter()
		.any(|line| field_key(line.text).is_some_and(|key| key == patch.key))
	{
		return FieldInsertion::AlreadyPresent;
	}

	let anchor = patch.after.as_deref().and_then(|after| {
		body_lines
			.iter()
			.find(|line| field_key(line.text).is_some_and(|key| key == after))
	});

	let insert_at = match anchor {
		Some(line) => line.end,
		None => front_matter.body.end,
	};

	// Every metadata line is followed by the closing delimiter, so
	// `insert_at` always sits at the start of a line and the line before it
	// decides the line ending.
	let newline = if content[..insert_at].ends_with("\r\n") {
		"\r\n"
	} else {
		"\n"
	};
	let new_line = format!("{}: {}{newline}", patch.key, patch.value);
	let mut result = String::with_capacity(content.len() + new_line.len());
	result.push_str(&content[..insert_at]);
	result.push_str(&new_line);
	result.push_str(&content[insert_at..]);

	FieldInsertion::Inserted(result)
}

/// The key of a top-level `key: value` metadata line.
pub(crate) fn field_key(line: &str) -> Option<&str> {
	if line.starts_with([' ', '\t', '-', '#']) {
		return None;
	}

	let (key, _) = line.split_once(':')?;
	let key = key.trim_end();
	(!key.is_empty()).then_some(key)
}
