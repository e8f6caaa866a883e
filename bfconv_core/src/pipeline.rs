use std::fmt;

use crate::callout;
use crate::diagram::DiagramMatcher;
use crate::list_field;
use crate::list_field::ListField;
use crate::math;
use crate::math::MathStats;

/// One rewriting step of the conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
	Diagram,
	Callout,
	Math,
	ListField,
}

impl Stage {
	/// Every stage in the order the pipeline applies them.
	pub const ALL: [Stage; 4] = [
		Stage::Diagram,
		Stage::Callout,
		Stage::Math,
		Stage::ListField,
	];

	pub fn name(self) -> &'static str {
		match self {
			Stage::Diagram => "diagram",
			Stage::Callout => "callout",
			Stage::Math => "math",
			Stage::ListField => "list-field",
		}
	}

	/// Run this stage over `content`.
	pub fn apply(self, content: &str, options: &ConvertOptions) -> String {
		match self {
			Stage::Diagram => options.diagrams.convert(content),
			Stage::Callout => callout::convert_callouts(content),
			Stage::Math => math::convert_math(content),
			Stage::ListField => list_field::convert_list_fields(content, &options.list_fields),
		}
	}
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Settings shared by every document in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
	/// Fenced blocks rewritten into a diagram shortcode. Compiled once and
	/// reused for every document.
	pub diagrams: DiagramMatcher,
	/// Front matter keys collapsed into single-line arrays.
	pub list_fields: Vec<String>,
}

impl Default for ConvertOptions {
	fn default() -> Self {
		Self {
			diagrams: DiagramMatcher::default(),
			list_fields: list_field::DEFAULT_LIST_FIELDS
				.iter()
				.map(ToString::to_string)
				.collect(),
		}
	}
}

/// What the pipeline found in the original document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
	/// Number of diagram blocks.
	pub diagrams: usize,
	/// Callout type tags as written, in source order.
	pub callouts: Vec<String>,
	/// Math found outside code regions.
	pub math: MathStats,
	/// Whether the katex shortcode was added.
	pub marker_inserted: bool,
	/// Recognised list fields in the front matter.
	pub list_fields: Vec<ListField>,
}

/// The result of running the pipeline over one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
	/// The converted text.
	pub content: String,
	/// Stages that changed the text, in pipeline order.
	pub changed_stages: Vec<Stage>,
	pub findings: Findings,
}

impl Conversion {
	/// Whether the converted text differs from the input.
	pub fn is_changed(&self) -> bool {
		!self.changed_stages.is_empty()
	}
}

/// Run every stage over `content` in order.
pub fn convert(content: &str, options: &ConvertOptions) -> Conversion {
	let mut findings = Findings {
		diagrams: options.diagrams.find(content).len(),
		..Findings::default()
	};
	let mut changed_stages = Vec::new();
	let mut current = content.to_string();

	for stage in Stage::ALL {
		match stage {
			Stage::Callout => findings.callouts = callout::find_callout_types(&current),
			Stage::Math => findings.math = math::scan_math(&current),
			Stage::ListField => {
				findings.list_fields = list_field::find_list_fields(&current, &options.list_fields);
			}
			Stage::Diagram => {}
		}

		let next = stage.apply(&current, options);
		if next == current {
			continue;
		}

		if stage == Stage::Math {
			findings.marker_inserted =
				!math::has_activation_marker(&current) && math::has_activation_marker(&next);
		}

		tracing::debug!(stage = %stage, "stage changed document");
		changed_stages.push(stage);
		current = next;
	}

	Conversion {
		content: current,
		changed_stages,
		findings,
	}
}

/// Run every stage and return only the converted text.
pub fn convert_text(content: &str, options: &ConvertOptions) -> String {
	convert(content, options).content
}
