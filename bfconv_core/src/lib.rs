//! `bfconv_core` converts markdown notes written for [Obsidian](https://obsidian.md) into content for the Hugo [Blowfish](https://blowfish.page) theme.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document text
//!   → Diagram stage  (```mermaid fences → {{< mermaid >}} shortcodes)
//!   → Callout stage  (> [!type] blockquotes → {{< alert >}} shortcodes)
//!   → Math stage     ($…$ → \(…\), {{< katex >}} activation)
//!   → List field stage (block YAML lists in front matter → ["a","b"])
//! ```
//!
//! Every stage is a pure text to text function and the pipeline is
//! idempotent: converting an already converted document changes nothing.
//! The one exception is a callout nested inside another callout. The outer
//! block is converted and the inner `> [!type]` header loses one `>`, so a
//! second run converts the inner block as well.
//!
//! ## Modules
//!
//! - [`front_matter`]: Front matter location and single-field patching.
//! - [`diagram`], [`callout`], [`math`], [`list_field`]: The conversion stages.
//! - [`config`]: Configuration loading from `bfconv.toml`.
//! - [`discovery`]: Finding documents under a root directory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use bfconv_core::DiscoverOptions;
//! use bfconv_core::ConvertOptions;
//! use bfconv_core::Mode;
//! use bfconv_core::discover;
//! use bfconv_core::process_documents;
//!
//! let paths = discover(Path::new("content"), &DiscoverOptions::default()).unwrap();
//! let report = process_documents(&paths, &ConvertOptions::default(), Mode::Write);
//! println!("{} of {} document(s) converted", report.changed(), report.found());
//! ```

pub use batch::*;
pub use config::*;
pub use discovery::*;
pub use error::*;
pub use pipeline::*;

mod batch;
pub mod callout;
pub mod config;
pub mod diagram;
pub mod discovery;
#[allow(unused_assignments)]
mod error;
pub mod front_matter;
pub mod list_field;
pub mod math;
mod pipeline;
