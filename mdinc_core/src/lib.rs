//! `mdinc_core` is the core library for [mdinc](https://github.com/ifiokjr/mdinc). It resolves `{!path!}` include markers in markdown documents before they are rendered, splicing in the referenced files recursively until no marker is left.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document lines
//!   → Marker scan (first `{!path!}` in document order)
//!   → Path resolution (`~` expansion, `base_path` or including file's directory)
//!   → Reader (whole-file read and decode)
//!   → Front matter excision (`---` … `...`)
//!   → Heading rewriting (`heading_offset`, `inherit_heading_depth`)
//!   → Splice into the buffer and rescan from the top
//! ```
//!
//! ## Modules
//!
//! - [`config`]: [`IncludeConfig`] and [`Encoding`], plus discovery of `mdinc.toml`.
//! - [`front_matter`]: Detection and removal of front matter blocks in included files.
//! - [`marker`]: The include marker pattern and heading-line detection.
//! - [`reader`]: The [`IncludeReader`] trait, the filesystem reader and path resolution.
//!
//! ## Failure Policy
//!
//! An include that cannot be read, decoded, or that would include itself is
//! dropped from its line with a warning, logged through `tracing` and
//! returned in [`Expansion::warnings`]. With `throw_exception = true` the
//! first such failure aborts the expansion and is returned as an
//! [`IncludeError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdinc_core::IncludeConfig;
//! use mdinc_core::Includer;
//! use std::path::Path;
//!
//! let config = IncludeConfig::load(Path::new("."))
//! 	.unwrap()
//! 	.unwrap_or_default();
//! let includer = Includer::new(config);
//!
//! let expansion = includer.expand_file(Path::new("readme.src.md")).unwrap();
//! for warning in &expansion.warnings {
//! 	eprintln!("warning: {warning}");
//! }
//! print!("{}", expansion.render());
//! ```

pub use config::*;
pub use error::*;
pub use includer::*;
pub use reader::FsReader;
pub use reader::IncludeReader;

pub mod config;
#[allow(unused_assignments)]
mod error;
pub mod front_matter;
mod includer;
pub mod marker;
pub mod reader;

#[cfg(test)]
mod __fixtures;
