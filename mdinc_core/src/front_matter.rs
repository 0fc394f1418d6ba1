//! Front matter detection for included files.
//!
//! A block opens when the first non-blank line is `---` once trimmed and
//! closes at the first later line that is `...` once trimmed. Both delimiter
//! lines belong to the block. A `---` further down is a horizontal rule and
//! never opens a block.

use std::ops::RangeInclusive;

const FRONT_MATTER_START: &str = "---";
const FRONT_MATTER_END: &str = "...";

/// A front matter block found in a list of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatter {
	/// A complete block spanning `start..=end` (0-indexed lines).
	Block { start: usize, end: usize },
	/// A `---` line at `start` with no closing `...` after it.
	Unterminated { start: usize },
}

impl FrontMatter {
	/// Inclusive range of the lines to remove, if the block is complete.
	pub fn line_range(&self) -> Option<RangeInclusive<usize>> {
		match *self {
			Self::Block { start, end } => Some(start..=end),
			Self::Unterminated { .. } => None,
		}
	}
}

/// Locate the front matter block in `lines`, if any.
pub fn detect_front_matter<S: AsRef<str>>(lines: &[S]) -> Option<FrontMatter> {
	let start = lines
		.iter()
		.position(|line| !line.as_ref().trim().is_empty())?;
	if lines[start].as_ref().trim() != FRONT_MATTER_START {
		return None;
	}

	let end = lines[start + 1..]
		.iter()
		.position(|line| line.as_ref().trim() == FRONT_MATTER_END)
		.map(|offset| start + 1 + offset);

	Some(match end {
		Some(end) => FrontMatter::Block { start, end },
		None => FrontMatter::Unterminated { start },
	})
}

/// Remove a complete front matter block from `lines`. An unterminated block
/// is left in place. Returns what was detected.
pub fn excise_front_matter(lines: &mut Vec<String>) -> Option<FrontMatter> {
	let front_matter = detect_front_matter(lines)?;
	if let Some(range) = front_matter.line_range() {
		lines.drain(range);
	}

	Some(front_matter)
}
