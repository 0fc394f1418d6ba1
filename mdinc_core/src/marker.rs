use std::sync::LazyLock;

use regex::Regex;

/// Matches `{!path!}` with optional whitespace around a non-greedy path.
static INCLUDE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\{!\s*(.+?)\s*!\}")
		.unwrap_or_else(|e| panic!("invalid include marker pattern: {e}"))
});

/// An include marker located inside a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
	/// Byte offset of the opening `{!`.
	pub start: usize,
	/// Byte offset just past the closing `!}`.
	pub end: usize,
	/// The referenced path, trimmed of surrounding whitespace.
	pub path: &'a str,
}

/// Find the first include marker in `line`.
pub fn find_marker(line: &str) -> Option<Marker<'_>> {
	let captures = INCLUDE_MARKER.captures(line)?;
	let whole = captures.get(0)?;
	let path = captures.get(1)?;

	Some(Marker {
		start: whole.start(),
		end: whole.end(),
		path: path.as_str(),
	})
}

/// Number of leading `#` characters. Zero means the line is not a heading.
pub fn heading_depth(line: &str) -> usize {
	line.bytes().take_while(|&byte| byte == b'#').count()
}

/// The leading `#` run of `line`, empty when the line is not a heading.
pub fn heading_prefix(line: &str) -> &str {
	&line[..heading_depth(line)]
}
