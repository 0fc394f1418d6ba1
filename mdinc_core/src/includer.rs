//! The include expansion engine.
//!
//! The document is held as an owned buffer of lines. Each pass scans the
//! buffer from the top; the first line containing a marker is rewritten and
//! the scan restarts, so markers introduced by a splice are always found and
//! the heading that precedes every marker is tracked in document order. The
//! buffer has reached its fixed point once a full pass finds no marker.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use crate::IncludeConfig;
use crate::IncludeError;
use crate::IncludeResult;
use crate::front_matter::FrontMatter;
use crate::front_matter::excise_front_matter;
use crate::marker::find_marker;
use crate::marker::heading_depth;
use crate::marker::heading_prefix;
use crate::reader::FsReader;
use crate::reader::IncludeReader;
use crate::reader::identity_key;
use crate::reader::resolve_include_path;

/// An include that could not be resolved and was dropped from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeWarning {
	/// Resolved path of the file that could not be included.
	pub path: PathBuf,
	/// The path as written inside the marker.
	pub marker: String,
	/// File containing the marker. `None` for a root document read from
	/// memory.
	pub source: Option<PathBuf>,
	/// Description of the failure.
	pub message: String,
}

impl fmt::Display for IncludeWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"could not include file {}. Ignoring include statement `{{!{}!}}`. Error: {}",
			self.path.display(),
			self.marker,
			self.message
		)
	}
}

/// Result of expanding a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
	/// The fully expanded lines, without terminators.
	pub lines: Vec<String>,
	/// Includes that were dropped because they could not be resolved.
	pub warnings: Vec<IncludeWarning>,
	/// Whether the source text ended with a newline.
	pub trailing_newline: bool,
}

impl Expansion {
	/// Returns true if any include was dropped.
	pub fn has_warnings(&self) -> bool {
		!self.warnings.is_empty()
	}

	/// Join the lines back into a document.
	pub fn render(&self) -> String {
		join_lines(&self.lines, self.trailing_newline)
	}
}

/// Join `lines` with `\n`, optionally terminating the last line.
pub fn join_lines<S: AsRef<str>>(lines: &[S], trailing_newline: bool) -> String {
	let mut output = lines
		.iter()
		.map(AsRef::as_ref)
		.collect::<Vec<_>>()
		.join("\n");
	if trailing_newline {
		output.push('\n');
	}

	output
}

/// The chain of files a piece of buffer text was included through.
#[derive(Debug)]
struct Origin {
	file: Option<PathBuf>,
	key: Option<PathBuf>,
	parent: Option<Rc<Origin>>,
}

impl Origin {
	fn root(file: Option<&Path>) -> Rc<Self> {
		Rc::new(Self {
			file: file.map(Path::to_path_buf),
			key: file.map(identity_key),
			parent: None,
		})
	}

	fn child(self: &Rc<Self>, file: PathBuf) -> Rc<Self> {
		Rc::new(Self {
			key: Some(identity_key(&file)),
			file: Some(file),
			parent: Some(Rc::clone(self)),
		})
	}

	fn ancestry(&self) -> impl Iterator<Item = &Origin> {
		std::iter::successors(Some(self), |origin| origin.parent.as_deref())
	}

	fn contains(&self, key: &Path) -> bool {
		self.ancestry()
			.any(|origin| origin.key.as_deref() == Some(key))
	}

	fn directory(&self) -> Option<&Path> {
		self.file.as_deref().and_then(Path::parent)
	}

	/// Outermost first, ending with `next`.
	fn describe_chain(&self, next: &Path) -> String {
		let mut files: Vec<String> = self
			.ancestry()
			.map(|origin| {
				origin
					.file
					.as_ref()
					.map_or_else(|| "<document>".to_string(), |file| file.display().to_string())
			})
			.collect();
		files.reverse();
		files.push(next.display().to_string());
		files.join(" -> ")
	}
}

#[derive(Debug, Clone)]
struct Span {
	start: usize,
	origin: Rc<Origin>,
}

/// A buffer line and the origin of each byte range in it. Spans are sorted
/// by `start` and the first always starts at zero.
#[derive(Debug, Clone)]
struct Line {
	text: String,
	spans: Vec<Span>,
}

impl Line {
	fn new(text: String, origin: Rc<Origin>) -> Self {
		Self {
			text,
			spans: vec![Span { start: 0, origin }],
		}
	}

	fn origin_at(&self, offset: usize) -> &Rc<Origin> {
		let index = self.spans.partition_point(|span| span.start <= offset);
		&self.spans[index.saturating_sub(1)].origin
	}

	/// Split the line around `start..end`, dropping that range.
	fn split_around(&self, start: usize, end: usize) -> (Line, Line) {
		let mut before_spans: Vec<Span> = self
			.spans
			.iter()
			.filter(|span| span.start < start)
			.cloned()
			.collect();
		if before_spans.is_empty() {
			before_spans.push(Span {
				start: 0,
				origin: Rc::clone(self.origin_at(start)),
			});
		}

		let mut after_spans = vec![Span {
			start: 0,
			origin: Rc::clone(self.origin_at(end)),
		}];
		after_spans.extend(self.spans.iter().filter(|span| span.start > end).map(|span| {
			Span {
				start: span.start - end,
				origin: Rc::clone(&span.origin),
			}
		}));

		let before = Line {
			text: self.text[..start].to_string(),
			spans: before_spans,
		};
		let after = Line {
			text: self.text[end..].to_string(),
			spans: after_spans,
		};

		(before, after)
	}

	fn append(&mut self, other: Line) {
		if other.text.is_empty() {
			return;
		}

		if self.text.is_empty() {
			*self = other;
			return;
		}

		let offset = self.text.len();
		self.text.push_str(&other.text);
		for span in other.spans {
			self.push_span(Span {
				start: span.start + offset,
				origin: span.origin,
			});
		}
	}

	fn push_span(&mut self, span: Span) {
		if self
			.spans
			.last()
			.is_some_and(|last| Rc::ptr_eq(&last.origin, &span.origin))
		{
			return;
		}

		self.spans.push(span);
	}
}

fn strip_terminator(mut line: String) -> String {
	if line.ends_with('\n') {
		line.pop();
		if line.ends_with('\r') {
			line.pop();
		}
	}

	line
}

/// Resolves `{!path!}` include markers in a document.
///
/// ```rust,no_run
/// use mdinc_core::IncludeConfig;
/// use mdinc_core::Includer;
///
/// let config = IncludeConfig {
/// 	base_path: "docs".into(),
/// 	heading_offset: 1,
/// 	..IncludeConfig::default()
/// };
/// let includer = Includer::new(config);
/// let lines = includer.run(["# Guide", "{!install.md!}"]).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Includer<R = FsReader> {
	config: IncludeConfig,
	reader: R,
}

impl Includer {
	/// Create an includer that reads files from the local filesystem.
	pub fn new(config: IncludeConfig) -> Self {
		let reader = FsReader::new(config.max_file_size);
		Self { config, reader }
	}
}

impl<R: IncludeReader> Includer<R> {
	/// Create an includer over a custom reader.
	pub fn with_reader(config: IncludeConfig, reader: R) -> Self {
		Self { config, reader }
	}

	pub fn config(&self) -> &IncludeConfig {
		&self.config
	}

	/// Expand every include marker in `lines` and return the new lines.
	///
	/// Unresolvable includes are dropped with a warning unless
	/// `throw_exception` is set, in which case the first failure is returned
	/// and nothing is expanded.
	pub fn run<I, S>(&self, lines: I) -> IncludeResult<Vec<String>>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(self.expand(lines)?.lines)
	}

	/// Like [`Includer::run`] but also returns the warnings for dropped
	/// includes.
	pub fn expand<I, S>(&self, lines: I) -> IncludeResult<Expansion>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.expand_lines(Origin::root(None), lines)
	}

	/// Expand a whole document held in memory. `path`, when known, is the
	/// location of the document: it may not be included by its own includes
	/// and anchors `relative_includes` for its markers.
	pub fn expand_source(&self, content: &str, path: Option<&Path>) -> IncludeResult<Expansion> {
		let mut expansion = self.expand_lines(Origin::root(path), content.lines())?;
		expansion.trailing_newline = content.ends_with('\n');

		Ok(expansion)
	}

	/// Expand a document held in memory, preserving its trailing newline.
	pub fn expand_str(&self, content: &str) -> IncludeResult<String> {
		Ok(self.expand_source(content, None)?.render())
	}

	/// Read the document at `path` through the reader and expand it.
	pub fn expand_file(&self, path: &Path) -> IncludeResult<Expansion> {
		let content = self.reader.read_to_string(path, self.config.encoding)?;
		self.expand_source(&content, Some(path))
	}

	#[tracing::instrument(level = "debug", skip_all, fields(document = ?root.file))]
	fn expand_lines<I, S>(&self, root: Rc<Origin>, lines: I) -> IncludeResult<Expansion>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut buffer: Vec<Line> = lines
			.into_iter()
			.map(|line| Line::new(strip_terminator(line.into()), Rc::clone(&root)))
			.collect();
		let mut warnings = Vec::new();
		let mut bonus_heading = String::new();

		'scan: loop {
			for index in 0..buffer.len() {
				let Some(marker) = find_marker(&buffer[index].text) else {
					let prefix = heading_prefix(&buffer[index].text);
					if !prefix.is_empty() {
						prefix.clone_into(&mut bonus_heading);
					}
					continue;
				};

				let raw = marker.path.to_string();
				let origin = Rc::clone(buffer[index].origin_at(marker.start));
				let (mut before, after) = buffer[index].split_around(marker.start, marker.end);
				let path = self.resolve(&raw, &origin);

				match self.load(&path, &origin) {
					Ok(content) => {
						let child = origin.child(path);
						let mut spliced: Vec<Line> = self
							.adjust_headings(content, &bonus_heading)
							.into_iter()
							.map(|text| Line::new(text, Rc::clone(&child)))
							.collect();

						tracing::debug!(
							path = %child.file.as_deref().unwrap_or(Path::new("")).display(),
							line = index + 1,
							lines = spliced.len(),
							"spliced include"
						);

						if let Some(first) = spliced.first_mut() {
							let head = std::mem::replace(first, before);
							first.append(head);
						}
						if let Some(last) = spliced.last_mut() {
							last.append(after);
						}
						buffer.splice(index..=index, spliced);
					}
					Err(error) if self.config.throw_exception || !error.is_include_failure() => {
						return Err(error);
					}
					Err(error) => {
						tracing::warn!(
							path = %path.display(),
							%error,
							"could not include file {}, ignoring include statement",
							path.display()
						);
						warnings.push(IncludeWarning {
							path,
							marker: raw,
							source: origin.file.clone(),
							message: error.to_string(),
						});
						before.append(after);
						buffer[index] = before;
					}
				}

				continue 'scan;
			}

			break;
		}

		Ok(Expansion {
			lines: buffer.into_iter().map(|line| line.text).collect(),
			warnings,
			trailing_newline: false,
		})
	}

	fn resolve(&self, raw: &str, origin: &Origin) -> PathBuf {
		let base = if self.config.relative_includes {
			origin.directory().unwrap_or(&self.config.base_path)
		} else {
			&self.config.base_path
		};

		resolve_include_path(raw, base)
	}

	fn load(&self, path: &Path, origin: &Origin) -> IncludeResult<Vec<String>> {
		if origin.contains(&identity_key(path)) {
			return Err(IncludeError::CyclicInclude {
				path: path.display().to_string(),
				chain: origin.describe_chain(path),
			});
		}

		let content = self.reader.read_to_string(path, self.config.encoding)?;
		let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

		if let Some(FrontMatter::Unterminated { start }) = excise_front_matter(&mut lines) {
			if self.config.strict_front_matter {
				return Err(IncludeError::MalformedFrontMatter {
					path: path.display().to_string(),
					line: start + 1,
				});
			}

			tracing::debug!(
				path = %path.display(),
				line = start + 1,
				"front matter is never closed, keeping content as written"
			);
		}

		if lines.is_empty() {
			lines.push(String::new());
		}

		Ok(lines)
	}

	fn adjust_headings(&self, lines: Vec<String>, bonus_heading: &str) -> Vec<String> {
		if !self.config.adjusts_headings() {
			return lines;
		}

		let offset = "#".repeat(self.config.heading_offset);
		let inherited = if self.config.inherit_heading_depth {
			bonus_heading
		} else {
			""
		};

		lines
			.into_iter()
			.map(|line| {
				if heading_depth(&line) > 0 {
					format!("{offset}{inherited}{line}")
				} else {
					line
				}
			})
			.collect()
	}
}
