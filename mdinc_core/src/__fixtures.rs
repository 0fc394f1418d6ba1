use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::Encoding;
use crate::IncludeConfig;
use crate::IncludeError;
use crate::IncludeReader;
use crate::IncludeResult;
use crate::Includer;
use crate::reader::normalize_path;

/// In-memory files keyed by their normalized path.
#[derive(Debug, Default)]
pub struct MemoryReader {
	files: HashMap<PathBuf, String>,
	reads: RefCell<Vec<PathBuf>>,
}

impl MemoryReader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_file(mut self, path: &str, content: &str) -> Self {
		self.files
			.insert(normalize_path(Path::new(path)), content.to_string());
		self
	}

	/// Every path that was requested, in order.
	pub fn reads(&self) -> Vec<PathBuf> {
		self.reads.borrow().clone()
	}
}

impl IncludeReader for MemoryReader {
	fn read_to_string(&self, path: &Path, _encoding: Encoding) -> IncludeResult<String> {
		self.reads.borrow_mut().push(path.to_path_buf());
		self.files
			.get(&normalize_path(path))
			.cloned()
			.ok_or_else(|| {
				IncludeError::IncludeNotFound {
					path: path.display().to_string(),
					source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
				}
			})
	}
}

pub fn includer(config: IncludeConfig, reader: &MemoryReader) -> Includer<&MemoryReader> {
	Includer::with_reader(config, reader)
}

pub fn throwing() -> IncludeConfig {
	IncludeConfig {
		throw_exception: true,
		..IncludeConfig::default()
	}
}

pub fn lines(input: &[&str]) -> Vec<String> {
	input.iter().map(ToString::to_string).collect()
}
