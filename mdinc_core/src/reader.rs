use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::Encoding;
use crate::IncludeError;
use crate::IncludeResult;
use crate::config::DEFAULT_MAX_FILE_SIZE;

/// Reads the content of an included file.
///
/// The includer only ever asks for whole files and performs no existence
/// checks of its own, so a failed read is the only signal that an include
/// cannot be resolved. Implementations should report failures as
/// [`IncludeError::IncludeNotFound`], [`IncludeError::IncludeDecode`] or
/// [`IncludeError::FileTooLarge`] so the configured failure policy applies.
pub trait IncludeReader {
	/// Read `path` and decode it with `encoding`.
	fn read_to_string(&self, path: &Path, encoding: Encoding) -> IncludeResult<String>;
}

impl<T: IncludeReader + ?Sized> IncludeReader for &T {
	fn read_to_string(&self, path: &Path, encoding: Encoding) -> IncludeResult<String> {
		(**self).read_to_string(path, encoding)
	}
}

/// Blocking whole-file reader over the local filesystem.
#[derive(Debug, Clone, Copy)]
pub struct FsReader {
	max_file_size: u64,
}

impl FsReader {
	pub fn new(max_file_size: u64) -> Self {
		Self { max_file_size }
	}
}

impl Default for FsReader {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_FILE_SIZE)
	}
}

impl IncludeReader for FsReader {
	fn read_to_string(&self, path: &Path, encoding: Encoding) -> IncludeResult<String> {
		let display = path.display().to_string();
		let not_found = |source| {
			IncludeError::IncludeNotFound {
				path: display.clone(),
				source,
			}
		};

		let metadata = std::fs::metadata(path).map_err(not_found)?;
		if metadata.len() > self.max_file_size {
			return Err(IncludeError::FileTooLarge {
				path: display.clone(),
				size: metadata.len(),
				limit: self.max_file_size,
			});
		}

		let bytes = std::fs::read(path).map_err(not_found)?;
		encoding.decode(&bytes).map_err(|reason| {
			IncludeError::IncludeDecode {
				path: display,
				encoding: encoding.to_string(),
				reason,
			}
		})
	}
}

/// Expand a leading `~` to the current user's home directory. Paths without
/// the shorthand, or with no known home directory, are returned as written.
pub fn expand_home(path: &str) -> PathBuf {
	let rest = if path == "~" {
		Some("")
	} else {
		path.strip_prefix("~/")
			.or_else(|| path.strip_prefix("~\\"))
	};

	match (rest, dirs::home_dir()) {
		(Some(""), Some(home)) => home,
		(Some(rest), Some(home)) => home.join(rest),
		_ => PathBuf::from(path),
	}
}

/// Lexically collapse `.` and `..` segments without touching the
/// filesystem. `..` never climbs above a root, and an empty result is `.`.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut parts: Vec<Component<'_>> = Vec::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				match parts.last() {
					Some(Component::Normal(_)) => {
						parts.pop();
					}
					Some(Component::RootDir | Component::Prefix(_)) => {}
					_ => parts.push(component),
				}
			}
			_ => parts.push(component),
		}
	}

	if parts.is_empty() {
		return PathBuf::from(".");
	}

	parts.iter().collect()
}

/// Resolve the path written inside an include marker. Absolute paths (after
/// home expansion) are kept, anything else is joined to `base`.
pub fn resolve_include_path(raw: &str, base: &Path) -> PathBuf {
	let expanded = expand_home(raw);
	if expanded.is_absolute() {
		normalize_path(&expanded)
	} else {
		normalize_path(&base.join(expanded))
	}
}

/// Absolute, normalized form of `path` used to compare files for cycle
/// detection.
pub(crate) fn identity_key(path: &Path) -> PathBuf {
	std::path::absolute(path).map_or_else(|_| normalize_path(path), |abs| normalize_path(&abs))
}
