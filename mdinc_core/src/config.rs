use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::IncludeError;
use crate::IncludeResult;

/// Default maximum size in bytes of an included file (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["mdinc.toml", ".mdinc.toml", ".config/mdinc.toml"];

/// Character encoding used to decode included files.
///
/// Labels are matched case-insensitively and treat `_` like `-`, so
/// `UTF_8`, `utf8` and `utf-8` all select [`Encoding::Utf8`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
#[non_exhaustive]
pub enum Encoding {
	/// Strict UTF-8. A byte order mark is kept as part of the content.
	#[default]
	Utf8,
	/// UTF-8 with an optional leading byte order mark, which is dropped.
	Utf8Sig,
	/// 7-bit ASCII. Any byte above `0x7f` is a decode error.
	Ascii,
	/// ISO-8859-1, every byte maps to the code point of the same value.
	Latin1,
}

impl Encoding {
	/// The canonical label for this encoding.
	pub fn label(self) -> &'static str {
		match self {
			Self::Utf8 => "utf-8",
			Self::Utf8Sig => "utf-8-sig",
			Self::Ascii => "ascii",
			Self::Latin1 => "latin-1",
		}
	}

	/// Decode raw file bytes. The error is a human readable reason.
	pub fn decode(self, bytes: &[u8]) -> Result<String, String> {
		match self {
			Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string()),
			Self::Utf8Sig => {
				let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
				String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
			}
			Self::Ascii => {
				match bytes.iter().position(|byte| !byte.is_ascii()) {
					Some(index) => {
						Err(format!(
							"byte 0x{:02x} at offset {index} is not ascii",
							bytes[index]
						))
					}
					None => Ok(bytes.iter().map(|&byte| char::from(byte)).collect()),
				}
			}
			Self::Latin1 => Ok(bytes.iter().map(|&byte| char::from(byte)).collect()),
		}
	}
}

impl fmt::Display for Encoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

impl FromStr for Encoding {
	type Err = IncludeError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
		match normalized.as_str() {
			"utf-8" | "utf8" => Ok(Self::Utf8),
			"utf-8-sig" | "utf8-sig" => Ok(Self::Utf8Sig),
			"ascii" | "us-ascii" => Ok(Self::Ascii),
			"latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Self::Latin1),
			_ => Err(IncludeError::UnsupportedEncoding(value.to_string())),
		}
	}
}

impl TryFrom<String> for Encoding {
	type Error = IncludeError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

/// Options for the include preprocessor, loaded from an `mdinc.toml` file or
/// built in code.
///
/// ```toml
/// base_path = "docs"
/// encoding = "utf-8"
/// heading_offset = 1
/// inherit_heading_depth = true
/// relative_includes = false
/// throw_exception = false
/// ```
///
/// The camelCase spellings `basePath`, `headingOffset`,
/// `inheritHeadingDepth`, `relativeIncludes` and `throwException` are
/// accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct IncludeConfig {
	/// Root location from which relative include paths are evaluated.
	#[serde(alias = "basePath")]
	pub base_path: PathBuf,
	/// Encoding of included files.
	pub encoding: Encoding,
	/// Number of `#` characters added to every heading in included content.
	/// Combines with `inherit_heading_depth`.
	#[serde(alias = "headingOffset")]
	pub heading_offset: usize,
	/// Prefix every heading in included content with the depth of the
	/// heading preceding the include marker. Combines with `heading_offset`.
	#[serde(alias = "inheritHeadingDepth")]
	pub inherit_heading_depth: bool,
	/// Resolve includes found inside an included file relative to that file's
	/// directory instead of `base_path`.
	#[serde(alias = "relativeIncludes")]
	pub relative_includes: bool,
	/// Fail the whole expansion when an include cannot be resolved. By
	/// default a warning is emitted and the marker is dropped.
	#[serde(alias = "throwException")]
	pub throw_exception: bool,
	/// Treat a `---` line without a closing `...` line as an error instead of
	/// leaving the included content untouched.
	#[serde(alias = "strictFrontMatter")]
	pub strict_front_matter: bool,
	/// Maximum size in bytes of an included file. Defaults to 10 MB.
	#[serde(alias = "maxFileSize")]
	pub max_file_size: u64,
}

impl Default for IncludeConfig {
	fn default() -> Self {
		Self {
			base_path: PathBuf::from("."),
			encoding: Encoding::default(),
			heading_offset: 0,
			inherit_heading_depth: false,
			relative_includes: false,
			throw_exception: false,
			strict_front_matter: false,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

impl IncludeConfig {
	/// Returns true when included headings need rewriting.
	pub fn adjusts_headings(&self) -> bool {
		self.inherit_heading_depth || self.heading_offset > 0
	}

	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Parse a config from TOML source. Relative paths are left as written.
	pub fn from_toml(content: &str) -> IncludeResult<Self> {
		toml::from_str(content).map_err(|e| IncludeError::ConfigParse(e.to_string()))
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	///
	/// A relative `base_path` is resolved against `root`.
	pub fn load(root: &Path) -> IncludeResult<Option<IncludeConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let mut config = Self::from_toml(&content)?;
		if config.base_path.is_relative() {
			config.base_path = root.join(&config.base_path);
		}

		Ok(Some(config))
	}
}
