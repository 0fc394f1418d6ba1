use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum IncludeError {
	#[error(transparent)]
	#[diagnostic(code(mdinc::io_error))]
	Io(#[from] std::io::Error),

	#[error("could not find file `{path}`: {source}")]
	#[diagnostic(
		code(mdinc::include_not_found),
		help("include paths are resolved against `base_path` unless `relative_includes` is set")
	)]
	IncludeNotFound {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("could not decode `{path}` as {encoding}: {reason}")]
	#[diagnostic(
		code(mdinc::include_decode),
		help("set `encoding` in mdinc.toml to match the included file")
	)]
	IncludeDecode {
		path: String,
		encoding: String,
		reason: String,
	},

	#[error("front matter opened at line {line} of `{path}` is never closed")]
	#[diagnostic(
		code(mdinc::malformed_front_matter),
		help("close the front matter block with a line containing only `...`")
	)]
	MalformedFrontMatter { path: String, line: usize },

	#[error("cyclic include of `{path}`: {chain}")]
	#[diagnostic(
		code(mdinc::cyclic_include),
		help("a file cannot include itself, directly or through another file")
	)]
	CyclicInclude { path: String, chain: String },

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(mdinc::file_too_large),
		help("increase `max_file_size` in mdinc.toml")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("unsupported encoding: `{0}`")]
	#[diagnostic(
		code(mdinc::unsupported_encoding),
		help("supported encodings: utf-8, utf-8-sig, ascii, latin-1")
	)]
	UnsupportedEncoding(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mdinc::config_parse),
		help("check that mdinc.toml is valid TOML using the documented option names")
	)]
	ConfigParse(String),
}

impl IncludeError {
	/// Returns `true` for failures caused by a single include marker. These
	/// are the failures that `throw_exception = false` recovers from.
	pub fn is_include_failure(&self) -> bool {
		matches!(
			self,
			Self::IncludeNotFound { .. }
				| Self::IncludeDecode { .. }
				| Self::MalformedFrontMatter { .. }
				| Self::CyclicInclude { .. }
				| Self::FileTooLarge { .. }
		)
	}
}

pub type IncludeResult<T> = Result<T, IncludeError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
