use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use mdinc_core::IncludeConfig;
use mdinc_core::IncludeResult;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Resolve `{!file!}` include markers in markdown documents.",
	long_about = "mdinc splices other files into a markdown document wherever a `{!path!}` marker \
	              appears, recursively, before the document is handed to a renderer.\n\nIncluded \
	              files lose their front matter and can have their headings pushed deeper so they \
	              fit the section they are included into.\n\nQuick start:\n  mdinc init            \
	              Create an mdinc.toml\n  mdinc expand doc.md   Print the expanded document\n  \
	              mdinc check doc.md out.md  Verify a generated file is up to date"
)]
pub struct MdincCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. `mdinc.toml` is discovered here.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	#[command(flatten)]
	pub options: IncludeOptions,
}

/// Command line overrides for values from `mdinc.toml`.
///
/// Switches accept an optional value so a setting enabled in the config file
/// can be turned off again: `--throw-exception` and `--throw-exception=true`
/// enable it, `--throw-exception=false` disables it.
#[derive(Debug, Default, Args)]
pub struct IncludeOptions {
	/// Directory that include paths are resolved against.
	#[arg(long, global = true)]
	pub base_path: Option<PathBuf>,

	/// Encoding of included files: utf-8, utf-8-sig, ascii or latin-1.
	#[arg(long, global = true)]
	pub encoding: Option<String>,

	/// Add this many `#` characters to every included heading.
	#[arg(long, global = true)]
	pub heading_offset: Option<usize>,

	/// Nest included headings under the heading that precedes the marker.
	#[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
	pub inherit_heading_depth: Option<bool>,

	/// Resolve nested includes relative to the file that contains them.
	#[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
	pub relative_includes: Option<bool>,

	/// Fail instead of warning when an include cannot be resolved.
	#[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
	pub throw_exception: Option<bool>,

	/// Treat a leading `---` without a closing `...` as an error.
	#[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
	pub strict_front_matter: Option<bool>,

	/// Largest included file, in bytes.
	#[arg(long, global = true)]
	pub max_file_size: Option<u64>,
}

impl IncludeOptions {
	/// Override `config` with every option given on the command line.
	pub fn apply(&self, config: &mut IncludeConfig) -> IncludeResult<()> {
		if let Some(base_path) = &self.base_path {
			config.base_path.clone_from(base_path);
		}
		if let Some(encoding) = &self.encoding {
			config.encoding = encoding.parse()?;
		}
		if let Some(heading_offset) = self.heading_offset {
			config.heading_offset = heading_offset;
		}
		if let Some(inherit_heading_depth) = self.inherit_heading_depth {
			config.inherit_heading_depth = inherit_heading_depth;
		}
		if let Some(relative_includes) = self.relative_includes {
			config.relative_includes = relative_includes;
		}
		if let Some(throw_exception) = self.throw_exception {
			config.throw_exception = throw_exception;
		}
		if let Some(strict_front_matter) = self.strict_front_matter {
			config.strict_front_matter = strict_front_matter;
		}
		if let Some(max_file_size) = self.max_file_size {
			config.max_file_size = max_file_size;
		}

		Ok(())
	}
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `mdinc.toml` in the project root.
	///
	/// If a config file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Expand every include marker in a document.
	///
	/// Prints the expanded document to stdout, or writes it to `--output`.
	/// Includes that cannot be resolved are reported on stderr and dropped,
	/// unless `--throw-exception` is set, in which case nothing is written
	/// and the command fails.
	Expand {
		/// The document to expand. Use `-` to read from stdin.
		input: PathBuf,

		/// Write the expanded document to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// Check that a generated document matches the expansion of its source.
	///
	/// Exits with a non-zero status code when `EXPECTED` is missing or
	/// differs from what `mdinc expand INPUT` would produce. Ideal for CI
	/// pipelines that commit expanded documents.
	Check {
		/// The source document containing include markers.
		input: PathBuf,

		/// The generated document to compare against.
		expected: PathBuf,

		/// Show a unified diff between the generated and expected content.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
	/// GitHub Actions annotation format. Emits `::warning` annotations that
	/// appear inline on pull request diffs.
	Github,
}
