use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use mdinc_cli::Commands;
use mdinc_cli::MdincCli;
use mdinc_cli::OutputFormat;
use mdinc_core::AnyEmptyResult;
use mdinc_core::AnyResult;
use mdinc_core::DEFAULT_MAX_FILE_SIZE;
use mdinc_core::Expansion;
use mdinc_core::IncludeConfig;
use mdinc_core::IncludeWarning;
use mdinc_core::Includer;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = MdincCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Expand { input, output }) => run_expand(&args, input, output.as_deref()),
		Some(Commands::Check {
			input,
			expected,
			diff,
			format,
		}) => run_check(&args, input, expected, *diff, *format),
		None => {
			eprintln!("No subcommand specified. Run `mdinc --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<mdinc_core::IncludeError>() {
			Ok(include_err) => {
				let report: miette::Report = (*include_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr. They are silent unless `--verbose` is passed or
/// `RUST_LOG` is set.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "mdinc_core=debug" } else { "off" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.try_init()
		.ok();
}

fn resolve_root(args: &MdincCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load `mdinc.toml` from the project root and apply command line overrides.
/// Without a config file, includes resolve against the project root.
fn load_config(args: &MdincCli) -> AnyResult<IncludeConfig> {
	let root = resolve_root(args);
	let mut config = IncludeConfig::load(&root)?.unwrap_or_else(|| {
		IncludeConfig {
			base_path: root.clone(),
			..IncludeConfig::default()
		}
	});
	args.options.apply(&mut config)?;

	if args.verbose {
		match IncludeConfig::resolve_path(&root) {
			Some(path) => eprintln!("Using config {}", path.display()),
			None => eprintln!("No config file found in {}", root.display()),
		}
	}

	Ok(config)
}

fn run_init(args: &MdincCli) -> AnyEmptyResult {
	let root = resolve_root(args);

	if let Some(existing) = IncludeConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let sample_config = format!(
		r#"# mdinc configuration

# Directory that `{{!path!}}` include markers are resolved against,
# relative to this file.
base_path = "."

# Encoding of included files: utf-8, utf-8-sig, ascii or latin-1.
encoding = "utf-8"

# Add this many `#` characters to every included heading.
heading_offset = 0

# Nest included headings under the heading that precedes the marker.
inherit_heading_depth = false

# Resolve nested includes relative to the file that contains them.
relative_includes = false

# Fail instead of warning when an include cannot be resolved.
throw_exception = false

# Treat a leading `---` without a closing `...` as an error.
strict_front_matter = false

# Largest file that may be included, in bytes.
max_file_size = {DEFAULT_MAX_FILE_SIZE}
"#
	);

	let config_path = root.join("mdinc.toml");
	std::fs::write(&config_path, sample_config)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Add include markers to a document:");
	println!("     {{!chapters/intro.md!}}");
	println!("  2. Run `mdinc expand <document>` to print the expanded result");

	Ok(())
}

fn build_includer(args: &MdincCli) -> AnyResult<Includer> {
	let includer = Includer::new(load_config(args)?);
	if args.verbose {
		eprintln!(
			"Resolving includes against {}",
			includer.config().base_path.display()
		);
	}

	Ok(includer)
}

/// Expand `input`, or stdin when `input` is `-`.
fn expand_input(
	includer: &Includer,
	input: &Path,
) -> AnyResult<Expansion> {
	if input == Path::new("-") {
		let mut content = String::new();
		std::io::stdin().read_to_string(&mut content)?;
		return Ok(includer.expand_source(&content, None)?);
	}

	Ok(includer.expand_file(input)?)
}

fn run_expand(
	args: &MdincCli,
	input: &Path,
	output: Option<&Path>,
) -> AnyEmptyResult {
	let root = resolve_root(args);
	let includer = build_includer(args)?;
	let expansion = expand_input(&includer, input)?;

	if expansion.has_warnings() {
		print_include_warnings(&expansion.warnings, &root);
	}

	let rendered = expansion.render();
	match output {
		Some(path) => {
			std::fs::write(path, &rendered)?;
			if args.verbose {
				eprintln!("Wrote {}", make_relative(path, &root));
			}
		}
		None => print!("{rendered}"),
	}

	Ok(())
}

fn run_check(
	args: &MdincCli,
	input: &Path,
	expected: &Path,
	show_diff: bool,
	format: OutputFormat,
) -> AnyEmptyResult {
	let root = resolve_root(args);
	let includer = build_includer(args)?;
	let expansion = expand_input(&includer, input)?;
	let generated = expansion.render();

	let current = match std::fs::read_to_string(expected) {
		Ok(content) => Some(content),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
		Err(e) => return Err(e.into()),
	};
	let is_stale = current.as_deref() != Some(generated.as_str());
	let expected_rel = make_relative(expected, &root);

	match format {
		OutputFormat::Json => {
			let warnings: Vec<serde_json::Value> = expansion
				.warnings
				.iter()
				.map(|warning| {
					serde_json::json!({
						"source": warning
							.source
							.as_deref()
							.map(|source| make_relative(source, &root)),
						"include": warning.marker,
						"path": make_relative(&warning.path, &root),
						"message": warning.message,
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": !is_stale,
				"file": expected_rel,
				"missing": current.is_none(),
				"warnings": warnings,
			});
			println!("{output}");
		}
		OutputFormat::Github => {
			for warning in &expansion.warnings {
				let source = warning
					.source
					.as_deref()
					.map_or_else(|| make_relative(input, &root), |source| make_relative(source, &root));
				println!(
					"::warning file={source}::Include `{}` could not be resolved: {}",
					warning.marker, warning.message
				);
			}
			if is_stale {
				println!("::error file={expected_rel}::Generated document is out of date");
			} else {
				println!("{expected_rel} is up to date.");
			}
		}
		OutputFormat::Text => {
			if expansion.has_warnings() {
				print_include_warnings(&expansion.warnings, &root);
			}

			if is_stale {
				match &current {
					Some(current) => {
						eprintln!("Check failed: {expected_rel} is out of date.");
						if show_diff {
							print_diff(current, &generated);
						}
					}
					None => eprintln!("Check failed: {expected_rel} does not exist."),
				}
				eprintln!(
					"Run `mdinc expand {} --output {expected_rel}` to fix.",
					make_relative(input, &root)
				);
			} else {
				println!("Check passed: {expected_rel} is up to date.");
			}
		}
	}

	if is_stale {
		process::exit(1);
	}

	Ok(())
}

/// Print includes that were dropped from the document.
fn print_include_warnings(warnings: &[IncludeWarning], root: &Path) {
	for warning in warnings {
		let location = warning
			.source
			.as_deref()
			.map_or_else(|| "document".to_string(), |source| make_relative(source, root));
		eprintln!(
			"{} {location}: ignoring include `{{!{}!}}`: {}",
			colored!("warning:", yellow),
			warning.marker,
			warning.message,
		);
	}
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
