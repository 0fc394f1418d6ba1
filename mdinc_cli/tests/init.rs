mod common;

use mdinc_core::AnyEmptyResult;
use mdinc_core::DEFAULT_MAX_FILE_SIZE;
use mdinc_core::Encoding;
use mdinc_core::IncludeConfig;

#[test]
fn init_creates_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::mdinc_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("init")
		.assert()
		.success()
		.stdout(predicates::str::contains("Created"));

	let config_path = tmp.path().join("mdinc.toml");
	assert!(config_path.exists());

	let Some(config) = IncludeConfig::load(tmp.path())? else {
		panic!("expected the generated config to be discovered");
	};
	assert_eq!(config.encoding, Encoding::Utf8);
	assert_eq!(config.heading_offset, 0);
	assert!(!config.inherit_heading_depth);
	assert!(!config.relative_includes);
	assert!(!config.throw_exception);
	assert!(!config.strict_front_matter);
	assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);

	let written = std::fs::read_to_string(config_path)?;
	assert!(written.contains("strict_front_matter = false"));
	assert!(written.contains("max_file_size = "));

	Ok(())
}

#[test]
fn init_keeps_existing_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".mdinc.toml"), "heading_offset = 2\n")?;

	common::mdinc_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("init")
		.assert()
		.success()
		.stdout(predicates::str::contains("Config file already exists"));

	assert!(!tmp.path().join("mdinc.toml").exists());
	similar_asserts::assert_eq!(
		std::fs::read_to_string(tmp.path().join(".mdinc.toml"))?,
		"heading_offset = 2\n"
	);

	Ok(())
}
