use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::{CliTest, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in [
        "includes",
        "ignores",
        "output",
        "startDelim",
        "endDelim",
        "markerName",
        "markerNames",
        "lineNumbers",
        "extensions",
    ] {
        assert!(parsed.get(field).is_some(), "Config should have '{field}' field");
    }
    assert_eq!(parsed["extensions"]["html"], "html");
    assert_eq!(parsed["extensions"]["js"], "js");

    assert!(
        content.contains("  "),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .gettext-extract.json

    ----- stderr -----
    ");

    assert!(test.root().join(".gettext-extract.json").exists());
    let content = test.read_file(".gettext-extract.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".gettext-extract.json", "{}")?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    Error: .gettext-extract.json already exists
    ");

    assert_eq!(test.read_file(".gettext-extract.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("src/index.html", "<h1 translate>Welcome</h1>")?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 1 string from 1 file into template.pot

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("extract"));
    assert!(stdout(&output).contains("init"));

    Ok(())
}
