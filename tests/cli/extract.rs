use anyhow::Result;
use insta::assert_snapshot;
use insta_cmd::assert_cmd_snapshot;
use polib::message::MessageView;
use pretty_assertions::assert_eq;

use crate::CliTest;

/// (msgctxt, msgid, references) of every message, in file order.
fn summarize(po: &polib::catalog::Catalog) -> Vec<(String, String, String)> {
    po.messages()
        .map(|m| {
            (
                m.msgctxt().to_string(),
                m.msgid().to_string(),
                m.source().to_string(),
            )
        })
        .collect()
}

fn entry(msgctxt: &str, msgid: &str, source: &str) -> (String, String, String) {
    (msgctxt.to_string(), msgid.to_string(), source.to_string())
}

#[test]
fn test_extract_default_project() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "src/views/cart.html",
        r#"<div>
  <p translate translate-plural="{{$count}} items" translate-context="cart">1 item</p>
  <span title="{{'Hello' | translate}}">{{ 'banana' | translate }}</span>
</div>
"#,
    )?;
    test.write_file(
        "src/app.js",
        r#"angular.module('app').controller('Ctrl', function (gettextCatalog) {
    /// Greeting shown on the home page
    var hello = gettextCatalog.getString('Hello');
    gettext('Save', undefined, 'button');
    gettext('Apple');
});
"#,
    )?;
    test.write_file("src/notes.txt", "gettext('Not scanned')")?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 5 strings from 2 files into template.pot

    ----- stderr -----
    ");

    assert_snapshot!(test.read_file("template.pot")?.trim_start(), @r##"
    msgid ""
    msgstr ""
    "Project-Id-Version: \n"
    "POT-Creation-Date: \n"
    "PO-Revision-Date: \n"
    "Last-Translator: \n"
    "Language-Team: \n"
    "MIME-Version: \n"
    "Content-Type: text/plain; charset=UTF-8\n"
    "Content-Transfer-Encoding: 8bit\n"
    "Language: \n"
    "Plural-Forms: nplurals=2; plural=(n != 1);\n"

    #: src/views/cart.html:2
    msgctxt "cart"
    msgid "1 item"
    msgid_plural "{{$count}} items"
    msgstr[0] ""
    msgstr[1] ""

    #: src/app.js:5
    msgid "Apple"
    msgstr ""

    #: src/views/cart.html:3
    msgid "banana"
    msgstr ""

    #. Greeting shown on the home page
    #: src/app.js:3 src/views/cart.html:3
    msgid "Hello"
    msgstr ""

    #: src/app.js:4
    msgctxt "button"
    msgid "Save"
    msgstr ""
    "##);

    // The written template reads back as a valid catalog.
    let po = test.read_po("template.pot")?;
    assert_eq!(po.count(), 5);
    assert_eq!(po.metadata.plural_rules.nplurals, 2);

    Ok(())
}

#[test]
fn test_extract_explicit_inputs_and_output() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("client/a.js", "gettext('From a');")?;
    test.write_file("client/b.js", "gettext('From b');")?;
    test.write_file("other/c.js", "gettext('From c');")?;

    assert_cmd_snapshot!(test.extract_command().args(["client/*.js", "-o", "po/client.pot"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 2 strings from 2 files into po/client.pot

    ----- stderr -----
    ");

    let po = test.read_po("po/client.pot")?;
    let msgids: Vec<_> = po.messages().map(|m| m.msgid().to_string()).collect();
    assert_eq!(msgids, vec!["From a", "From b"]);
    assert!(!test.root().join("template.pot").exists());

    Ok(())
}

#[test]
fn test_extract_custom_marker_and_no_line_numbers() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.js",
        "_t('Custom');\n_t('Custom');\ngettext('Default');\n",
    )?;

    assert_cmd_snapshot!(test.extract_command().args(["--marker-name", "_t", "--no-line-numbers"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 2 strings from 1 file into template.pot

    ----- stderr -----
    ");

    let po = test.read_po("template.pot")?;
    assert_eq!(
        summarize(&po),
        vec![
            entry("", "Custom", "src/app.js"),
            entry("", "Default", "src/app.js"),
        ]
    );

    Ok(())
}

#[test]
fn test_extract_uses_config_file() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".gettext-extract.json",
        r#"{
  "includes": ["app"],
  "ignores": ["app/vendor"],
  "output": "i18n/app.pot",
  "startDelim": "[[",
  "endDelim": "]]",
  "extensions": { "tpl": "markup", "ts": "script" }
}"#,
    )?;
    test.write_file(
        "app/view.tpl",
        "<p>[[ 'Custom delimiters' | translate ]] {{ 'Ignored' | translate }}</p>",
    )?;
    test.write_file("app/main.ts", "const title: string = gettext('Typed');")?;
    test.write_file("app/vendor/lib.ts", "gettext('Vendored');")?;
    test.write_file("app/index.html", "<p translate>Unknown extension</p>")?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 2 strings from 2 files into i18n/app.pot

    ----- stderr -----
    ");

    let po = test.read_po("i18n/app.pot")?;
    let msgids: Vec<_> = po.messages().map(|m| m.msgid().to_string()).collect();
    assert_eq!(msgids, vec!["Custom delimiters", "Typed"]);

    Ok(())
}

#[test]
fn test_extract_nested_template_lines() -> Result<()> {
    let test = CliTest::with_file(
        "src/index.html",
        r#"<html>
<body>
<script type="text/ng-template" id="dialog.html">
  <div>
    <h2 translate>Dialog title</h2>
  </div>
</script>
<script>
  var x = gettext('Inline script');
</script>
</body>
</html>
"#,
    )?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 2 strings from 1 file into template.pot

    ----- stderr -----
    ");

    let po = test.read_po("template.pot")?;
    assert_eq!(
        summarize(&po),
        vec![
            entry("", "Dialog title", "src/index.html:5"),
            entry("", "Inline script", "src/index.html:9"),
        ]
    );

    Ok(())
}

#[test]
fn test_extract_plural_conflict_fails() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "src/a.html",
        r#"<p translate translate-plural="Birds">Bird</p>"#,
    )?;
    test.write_file(
        "src/b.js",
        "gettextCatalog.getPlural(n, 'Bird', 'Birdies');",
    )?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: Incompatible plural definitions for Bird: Birds / Birdies (in: src/a.html:1, src/b.js:1)
    ");

    assert!(!test.root().join("template.pot").exists());

    Ok(())
}

#[test]
fn test_extract_skips_unparsable_sources() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/broken.js", "gettext('Broken'")?;
    test.write_file("src/ok.js", "gettext('Fine');")?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 1 string from 2 files into template.pot

    ----- stderr -----
    ");

    let po = test.read_po("template.pot")?;
    let msgids: Vec<_> = po.messages().map(|m| m.msgid().to_string()).collect();
    assert_eq!(msgids, vec!["Fine"]);

    Ok(())
}

#[test]
fn test_extract_missing_input_warns() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.extract_command().arg("nowhere"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 0 strings from 0 files into template.pot

    ----- stderr -----
    warning: 1 input(s) could not be read (use -v for details)
    ");

    Ok(())
}

#[test]
fn test_extract_invalid_config_fails() -> Result<()> {
    let test = CliTest::with_file(".gettext-extract.json", r#"{ "ignores": ["[bad"] }"#)?;

    assert_cmd_snapshot!(test.extract_command(), @r#"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: Invalid glob pattern in 'ignores': "[bad"
    "#);

    Ok(())
}

#[test]
fn test_extract_malformed_config_names_the_file() -> Result<()> {
    let test = CliTest::with_file(".gettext-extract.json", "{ not json")?;

    let _guard = test.settings().bind_to_scope();
    assert_cmd_snapshot!(test.extract_command(), @r#"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: Failed to parse config file: "[ROOT]/.gettext-extract.json"
    "#);

    Ok(())
}
