//! End-to-end publish runs into a temporary directory

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use docweave_core::{
    parse_input, publish, Config, HtmlRenderer, Input, PublishError, PublishOptions,
};

const INPUT: &str = r##"{
  "doclets": [
    {
      "kind": "package",
      "name": "widgets",
      "version": "1.0.0"
    },
    {
      "kind": "class",
      "name": "Widget",
      "longname": "Widget",
      "scope": "global",
      "description": "<p>Draws things. See {@link Widget#render|render} and {@tutorial basics}.</p>",
      "params": [{"name": "options", "type": {"names": ["Object"]}, "optional": true}],
      "see": ["#render", "Gadget"],
      "meta": {"path": "SRC_DIR", "filename": "widget.js", "lineno": 3}
    },
    {
      "kind": "function",
      "name": "render",
      "longname": "Widget#render",
      "memberof": "Widget",
      "scope": "instance",
      "params": [{"name": "x", "optional": true, "nullable": true}],
      "returns": [{"type": {"names": ["string"]}}],
      "meta": {"path": "SRC_DIR", "filename": "widget.js", "lineno": 10}
    },
    {
      "kind": "class",
      "name": "Secret",
      "longname": "Secret",
      "access": "private",
      "scope": "global",
      "description": "<p>Hidden.</p>"
    },
    {
      "kind": "constant",
      "name": "MAX",
      "longname": "MAX",
      "scope": "global",
      "type": {"names": ["number"]},
      "description": "<p>Uses {@link Secret}.</p>"
    },
    {
      "kind": "function",
      "name": "ghost",
      "longname": "ghost",
      "undocumented": true
    }
  ],
  "tutorials": [
    {"name": "basics", "title": "Basics", "content": "<p>Start here.</p>", "children": ["advanced"]},
    {"name": "advanced", "title": "Advanced", "content": "<p>Then this.</p>"},
    {"name": "faq", "title": "FAQ", "content": "<p>Questions.</p>"}
  ]
}"##;

fn input(src_dir: &Path) -> Input {
    let json = INPUT.replace("SRC_DIR", &src_dir.to_string_lossy());
    parse_input(&json).unwrap()
}

fn setup() -> (TempDir, TempDir) {
    let src = TempDir::new().unwrap();
    fs::write(
        src.path().join("widget.js"),
        "class Widget {\n  render(x) { return `<b>${x}</b>`; }\n}\n",
    )
    .unwrap();
    let out = TempDir::new().unwrap();
    (src, out)
}

fn options(out: &Path) -> PublishOptions {
    PublishOptions {
        destination: out.to_path_buf(),
        readme: Some("<h1>Widgets</h1>".to_string()),
        ..PublishOptions::default()
    }
}

#[test]
fn test_full_publish() {
    let (src, out) = setup();
    let config = Config::parse("[template]\nhide-private = true\n").unwrap();

    let report = publish(
        input(src.path()),
        &config,
        &options(out.path()),
        &HtmlRenderer::default(),
    )
    .unwrap();

    let root = out.path().join("widgets").join("1.0.0");
    assert_eq!(report.output_dir, root);
    assert_eq!(
        report.pages,
        vec![
            "widget.js.html",
            "global.html",
            "index.html",
            "Secret.html",
            "Widget.html",
            "tutorial-basics.html",
            "tutorial-advanced.html",
            "tutorial-faq.html",
        ]
    );
    assert_eq!(report.skipped_sources, 0);
    for page in &report.pages {
        assert!(root.join(page).is_file(), "missing {}", page);
    }

    let widget = fs::read_to_string(root.join("Widget.html")).unwrap();
    // Placeholders resolved against the registry
    assert!(widget.contains("<a href=\"Widget.html#render\">render</a>"));
    assert!(widget.contains("<a href=\"tutorial-basics.html\">Basics</a>"));
    // Hash see-reference anchored on the page, unknown reference left as text
    assert!(widget.contains("<a href=\"Widget.html#render\">#render</a>"));
    assert!(widget.contains("<li>Gadget</li>"));
    // Method signature
    assert!(widget.contains(
        "render(x<span class=\"signature-attributes\">opt, nullable</span>)<span class=\"type-signature\"> &rarr; {string}</span>"
    ));
    // Source link
    assert!(widget.contains("<a href=\"widget.js.html#line10\">widget.js, line 10</a>"));

    // The private class is out of the navigation but keeps its page and link
    assert!(!widget.contains("<a href=\"Secret.html\">Secret</a></li>"));
    let global = fs::read_to_string(root.join("global.html")).unwrap();
    assert!(global.contains("Uses <a href=\"Secret.html\">Secret</a>."));
    assert!(global.contains("(constant) "));

    let source = fs::read_to_string(root.join("widget.js.html")).unwrap();
    assert!(source.contains("return `&lt;b&gt;${x}&lt;/b&gt;`;"));

    let home = fs::read_to_string(root.join("index.html")).unwrap();
    assert!(home.contains("<h1>Widgets</h1>"));
    assert!(home.contains("widgets 1.0.0"));

    let advanced = fs::read_to_string(root.join("tutorial-advanced.html")).unwrap();
    assert!(advanced.contains("<title>Tutorial: Advanced - Documentation</title>"));
}

#[test]
fn test_pruned_symbols_have_no_output() {
    let (src, out) = setup();
    let report = publish(
        input(src.path()),
        &Config::default(),
        &options(out.path()),
        &HtmlRenderer::default(),
    )
    .unwrap();

    let global = fs::read_to_string(report.output_dir.join("global.html")).unwrap();
    assert!(!global.contains("ghost"));
}

#[test]
fn test_missing_source_file_is_skipped() {
    let (src, out) = setup();
    let input = input(src.path());
    fs::remove_file(src.path().join("widget.js")).unwrap();

    let report = publish(
        input,
        &Config::default(),
        &options(out.path()),
        &HtmlRenderer::default(),
    )
    .unwrap();

    assert_eq!(report.skipped_sources, 1);
    assert!(!report.pages.iter().any(|p| p == "widget.js.html"));
    assert!(report.pages.iter().any(|p| p == "Widget.html"));
}

#[test]
fn test_source_output_disabled() {
    let (src, out) = setup();
    let config = Config::parse("[template]\noutput-source-files = false\n").unwrap();
    let report = publish(
        input(src.path()),
        &config,
        &options(out.path()),
        &HtmlRenderer::default(),
    )
    .unwrap();

    assert!(!report.pages.iter().any(|p| p == "widget.js.html"));
    let widget = fs::read_to_string(report.output_dir.join("Widget.html")).unwrap();
    assert!(!widget.contains("line 10"));
}

#[test]
fn test_runs_do_not_share_state() {
    let (src, out) = setup();
    let first = publish(
        input(src.path()),
        &Config::default(),
        &options(out.path()),
        &HtmlRenderer::default(),
    )
    .unwrap();
    let second = publish(
        input(src.path()),
        &Config::default(),
        &options(out.path()),
        &HtmlRenderer::default(),
    )
    .unwrap();
    assert_eq!(first.pages, second.pages);
}

#[test]
fn test_unwritable_output_is_fatal() {
    let (src, out) = setup();
    let blocker = out.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let err = publish(
        input(src.path()),
        &Config::default(),
        &options(&blocker),
        &HtmlRenderer::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PublishError::OutputDir { .. }));
}
