//! End-to-end export tests: library pipeline and the CLI binary.
//!
//! Archives are read back with the `zip` crate and checked entry by entry.

use checklist_export::archive::{MemorySink, read_entries};
use checklist_export::document::ChecklistDocument;
use checklist_export::export::export_checklist;
use checklist_export::manifest::FALLBACK_DESCRIPTION;
use checklist_export::markup::{DATA_PREFIX, DATA_SUFFIX};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn fixture_document() -> ChecklistDocument {
    let json = std::fs::read_to_string(fixtures().join("checklist.json")).unwrap();
    ChecklistDocument::from_json(&json).unwrap()
}

/// Export through a memory sink and return `(filename, entries by path)`.
fn export_entries(doc: &ChecklistDocument) -> (String, BTreeMap<String, Vec<u8>>) {
    let sink = MemorySink::new();
    let outcome = export_checklist(doc, &sink);
    assert!(outcome.is_success(), "export failed: {:?}", outcome.error());
    let (filename, archive) = sink.take().pop().unwrap();
    (filename, read_entries(&archive).unwrap().into_iter().collect())
}

fn entry_json(entries: &BTreeMap<String, Vec<u8>>, path: &str) -> serde_json::Value {
    serde_json::from_slice(&entries[path]).unwrap()
}

fn embedded_data(script: &str) -> serde_json::Value {
    let start = script.find(DATA_PREFIX).unwrap() + DATA_PREFIX.len();
    let end = start + script[start..].find(DATA_SUFFIX).unwrap();
    serde_json::from_str(&script[start..end]).unwrap()
}

fn run_cli(args: &[&str], cwd: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_checklist-export"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to run checklist-export")
}

// ---------------------------------------------------------------------------
// Library pipeline
// ---------------------------------------------------------------------------

#[test]
fn archive_contains_exactly_the_bundle_files() {
    let (_, entries) = export_entries(&fixture_document());
    let names: Vec<&str> = entries.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![
            "README.md",
            "icons/icon-128.png",
            "icons/icon-16.png",
            "icons/icon-48.png",
            "manifest.json",
            "popup.html",
            "popup.js",
            "styles.css",
        ]
    );
}

#[test]
fn manifest_mirrors_document() {
    let doc = fixture_document();
    let (_, entries) = export_entries(&doc);
    let manifest = entry_json(&entries, "manifest.json");
    assert_eq!(manifest["name"], doc.name.as_str());
    assert_eq!(manifest["description"], "Everything before going live");
    assert_eq!(manifest["manifest_version"], 3);
    assert_eq!(manifest["permissions"], serde_json::json!(["storage"]));
}

#[test]
fn empty_description_uses_fallback() {
    let mut doc = fixture_document();
    doc.description = Some(String::new());
    let (_, entries) = export_entries(&doc);
    assert_eq!(
        entry_json(&entries, "manifest.json")["description"],
        FALLBACK_DESCRIPTION
    );
}

#[test]
fn filename_follows_slug_rule() {
    let mut doc = fixture_document();
    doc.name = "My Checklist! 2024".into();
    let (filename, _) = export_entries(&doc);
    assert_eq!(filename, "my-checklist--2024-chrome-extension.zip");
}

#[test]
fn repeated_exports_are_byte_identical() {
    let doc = fixture_document();
    let (_, first) = export_entries(&doc);
    let (_, second) = export_entries(&doc);
    assert_eq!(first, second);
}

#[test]
fn every_category_and_item_appears_once_in_order() {
    let doc = fixture_document();
    let (_, entries) = export_entries(&doc);
    let script = String::from_utf8(entries["popup.js"].clone()).unwrap();
    let data = embedded_data(&script);

    let categories = data["categories"].as_array().unwrap();
    let category_ids: Vec<&str> = categories.iter().map(|c| c["id"].as_str().unwrap()).collect();
    let expected: Vec<&str> = doc.categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(category_ids, expected);

    let item_ids: Vec<&str> = categories
        .iter()
        .flat_map(|c| c["items"].as_array().unwrap())
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    let expected: Vec<&str> = doc
        .categories
        .iter()
        .flat_map(|c| &c.items)
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(item_ids, expected);
}

#[test]
fn theme_color_reaches_stylesheet() {
    let (_, entries) = export_entries(&fixture_document());
    let css = String::from_utf8(entries["styles.css"].clone()).unwrap();
    assert!(css.contains("--primary: #10b981;"));
}

#[test]
fn icons_are_pngs_of_declared_sizes() {
    let (_, entries) = export_entries(&fixture_document());
    for size in [16u32, 48, 128] {
        let png = &entries[&format!("icons/icon-{size}.png")];
        let img = image::load_from_memory(png).unwrap();
        assert_eq!((img.width(), img.height()), (size, size));
    }
}

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[test]
fn cli_exports_fixture_into_output_dir() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let fixture = fixtures().join("checklist.json");
    let result = run_cli(
        &[
            "export",
            fixture.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ],
        tmp.path(),
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let archive = std::fs::read(out.join("launch-checklist-chrome-extension.zip")).unwrap();
    assert_eq!(read_entries(&archive).unwrap().len(), 8);

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Launch Checklist \u{2192} "));
    assert!(stdout.contains("Exported 1 checklist"));
}

#[test]
fn cli_uses_output_dir_from_config() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("export.toml"),
        "output_dir = \"bundles\"\n\n[archive]\ncompression_level = 1\n",
    )
    .unwrap();
    let fixture = fixtures().join("checklist.json");
    let result = run_cli(&["export", fixture.to_str().unwrap()], tmp.path());
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(
        tmp.path()
            .join("bundles/launch-checklist-chrome-extension.zip")
            .exists()
    );
}

#[test]
fn cli_reports_invalid_document_and_fails() {
    let tmp = TempDir::new().unwrap();
    let bad = tmp.path().join("bad.json");
    std::fs::write(&bad, r#"{"name": "  "}"#).unwrap();
    let result = run_cli(
        &["export", bad.to_str().unwrap(), "--output", "out"],
        tmp.path(),
    );
    assert!(!result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("bad.json: invalid document"));
    assert!(!tmp.path().join("out").join("--chrome-extension.zip").exists());
}

#[test]
fn cli_keeps_every_archive_when_names_share_a_slug() {
    let tmp = TempDir::new().unwrap();
    let mut doc = fixture_document();
    let mut paths = Vec::new();
    for (file, name) in [("a.json", "My List"), ("b.json", "my list"), ("c.json", "MY-LIST")] {
        doc.name = name.into();
        let path = tmp.path().join(file);
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
        paths.push(path);
    }

    let mut args = vec!["export"];
    args.extend(paths.iter().map(|p| p.to_str().unwrap()));
    args.extend(["--output", "out"]);
    let result = run_cli(&args, tmp.path());
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let out = tmp.path().join("out");
    let mut archives: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    archives.sort();
    assert_eq!(
        archives,
        vec![
            "my-list-chrome-extension (1).zip",
            "my-list-chrome-extension (2).zip",
            "my-list-chrome-extension.zip",
        ]
    );

    // Input order decides who keeps the plain name.
    let names: Vec<String> = [
        "my-list-chrome-extension.zip",
        "my-list-chrome-extension (1).zip",
        "my-list-chrome-extension (2).zip",
    ]
    .iter()
    .map(|file| {
        let archive = std::fs::read(out.join(file)).unwrap();
        let entries: BTreeMap<String, Vec<u8>> =
            read_entries(&archive).unwrap().into_iter().collect();
        entry_json(&entries, "manifest.json")["name"]
            .as_str()
            .unwrap()
            .to_string()
    })
    .collect();
    assert_eq!(names, vec!["My List", "my list", "MY-LIST"]);
}

#[test]
fn cli_without_overwrite_refuses_existing_archive() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("export.toml"),
        "[archive]\noverwrite = false\n",
    )
    .unwrap();
    std::fs::create_dir(tmp.path().join("out")).unwrap();
    let existing = tmp.path().join("out/launch-checklist-chrome-extension.zip");
    std::fs::write(&existing, b"keep me").unwrap();

    let fixture = fixtures().join("checklist.json");
    let result = run_cli(
        &["export", fixture.to_str().unwrap(), "--output", "out"],
        tmp.path(),
    );
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stdout).contains("already exists"));
    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
    assert_eq!(std::fs::read_dir(tmp.path().join("out")).unwrap().count(), 1);
}

#[test]
fn cli_check_lists_categories() {
    let tmp = TempDir::new().unwrap();
    let fixture = fixtures().join("checklist.json");
    let result = run_cli(&["check", fixture.to_str().unwrap()], tmp.path());
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("001 Prep (3 items)"));
    assert!(stdout.contains("002 Launch (5 items)"));
}

#[test]
fn cli_import_then_export() {
    let tmp = TempDir::new().unwrap();
    let doc_path = tmp.path().join("trip.json");
    let import = fixtures().join("import.json");
    let result = run_cli(
        &[
            "import",
            import.to_str().unwrap(),
            "--id",
            "trip-1",
            "--out",
            doc_path.to_str().unwrap(),
        ],
        tmp.path(),
    );
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let doc = ChecklistDocument::from_json(&std::fs::read_to_string(&doc_path).unwrap()).unwrap();
    assert_eq!(doc.name, "Weekend Trip");
    assert_eq!(doc.categories.len(), 2);
    assert_eq!(doc.categories[0].items[0].bullet_points, vec!["Check expiry date"]);

    let result = run_cli(
        &["export", doc_path.to_str().unwrap(), "--output", "out"],
        tmp.path(),
    );
    assert!(result.status.success());
    assert!(tmp.path().join("out/weekend-trip-chrome-extension.zip").exists());
}

#[test]
fn cli_preview_shows_percentage() {
    let tmp = TempDir::new().unwrap();
    let fixture = fixtures().join("checklist.json");
    let result = run_cli(
        &[
            "preview",
            fixture.to_str().unwrap(),
            "--completed",
            "1712345678903,1712345678907,1712345678908,1712345678909",
        ],
        tmp.path(),
    );
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.starts_with("Launch Checklist 50% "));
}

#[test]
fn cli_gen_config_is_valid_toml() {
    let tmp = TempDir::new().unwrap();
    let result = run_cli(&["gen-config"], tmp.path());
    assert!(result.status.success());
    let parsed: toml::Value = toml::from_str(&String::from_utf8_lossy(&result.stdout)).unwrap();
    assert_eq!(parsed["output_dir"].as_str(), Some("dist"));
}
