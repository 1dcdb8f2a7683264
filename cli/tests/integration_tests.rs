use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use serde_json::{Value, json};
use tempfile::TempDir;

fn run(dir: &Path, args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_schema-builder"))
        .current_dir(dir)
        .env_remove("SCHEMA_BUILDER_LOG")
        .args(args)
        .output()
        .expect("failed to run schema-builder")
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write fixture");
    path
}

/// Model with a nested object and a numeric enum.
fn write_model(dir: &TempDir) -> PathBuf {
    let model = json!({
        "properties": [
            {"name": "city", "type": "string", "required": true, "hasEnum": false},
            {"name": "level", "type": "number", "required": false, "hasEnum": true, "enum": ["1", "2"]},
            {
                "name": "meta",
                "type": "object",
                "required": true,
                "hasEnum": false,
                "properties": [
                    {"name": "source", "type": "string", "required": false, "hasEnum": false}
                ],
                "additionalObjectProperties": true
            }
        ],
        "additionalProperties": false
    });
    write(dir, "model.json", &serde_json::to_string_pretty(&model).unwrap())
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// compile
// ---------------------------------------------------------------------------

#[test]
fn compile_prints_structured_output_schema() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);

    let output = run(dir.path(), &["compile", model.to_str().unwrap()]);
    assert!(output.status.success());

    let doc = stdout_json(&output);
    assert_eq!(doc["name"], "schema_definition");
    assert_eq!(doc["strict"], true);
    assert_eq!(doc["schema"]["required"], json!(["city", "meta"]));
    assert_eq!(doc["schema"]["properties"]["level"]["enum"], json!([1, 2]));
    assert_eq!(
        doc["schema"]["properties"]["meta"],
        json!({
            "type": "object",
            "properties": {"source": {"type": "string"}},
            "required": [],
            "additionalProperties": true
        })
    );
}

#[test]
fn compile_flags_override_config() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);
    write(
        &dir,
        ".schema-builder.yml",
        "schema_name: from_config\nstrict: true\nadditional_properties: true\n",
    );

    let output = run(dir.path(), &["compile", model.to_str().unwrap()]);
    let doc = stdout_json(&output);
    assert_eq!(doc["name"], "from_config");
    assert_eq!(doc["schema"]["additionalProperties"], true);

    let output = run(
        dir.path(),
        &["compile", model.to_str().unwrap(), "--name", "cli_name", "--no-strict"],
    );
    let doc = stdout_json(&output);
    assert_eq!(doc["name"], "cli_name");
    assert_eq!(doc["strict"], false);
}

#[test]
fn compile_check_fails_on_diagnostics() {
    let dir = TempDir::new().unwrap();
    let model = write(
        &dir,
        "dup.yaml",
        "properties:\n  - {name: a, type: string, required: true}\n  - {name: a, type: string, required: true}\n",
    );

    let output = run(dir.path(), &["compile", model.to_str().unwrap(), "--check"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("root[1]: Duplicate property name: a"), "stderr: {stderr}");
    assert!(stderr.contains("1 validation error(s)"), "stderr: {stderr}");

    // Without --check the schema is still printed.
    let output = run(dir.path(), &["compile", model.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["schema"]["required"], json!(["a", "a"]));
}

#[test]
fn compile_check_rejects_invalid_name() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);

    let output = run(
        dir.path(),
        &["compile", model.to_str().unwrap(), "--check", "--name", "bad name"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid schema name"));
}

#[test]
fn compile_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["compile", "missing.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: "));
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_clean_model() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);

    let output = run(dir.path(), &["validate", model.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("3 root properties"));
}

#[test]
fn validate_json_lists_diagnostics_in_walk_order() {
    let dir = TempDir::new().unwrap();
    let model = write(
        &dir,
        "bad.json",
        r#"{
            "properties": [
                {"name": "", "type": "string", "required": true, "hasEnum": true, "enum": []},
                {"name": "obj", "type": "object", "required": true, "hasEnum": false,
                 "properties": [{"name": "obj", "type": "string", "required": true, "hasEnum": false}]}
            ],
            "additionalProperties": false
        }"#,
    );

    let output = run(dir.path(), &["validate", model.to_str().unwrap(), "--json"]);
    assert!(!output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!([
            {"path": "root[0]", "message": "Property name cannot be empty"},
            {"path": "root[0]", "message": "Enum is enabled but no values are defined"},
            {"path": "root[1].obj[0]", "message": "Duplicate property name: obj"}
        ])
    );
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

#[test]
fn apply_replays_script_and_writes_model() {
    let dir = TempDir::new().unwrap();
    let script = write(
        &dir,
        "edits.yaml",
        r#"
- op: add
- op: add
- op: add
- op: update
  path: [0]
  set: { name: x }
- op: update
  path: [1]
  set: { name: y }
- op: update
  path: [2]
  set: { name: z }
- op: reorder
  from: 0
  to: 2
- op: name
  name: letters
"#,
    );
    let edited = dir.path().join("edited.json");

    let output = run(
        dir.path(),
        &[
            "apply",
            "--script",
            script.to_str().unwrap(),
            "--output",
            edited.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let doc = stdout_json(&output);
    assert_eq!(doc["name"], "letters");
    assert_eq!(doc["schema"]["required"], json!(["y", "z", "x"]));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Applied: 8, Ignored: 0"));

    let saved: Value = serde_json::from_str(&fs::read_to_string(&edited).unwrap()).unwrap();
    let names: Vec<&str> = saved["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["y", "z", "x"]);
}

#[test]
fn apply_counts_ignored_edits() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);
    let script = write(
        &dir,
        "edits.yaml",
        "- op: remove\n  path: [7]\n- op: update\n  path: [2]\n  set: { type: array }\n",
    );

    let output = run(
        dir.path(),
        &["apply", model.to_str().unwrap(), "--script", script.to_str().unwrap()],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Applied: 1, Ignored: 1"));
    assert_eq!(
        stdout_json(&output)["schema"]["properties"]["meta"],
        json!({"type": "array", "items": {"type": "string"}})
    );
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_prints_empty_model() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["init"]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({"properties": [], "additionalProperties": false})
    );
}
