//! Integration tests for `asyncgen transform` and `asyncgen helpers`.

use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "asyncgen-cli", "--bin", "asyncgen", "--"]);
    cmd
}

#[test]
fn test_transform_single_file_to_stdout() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.js"),
        "async function f() { return await g() }\n",
    )
    .unwrap();

    let output = cargo_bin()
        .args(["transform", "a.js", "--no-helpers", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run transform command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "function f() {return __async(function*(){ return yield g() }())}\n"
    );
}

#[test]
fn test_transform_json_reports_statuses() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src/node_modules/dep")).unwrap();
    std::fs::write(dir.path().join("src/a.js"), "async function f() {}").unwrap();
    std::fs::write(dir.path().join("src/b.js"), "function f() {}").unwrap();
    std::fs::write(dir.path().join("src/notes.txt"), "async").unwrap();
    std::fs::write(
        dir.path().join("src/node_modules/dep/index.js"),
        "async function f() {}",
    )
    .unwrap();

    let output = cargo_bin()
        .args(["transform", "src", "--out-dir", "out", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run transform command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");

    assert_eq!(json["ok"], true);
    assert_eq!(json["counts"]["total"], 4);
    assert_eq!(json["counts"]["transformed"], 1);
    assert_eq!(json["counts"]["unchanged"], 1);
    assert_eq!(json["counts"]["skipped"], 2);
    assert!(json["files"].is_array());

    let a = std::fs::read_to_string(dir.path().join("out/a.js")).unwrap();
    assert!(a.starts_with("function f() {return __async(function*(){}())}\nfunction __async("));
    let dep = std::fs::read_to_string(dir.path().join("out/node_modules/dep/index.js")).unwrap();
    assert_eq!(dep, "async function f() {}");
}

#[test]
fn test_transform_source_map_written() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.js"), "async function f() {\n  await x\n}").unwrap();

    let output = cargo_bin()
        .args(["transform", "a.js", "-o", "out", "--source-map", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run transform command");

    assert!(output.status.success());
    let code = std::fs::read_to_string(dir.path().join("out/a.js")).unwrap();
    assert!(code.ends_with("\n//# sourceMappingURL=a.js.map\n"));
    let map = std::fs::read_to_string(dir.path().join("out/a.js.map")).unwrap();
    let map: serde_json::Value = serde_json::from_str(&map).unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["sources"][0], "a.js");
}

#[test]
fn test_transform_syntax_error_fails() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("bad.js"), "async function (").unwrap();

    let output = cargo_bin()
        .args(["transform", "bad.js", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run transform command");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(json["ok"], false);
    assert_eq!(json["files"][0]["status"], "failed");
    assert_eq!(json["files"][0]["error"]["code"], "ASYNCGEN_SYNTAX_ERROR");
}

#[test]
fn test_transform_requires_out_dir_for_many_files() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.js"), "").unwrap();
    std::fs::write(dir.path().join("b.js"), "").unwrap();

    let output = cargo_bin()
        .args(["transform", "a.js", "b.js", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run transform command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--out-dir is required"), "{stderr}");
}

#[test]
fn test_helpers_selection() {
    let output = cargo_bin()
        .args(["helpers", "--async-iterator"])
        .output()
        .expect("Failed to run helpers command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("function __asyncIterator("));
    assert!(!stdout.contains("function __async("));

    let output = cargo_bin()
        .args(["helpers", "--json"])
        .output()
        .expect("Failed to run helpers command");
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(json["used"]["asyncFn"], true);
    assert_eq!(json["used"]["forAwait"], true);
}
