//! Host boundary driven by a config file on disk.

use std::path::Path;

use asyncgen_core::{Error, Host, HostConfig, CONFIG_FILE_NAME};
use tempfile::tempdir;

#[test]
fn test_load_config_and_transform() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"include": ["src/**"], "extensions": ["js", "ts"], "includeHelper": false}"#,
    )
    .unwrap();

    let path = HostConfig::find_in(dir.path()).unwrap();
    let config = HostConfig::load(&path).unwrap();
    assert_eq!(config.exclude, vec!["**/node_modules/**".to_string()]);
    assert!(config.options.fast_skip);
    assert!(!config.options.include_helper);

    let host = Host::new(config).unwrap();
    assert!(host.should_transform(Path::new("src/a.js")));
    assert!(host.should_transform(Path::new("src/b.ts")));
    assert!(!host.should_transform(Path::new("lib/a.js")));
    assert!(!host.should_transform(Path::new("src/node_modules/x/a.js")));

    let out = host
        .transform_file("async function f() { await g() }", Path::new("src/a.js"))
        .unwrap();
    assert_eq!(out, "function f() {return __async(function*(){ yield g() }())}");

    let skipped = host
        .transform_file("async function f() { await g() }", Path::new("lib/a.js"))
        .unwrap();
    assert_eq!(skipped, "async function f() { await g() }");
}

#[test]
fn test_missing_config_file() {
    let dir = tempdir().unwrap();
    assert!(HostConfig::find_in(dir.path()).is_none());
    match HostConfig::load(&dir.path().join(CONFIG_FILE_NAME)) {
        Err(Error::ConfigRead { path, .. }) => assert!(path.ends_with(CONFIG_FILE_NAME)),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_malformed_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, r#"{"include": "src/**"}"#).unwrap();
    match HostConfig::load(&path) {
        Err(Error::ConfigParse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_transform_error_carries_path() {
    let host = Host::new(HostConfig::default()).unwrap();
    let err = host
        .transform_file("async function f() {\n  await\n}}", Path::new("bad.js"))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Failed to transform bad.js: SyntaxError: "), "{message}");
}
