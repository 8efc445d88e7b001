//! `asyncgen transform` command implementation.

use asyncgen_core::{transform, EditedText, Error, Host, HostConfig};
use miette::{miette, IntoDiagnostic, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Transform command action.
#[derive(Debug, Clone)]
pub struct TransformAction {
    pub cwd: PathBuf,
    pub paths: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub no_helpers: bool,
    pub no_fast_skip: bool,
    pub source_map: bool,
    pub force: bool,
}

/// One input file and where its output goes, relative to the output dir.
#[derive(Debug, Clone)]
struct Input {
    path: PathBuf,
    relative: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    Transformed,
    Unchanged,
    Skipped,
    Failed,
}

#[derive(Serialize)]
struct FileResultJson {
    path: String,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<FileErrorJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

#[derive(Serialize)]
struct FileErrorJson {
    code: &'static str,
    message: String,
}

#[derive(Serialize, Default)]
struct CountsJson {
    total: usize,
    transformed: usize,
    unchanged: usize,
    skipped: usize,
    failed: usize,
}

#[derive(Serialize)]
struct TransformResultJson {
    ok: bool,
    counts: CountsJson,
    files: Vec<FileResultJson>,
}

/// What happened to one file.
struct Outcome {
    input: Input,
    status: Status,
    /// Output text, or the original text for skipped files.
    code: Option<String>,
    map: Option<String>,
    error: Option<Error>,
}

pub fn run(action: TransformAction, json: bool) -> Result<()> {
    let host = Host::new(load_config(&action)?).into_diagnostic()?;
    let inputs = collect_inputs(&action)?;

    let out_dir = action.out_dir.as_ref().map(|dir| action.cwd.join(dir));
    if out_dir.is_none() && inputs.len() != 1 {
        return Err(miette!(
            "--out-dir is required when transforming {} files",
            inputs.len()
        ));
    }

    let outcomes: Vec<Outcome> = inputs
        .into_par_iter()
        .map(|input| process(&host, input, &action))
        .collect();

    if let Some(out_dir) = &out_dir {
        for outcome in &outcomes {
            write_outcome(out_dir, outcome)?;
        }
    }

    let counts = count(&outcomes);
    info!(
        total = counts.total,
        transformed = counts.transformed,
        failed = counts.failed,
        "transform finished"
    );

    if json {
        print_json(&outcomes, counts, out_dir.is_none())?;
        if outcomes.iter().any(|o| o.status == Status::Failed) {
            std::process::exit(1);
        }
        return Ok(());
    }

    print_human(&outcomes, &counts, out_dir.as_deref())
}

/// Config from `--config`, else `asyncgen.json` in the working directory,
/// else defaults; command-line switches are applied on top.
fn load_config(action: &TransformAction) -> Result<HostConfig> {
    let path = match &action.config {
        Some(path) => Some(action.cwd.join(path)),
        None => HostConfig::find_in(&action.cwd),
    };
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            HostConfig::load(&path).into_diagnostic()?
        }
        None => HostConfig::default(),
    };

    if action.no_helpers {
        config.options.include_helper = false;
    }
    if action.no_fast_skip {
        config.options.fast_skip = false;
    }
    if action.source_map {
        config.options.source_map = true;
    }
    Ok(config)
}

/// Expand directories into their files, sorted for deterministic output.
fn collect_inputs(action: &TransformAction) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();

    for given in &action.paths {
        let path = action.cwd.join(given);
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(&path).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(&path)
                    .map(Path::to_path_buf)
                    .into_diagnostic()?;
                found.push(Input {
                    path: given.join(&relative),
                    relative,
                });
            }
            found.sort_by(|a, b| a.path.cmp(&b.path));
            inputs.extend(found);
        } else if path.is_file() {
            let relative = given
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| miette!("not a file: {}", given.display()))?;
            inputs.push(Input {
                path: given.clone(),
                relative,
            });
        } else {
            return Err(miette!("no such file or directory: {}", given.display()));
        }
    }

    Ok(inputs)
}

fn process(host: &Host, input: Input, action: &TransformAction) -> Outcome {
    let full = action.cwd.join(&input.path);
    let source = match std::fs::read_to_string(&full) {
        Ok(source) => source,
        Err(e) => return failed(input, Error::Io(e)),
    };

    if !action.force && !host.should_transform(&input.path) {
        debug!(path = %input.path.display(), "skipped");
        return Outcome {
            input,
            status: Status::Skipped,
            code: Some(source),
            map: None,
            error: None,
        };
    }

    match transform(&source, &host.options_for(&input.path)) {
        Ok(result) => finished(input, &result),
        Err(source) => {
            let path = input.path.clone();
            failed(input, Error::Transform { path, source })
        }
    }
}

fn finished(input: Input, result: &EditedText) -> Outcome {
    let map_name = format!("{}.map", file_name(&input.relative));
    let map = result.generate_map(&file_name(&input.relative));
    let mut code = result.code().to_string();
    if map.is_some() {
        code.push_str(&format!("\n//# sourceMappingURL={map_name}\n"));
    }
    Outcome {
        input,
        status: if result.is_edited() {
            Status::Transformed
        } else {
            Status::Unchanged
        },
        code: Some(code),
        map,
        error: None,
    }
}

fn failed(input: Input, error: Error) -> Outcome {
    Outcome {
        input,
        status: Status::Failed,
        code: None,
        map: None,
        error: Some(error),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_outcome(out_dir: &Path, outcome: &Outcome) -> Result<()> {
    let Some(code) = &outcome.code else {
        return Ok(());
    };
    let dest = out_dir.join(&outcome.input.relative);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    std::fs::write(&dest, code).into_diagnostic()?;
    if let Some(map) = &outcome.map {
        let mut map_path = dest.into_os_string();
        map_path.push(".map");
        std::fs::write(PathBuf::from(map_path), map).into_diagnostic()?;
    }
    Ok(())
}

fn count(outcomes: &[Outcome]) -> CountsJson {
    let mut counts = CountsJson {
        total: outcomes.len(),
        ..CountsJson::default()
    };
    for outcome in outcomes {
        match outcome.status {
            Status::Transformed => counts.transformed += 1,
            Status::Unchanged => counts.unchanged += 1,
            Status::Skipped => counts.skipped += 1,
            Status::Failed => counts.failed += 1,
        }
    }
    counts
}

fn error_code(error: &Error) -> &'static str {
    match error {
        Error::Transform { source, .. } => source.code(),
        Error::Io(_) => "ASYNCGEN_IO_ERROR",
        Error::ConfigRead { .. } | Error::ConfigParse { .. } => "ASYNCGEN_CONFIG_ERROR",
        Error::InvalidPattern { .. } => "ASYNCGEN_INVALID_PATTERN",
    }
}

fn print_json(outcomes: &[Outcome], counts: CountsJson, include_code: bool) -> Result<()> {
    let files = outcomes
        .iter()
        .map(|outcome| FileResultJson {
            path: outcome.input.path.display().to_string(),
            status: outcome.status,
            error: outcome.error.as_ref().map(|error| FileErrorJson {
                code: error_code(error),
                message: error.to_string(),
            }),
            code: if include_code {
                outcome.code.clone()
            } else {
                None
            },
        })
        .collect();
    let out = TransformResultJson {
        ok: counts.failed == 0,
        counts,
        files,
    };
    println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
    Ok(())
}

fn print_human(outcomes: &[Outcome], counts: &CountsJson, out_dir: Option<&Path>) -> Result<()> {
    for outcome in outcomes {
        if let Some(error) = &outcome.error {
            eprintln!("error: {error}");
        }
    }

    match out_dir {
        None => {
            if let Some(code) = outcomes.first().and_then(|o| o.code.as_deref()) {
                print!("{code}");
                if !code.ends_with('\n') {
                    println!();
                }
            }
        }
        Some(dir) => println!(
            "{} transformed, {} unchanged, {} skipped, {} failed -> {}",
            counts.transformed,
            counts.unchanged,
            counts.skipped,
            counts.failed,
            dir.display()
        ),
    }

    if counts.failed > 0 {
        return Err(miette!("{} of {} files failed to transform", counts.failed, counts.total));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use asyncgen_core::TransformError;
    use tempfile::tempdir;

    fn action(cwd: &Path, paths: &[&str]) -> TransformAction {
        TransformAction {
            cwd: cwd.to_path_buf(),
            paths: paths.iter().map(PathBuf::from).collect(),
            out_dir: None,
            config: None,
            no_helpers: false,
            no_fast_skip: false,
            source_map: false,
            force: false,
        }
    }

    #[test]
    fn test_collect_inputs_walks_directories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/lib")).unwrap();
        std::fs::write(dir.path().join("src/b.js"), "").unwrap();
        std::fs::write(dir.path().join("src/lib/a.js"), "").unwrap();
        std::fs::write(dir.path().join("main.js"), "").unwrap();

        let inputs = collect_inputs(&action(dir.path(), &["src", "main.js"])).unwrap();
        let paths: Vec<_> = inputs.iter().map(|i| i.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("src/b.js"),
                PathBuf::from("src/lib/a.js"),
                PathBuf::from("main.js"),
            ]
        );
        assert_eq!(inputs[1].relative, PathBuf::from("lib/a.js"));
        assert_eq!(inputs[2].relative, PathBuf::from("main.js"));
    }

    #[test]
    fn test_collect_inputs_missing_path() {
        let dir = tempdir().unwrap();
        assert!(collect_inputs(&action(dir.path(), &["nope.js"])).is_err());
    }

    #[test]
    fn test_load_config_switches_override_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("asyncgen.json"),
            r#"{"includeHelper": true, "exclude": []}"#,
        )
        .unwrap();
        let mut action = action(dir.path(), &[]);
        action.no_helpers = true;
        action.source_map = true;
        let config = load_config(&action).unwrap();
        assert!(config.exclude.is_empty());
        assert!(!config.options.include_helper);
        assert!(config.options.source_map);
    }

    #[test]
    fn test_process_statuses() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.js"), "async function f() {}").unwrap();
        std::fs::write(dir.path().join("b.js"), "function f() {}").unwrap();
        std::fs::write(dir.path().join("c.txt"), "async function f() {}").unwrap();
        std::fs::write(dir.path().join("d.js"), "async function (").unwrap();

        let action = action(dir.path(), &[]);
        let host = Host::new(load_config(&action).unwrap()).unwrap();
        let status = |name: &str| {
            let input = Input {
                path: PathBuf::from(name),
                relative: PathBuf::from(name),
            };
            process(&host, input, &action).status
        };
        assert_eq!(status("a.js"), Status::Transformed);
        assert_eq!(status("b.js"), Status::Unchanged);
        assert_eq!(status("c.txt"), Status::Skipped);
        assert_eq!(status("d.js"), Status::Failed);
    }

    #[test]
    fn test_error_code_from_transform_error() {
        let error = Error::Transform {
            path: PathBuf::from("a.js"),
            source: TransformError::syntax("Unexpected token", 1, 1),
        };
        assert_eq!(error_code(&error), "ASYNCGEN_SYNTAX_ERROR");
    }
}
