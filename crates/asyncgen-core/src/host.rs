//! Host boundary: which files get transformed, and the per-file hook.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::config::{HostConfig, TransformOptions};
use crate::error::Error;
use crate::transform::transform;

const TYPESCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compiled [`HostConfig`].
#[derive(Debug, Clone)]
pub struct Host {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    extensions: Vec<String>,
    options: TransformOptions,
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, Error> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| Error::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

impl Host {
    /// Compile the include and exclude globs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for the first pattern that does not compile.
    pub fn new(config: HostConfig) -> Result<Self, Error> {
        Ok(Self {
            include: compile(&config.include)?,
            exclude: compile(&config.exclude)?,
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            options: config.options,
        })
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Whether `path` should go through the transform.
    pub fn should_transform(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        if !self.extensions.iter().any(|allowed| *allowed == ext) {
            return false;
        }
        if self
            .exclude
            .iter()
            .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
        {
            return false;
        }
        self.include.is_empty()
            || self
                .include
                .iter()
                .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
    }

    /// Options for `path`: TypeScript syntax for TypeScript extensions, with
    /// JSX only for `.tsx`.
    pub fn options_for(&self, path: &Path) -> TransformOptions {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !TYPESCRIPT_EXTENSIONS.contains(&ext.as_str()) {
            return self.options;
        }
        let mut options = self.options.with_typescript(true);
        options.jsx = ext == "tsx";
        options
    }

    /// The per-file hook: `code` rewritten, or unchanged when `path` is filtered out.
    ///
    /// # Errors
    ///
    /// Returns `Transform` with the path when the code cannot be transformed.
    pub fn transform_file(&self, code: &str, path: &Path) -> Result<String, Error> {
        if !self.should_transform(path) {
            debug!(path = %path.display(), "filtered out");
            return Ok(code.to_string());
        }
        let options = self.options_for(path);
        let result = transform(code, &options).map_err(|source| Error::Transform {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), edited = result.is_edited(), "transformed file");
        Ok(result.into_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn host(include: &[&str], exclude: &[&str]) -> Host {
        let defaults = HostConfig::default();
        Host::new(HostConfig {
            include: strings(include),
            exclude: if exclude.is_empty() {
                defaults.exclude.clone()
            } else {
                strings(exclude)
            },
            ..defaults
        })
        .unwrap()
    }

    #[test]
    fn test_should_transform_extensions() {
        let host = host(&[], &[]);
        assert!(host.should_transform(Path::new("src/a.js")));
        assert!(host.should_transform(Path::new("src/a.MJS")));
        assert!(!host.should_transform(Path::new("src/a.ts")));
        assert!(!host.should_transform(Path::new("README")));
    }

    #[test]
    fn test_should_transform_patterns() {
        let h = host(&["src/**"], &[]);
        assert!(h.should_transform(Path::new("src/lib/a.js")));
        assert!(!h.should_transform(Path::new("test/a.js")));
        assert!(!h.should_transform(Path::new("src/node_modules/x/index.js")));

        let host = host(&[], &["**/*.min.js"]);
        assert!(!host.should_transform(Path::new("dist/app.min.js")));
        assert!(host.should_transform(Path::new("node_modules/x/index.js")));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = HostConfig {
            exclude: strings(&["["]),
            ..HostConfig::default()
        };
        match Host::new(config) {
            Err(Error::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "["),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_transform_file() {
        let host = host(&[], &[]);
        let code = "async function f() {}";
        assert_eq!(host.transform_file(code, Path::new("a.txt")).unwrap(), code);
        let out = host.transform_file(code, Path::new("a.js")).unwrap();
        assert!(out.starts_with("function f() {return __async(function*(){}())}\nfunction __async("));

        let err = host
            .transform_file("async function (", Path::new("bad.js"))
            .unwrap_err();
        match err {
            Error::Transform { path, .. } => assert_eq!(path, PathBuf::from("bad.js")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_typescript_by_extension() {
        let mut config = HostConfig::default();
        config.extensions.push("ts".to_string());
        let host = Host::new(config).unwrap();
        assert!(host.options_for(Path::new("a.ts")).typescript);
        assert!(!host.options_for(Path::new("a.js")).typescript);
        assert!(!host.options_for(Path::new("a.ts")).jsx);
        assert!(host.options_for(Path::new("a.TSX")).jsx);
        let out = host
            .transform_file("async function f(a: number) { await a }", Path::new("a.ts"))
            .unwrap();
        assert!(out.starts_with("function f(a: number) {return __async(function*(){ yield a }())}"));
    }
}
