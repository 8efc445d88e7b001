use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Options for a single transform run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TransformOptions {
    /// Return the source untouched when it does not contain `async`.
    pub fast_skip: bool,
    /// Append the runtime helpers the output needs.
    pub include_helper: bool,
    /// Record position markers so a source map can be generated.
    pub source_map: bool,
    /// Accept JSX syntax.
    pub jsx: bool,
    /// Parse as TypeScript.
    pub typescript: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            fast_skip: true,
            include_helper: true,
            source_map: false,
            jsx: true,
            typescript: false,
        }
    }
}

impl TransformOptions {
    #[must_use]
    pub fn with_fast_skip(mut self, fast_skip: bool) -> Self {
        self.fast_skip = fast_skip;
        self
    }

    #[must_use]
    pub fn with_include_helper(mut self, include_helper: bool) -> Self {
        self.include_helper = include_helper;
        self
    }

    #[must_use]
    pub fn with_source_map(mut self, source_map: bool) -> Self {
        self.source_map = source_map;
        self
    }

    #[must_use]
    pub fn with_typescript(mut self, typescript: bool) -> Self {
        self.typescript = typescript;
        self
    }
}

/// Which files a host hands to the transform, and with which options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostConfig {
    /// Glob patterns a path must match. Empty means every path.
    pub include: Vec<String>,
    /// Glob patterns that exclude a path.
    pub exclude: Vec<String>,
    /// File extensions (without the dot) that are transformed.
    pub extensions: Vec<String>,
    #[serde(flatten)]
    pub options: TransformOptions,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: vec!["**/node_modules/**".to_string()],
            extensions: ["js", "mjs", "cjs", "jsx"]
                .into_iter()
                .map(String::from)
                .collect(),
            options: TransformOptions::default(),
        }
    }
}

impl HostConfig {
    /// Load a JSON config file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigRead` if the file cannot be read and `ConfigParse` if
    /// it is not valid JSON for this shape.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look for `asyncgen.json` in `dir`.
    #[must_use]
    pub fn find_in(dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }
}

/// File name a host looks for when no config path is given.
pub const CONFIG_FILE_NAME: &str = "asyncgen.json";
