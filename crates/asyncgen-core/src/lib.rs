#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Rewrites async functions, async arrows, async methods and async
//! generators into generator functions driven by small runtime helpers.
//!
//! The output is the original text with surgical edits applied, so
//! everything the rewrite does not touch keeps its formatting.

pub mod config;
pub mod edit;
pub mod error;
pub mod host;
pub mod syntax;
pub mod transform;

pub use config::{HostConfig, TransformOptions, CONFIG_FILE_NAME};
pub use error::{Error, TransformError};
pub use host::Host;
pub use syntax::{ParseOptions, ParsedSource, SourceParser, SwcParser};
pub use transform::{helpers, transform, transform_with, EditedText, HelperUsage};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
