//! Text editing in original coordinates, plus source-map output.

pub mod buffer;
pub mod sourcemap;

pub use buffer::{EditBuffer, Mapping, Serialized};
pub use sourcemap::SourceMapBuilder;
