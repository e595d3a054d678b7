//! Property source implementations.

mod file;
pub mod properties;
mod property_source;

pub use file::{DEFAULT_FILE_NAME, FileSource};
pub use property_source::{PropertySource, Timestamp};
