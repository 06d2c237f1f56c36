//! CLI command implementations

pub mod cache;
pub mod pipeline;

pub use cache::execute as cache;
pub use pipeline::{build, package, prepare};
