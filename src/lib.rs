//! taco-build - Cordova toolkit cache and build driver
//!
//! Keeps every requested Cordova CLI version installed side by side in a
//! shared cache, loads the one a project asks for and drives the platform
//! build pipeline with it.

pub mod cache;
pub mod cli;
pub mod compat;
pub mod config;
pub mod error;
pub mod orchestration;
pub mod pipeline;

#[cfg(test)]
mod testutil;

pub use error::{TacoError, TacoResult};
