//! Core shared library for the cloudparity assessment engine.
//!
//! This crate exposes the primitives every other crate depends on: the
//! canonical error type, configuration loading from the environment, JSON
//! helpers and logging setup.

pub mod config;
pub mod errors;
pub mod logging;
pub mod serde_utils;

pub use config::{CoreConfig, Environment};
pub use errors::{ConfigError, ParityError, Result as CoreResult};
