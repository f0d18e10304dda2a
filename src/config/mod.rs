// src/config/mod.rs

//! Client configuration for batchroute.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, with environment overrides (`loader.rs`).
//! - Validate server, polling and map settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, MapSection, PollingSection, RawConfigFile, ServerSection};
