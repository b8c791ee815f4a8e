//! Configuration management for wavetap.
//!
//! Handles loading and saving application configuration from TOML files in
//! the user's config directory.

pub mod file;

pub use file::{AudioConfig, OutputConfig, WavetapConfig};
