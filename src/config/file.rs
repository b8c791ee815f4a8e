//! Configuration file management for wavetap.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `wavetap list-devices`
    /// - device name from `wavetap list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested sample rate in Hz (the device's native rate wins)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Length of the sliding window in seconds; also the maximum export length
    #[serde(default = "default_window_secs")]
    pub window_secs: f32,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_window_secs() -> f32 {
    2.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            window_secs: default_window_secs(),
        }
    }
}

/// Export output configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory where exported WAV files are written
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

fn default_output_dir() -> PathBuf {
    dirs::audio_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wavetap")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WavetapConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl WavetapConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing config file yields the defaults; a malformed one is an error.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: WavetapConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating the directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let home = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    let config_path = home.join(".config").join("wavetap").join("wavetap.toml");

    std::fs::create_dir_all(config_path.parent().unwrap())?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WavetapConfig::default();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.window_secs, 2.0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: WavetapConfig = toml::from_str(
            r#"
            [audio]
            device = "1"
            "#,
        )
        .unwrap();

        assert_eq!(config.audio.device, "1");
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.window_secs, 2.0);
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = WavetapConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: WavetapConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.audio.device, config.audio.device);
        assert_eq!(parsed.audio.sample_rate, config.audio.sample_rate);
        assert_eq!(parsed.output.directory, config.output.directory);
    }
}
