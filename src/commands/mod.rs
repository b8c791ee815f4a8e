//! Application command handlers for wavetap.
//!
//! # Commands
//! - `record`: Live monitoring with waveform display and WAV export (default)
//! - `list_devices`: List available audio input devices
//! - `config`: Open the configuration file in the user's preferred editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod record;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
