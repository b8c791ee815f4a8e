//! Live audio capture.
//!
//! Owns the capture session state machine, the sliding sample window it
//! feeds, device acquisition, and the terminal waveform display.

pub mod device;
pub mod session;
pub mod ui;
pub mod window;

pub use session::{CaptureSession, CaptureState, WaveformFrame};
pub use window::SampleWindow;

use thiserror::Error;

/// Errors raised by the capture layer.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The input device could not be acquired or configured.
    #[error("audio input device unavailable: {0}")]
    DeviceUnavailable(String),
    /// `start()` was called while a capture was already in progress.
    #[error("capture already in progress")]
    AlreadyRecording,
    /// The input stream could not be built or started.
    #[error("failed to start audio stream: {0}")]
    Stream(String),
}
