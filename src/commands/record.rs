//! Live monitoring and export.
//!
//! Runs a capture session with the real-time waveform display. Pressing
//! Enter (or sending SIGUSR1 from outside) stops the capture and writes the
//! current window to a WAV file; Escape or 'q' discards it.

use crate::capture::{CaptureError, CaptureSession, WaveformFrame};
use crate::capture::ui::{MonitorCommand, WaveformTui};
use crate::config::WavetapConfig;
use crate::export;
use crate::ui::ErrorScreen;

/// Records from the configured input device and exports the sliding window
/// on demand.
///
/// # Errors
/// - If the configuration is malformed
/// - If the capture device cannot be acquired
/// - If the export file cannot be written
pub fn handle_record() -> anyhow::Result<()> {
    tracing::info!("=== wavetap monitor started ===");

    let config = match WavetapConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/wavetap/wavetap.toml file and try again."
            );
            show_error_screen(&message)?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, window={}s",
        config.audio.device,
        config.audio.sample_rate,
        config.audio.window_secs
    );

    let (mut session, frame_rx) = CaptureSession::new(
        config.audio.device.clone(),
        config.audio.sample_rate,
        config.audio.window_secs,
    );

    if let Err(e) = session.start() {
        tracing::error!("Failed to start capture: {}", e);
        let message = match &e {
            CaptureError::DeviceUnavailable(detail) => format!(
                "Capture Error:\n\n{detail}\n\nCheck your audio configuration, or run 'wavetap list-devices'."
            ),
            _ => format!("Capture Error:\n\n{e}"),
        };
        show_error_screen(&message)?;
        return Err(e.into());
    }

    let mut tui = WaveformTui::new(session.sample_rate())
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    // SIGUSR1 acts as an external "stop and save" trigger
    let external_stop = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, external_stop.clone())
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    tracing::debug!("Entering monitor loop. Press 'Enter' to save or 'Escape'/'q' to quit.");

    let mut latest_frame = WaveformFrame {
        samples: Vec::new(),
        capacity: session.window_capacity(),
    };
    let mut should_export = false;
    let mut frame_count = 0u64;

    loop {
        if external_stop.load(std::sync::atomic::Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: exporting via external trigger");
            should_export = true;
            break;
        }

        match tui.handle_input() {
            Ok(MonitorCommand::Continue) => {
                frame_count += 1;
                if frame_count.is_multiple_of(60) {
                    let window_secs = session.window_len() as f32 / session.sample_rate() as f32;
                    tracing::debug!("Monitoring: {:.1}s in window", window_secs);
                }

                // Keep only the newest pending frame; stale ones are useless
                while let Ok(frame) = frame_rx.try_recv() {
                    latest_frame = frame;
                }
                tui.render(&latest_frame)
                    .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
            }
            Ok(MonitorCommand::StopAndExport) => {
                should_export = true;
                break;
            }
            Ok(MonitorCommand::Cancel) => {
                break;
            }
            Err(e) => {
                tui.cleanup().ok();
                tracing::error!("Input handling error: {}", e);
                return Err(anyhow::anyhow!("Input handling error: {e}"));
            }
        }
    }

    tracing::debug!("Stopping capture from state {:?}", session.state());
    let stop_result = session.stop();
    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    match stop_result {
        Ok(Some(bytes)) if should_export => {
            let path = export::write_wav_file(&bytes, &config.output.directory)?;
            println!("Saved {}", path.display());
        }
        Ok(Some(_)) => {
            tracing::info!("Capture canceled, window discarded");
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Encoding failed: {}", e);
            show_error_screen(&format!("Export Error:\n\n{e}\n\nNo file was written."))?;
            return Err(e.into());
        }
    }

    tracing::info!("=== wavetap monitor exited ===");
    Ok(())
}

/// Shows a blocking full-screen error message.
fn show_error_screen(message: &str) -> anyhow::Result<()> {
    let mut error_screen = ErrorScreen::new()?;
    error_screen.show_error(message)?;
    error_screen.cleanup()?;
    Ok(())
}
