//! Capture session lifecycle.
//!
//! A [`CaptureSession`] moves between `Idle` and `Recording`. While
//! recording, the cpal input callback downmixes incoming chunks to mono,
//! appends them to the sliding [`SampleWindow`], and publishes a snapshot
//! frame for the waveform display. Stopping encodes the window as WAV bytes
//! and returns them exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, StreamTrait};

use super::{device, CaptureError, SampleWindow};
use crate::wav::{self, EncodeError};

/// Frames buffered between the audio callback and the renderer. The display
/// only ever wants the latest window, so a shallow queue is enough.
const FRAME_QUEUE_DEPTH: usize = 4;

/// Capture session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No capture in progress; also the state between sessions.
    Idle,
    /// Device acquired, samples flowing into the window.
    Recording,
}

/// One snapshot of the sliding window, published per device delivery.
#[derive(Debug, Clone)]
pub struct WaveformFrame {
    /// Window contents in temporal order (most recent sample last).
    pub samples: Vec<f32>,
    /// Fixed window capacity, for the renderer's x-axis.
    pub capacity: usize,
}

/// Records the most recent window of mono audio from an input device.
///
/// The session exclusively owns its [`SampleWindow`]; the audio callback is
/// the only writer, and everything else sees copies via snapshots.
pub struct CaptureSession {
    state: CaptureState,
    window: Arc<Mutex<SampleWindow>>,
    recording: Arc<AtomicBool>,
    /// Active input stream (kept alive during recording)
    stream: Option<cpal::Stream>,
    sample_rate: u32,
    window_secs: f32,
    device_spec: String,
    frames: SyncSender<WaveformFrame>,
}

impl CaptureSession {
    /// Creates an idle session and the receiving end of its waveform feed.
    ///
    /// `requested_sample_rate` is a hint; the device's native rate wins once
    /// `start()` runs, and the window capacity is derived from the actual
    /// rate so it always covers `window_secs` of audio.
    pub fn new(
        device_spec: String,
        requested_sample_rate: u32,
        window_secs: f32,
    ) -> (Self, Receiver<WaveformFrame>) {
        let (frames, frame_rx) = sync_channel(FRAME_QUEUE_DEPTH);

        let session = Self {
            state: CaptureState::Idle,
            window: Arc::new(Mutex::new(SampleWindow::new(
                window_secs,
                requested_sample_rate,
            ))),
            recording: Arc::new(AtomicBool::new(false)),
            stream: None,
            sample_rate: requested_sample_rate,
            window_secs,
            device_spec,
            frames,
        };

        (session, frame_rx)
    }

    /// Starts capturing: resets the window, acquires the device, and begins
    /// the append cycle.
    ///
    /// # Errors
    /// - [`CaptureError::AlreadyRecording`] if a capture is in progress; the
    ///   running capture and its window are left untouched
    /// - [`CaptureError::DeviceUnavailable`] if the device cannot be acquired
    /// - [`CaptureError::Stream`] if the input stream cannot be started
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.state == CaptureState::Recording {
            return Err(CaptureError::AlreadyRecording);
        }

        let device = device::acquire_input_device(&self.device_spec)?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let device_config = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceUnavailable(format!("no input config: {e}")))?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Capturing at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            device_sample_rate,
            num_channels
        );

        self.sample_rate = device_sample_rate;

        // Fresh window, resized if the actual device rate changed its capacity
        {
            let mut window = self.window.lock().unwrap();
            window.reset();
            let capacity = (self.window_secs * device_sample_rate as f32) as usize;
            if window.capacity() != capacity {
                *window = SampleWindow::with_capacity(capacity);
            }
        }

        let window_arc = Arc::clone(&self.window);
        let recording_arc = Arc::clone(&self.recording);
        let frame_tx = self.frames.clone();

        let stream = device
            .build_input_stream(
                &device_config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Deliveries after stop() are dropped, never queued
                    if recording_arc.load(Ordering::Relaxed) {
                        Self::handle_chunk(data, num_channels, &window_arc, &frame_tx);
                    }
                },
                |err| {
                    tracing::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        self.recording.store(true, Ordering::Relaxed);
        self.stream = Some(stream);
        self.state = CaptureState::Recording;

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Stops capturing and returns the window encoded as WAV bytes.
    ///
    /// Idempotent: a second `stop()` while already idle returns `Ok(None)`,
    /// so each recording is exported exactly once.
    ///
    /// # Errors
    /// - [`EncodeError::InvalidSampleRate`] if the device reported a zero
    ///   sample rate
    pub fn stop(&mut self) -> Result<Option<Vec<u8>>, EncodeError> {
        if self.state == CaptureState::Idle {
            tracing::debug!("stop() while idle: nothing to do");
            return Ok(None);
        }

        self.recording.store(false, Ordering::Relaxed);
        self.stream = None;
        self.state = CaptureState::Idle;

        let window = self.window.lock().unwrap();
        if window.is_empty() {
            tracing::warn!("Capture stopped with no samples in the window");
        }
        let snapshot = window.snapshot();
        drop(window);

        let duration_secs = snapshot.len() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Capture stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            snapshot.len(),
            self.sample_rate
        );

        let bytes = wav::encode(&snapshot, self.sample_rate)?;
        Ok(Some(bytes))
    }

    /// Handles one chunk delivered by the audio callback.
    ///
    /// Downmixes to mono by averaging channels, appends to the window, then
    /// publishes a snapshot frame. The publish uses `try_send` so a slow
    /// renderer drops frames instead of stalling the audio thread.
    fn handle_chunk(
        data: &[f32],
        num_channels: usize,
        window_arc: &Arc<Mutex<SampleWindow>>,
        frame_tx: &SyncSender<WaveformFrame>,
    ) {
        let mut window = window_arc.lock().unwrap();

        match num_channels {
            0 => return,
            1 => {
                window.append(data);
            }
            _ => {
                let mono: Vec<f32> = data
                    .chunks_exact(num_channels)
                    .map(|frame| frame.iter().sum::<f32>() / num_channels as f32)
                    .collect();
                window.append(&mono);
            }
        }

        let frame = WaveformFrame {
            samples: window.snapshot(),
            capacity: window.capacity(),
        };
        drop(window);

        // Full queue means the renderer is behind; dropping is fine
        let _ = frame_tx.try_send(frame);
    }

    /// Current session state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// The actual capture sample rate (device rate once recording started).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples currently in the window.
    pub fn window_len(&self) -> usize {
        self.window.lock().unwrap().len()
    }

    /// Fixed capacity of the window in samples.
    pub fn window_capacity(&self) -> usize {
        self.window.lock().unwrap().capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> (CaptureSession, Receiver<WaveformFrame>) {
        CaptureSession::new("default".to_string(), 8000, 1.0)
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let (mut session, _rx) = test_session();

        assert_eq!(session.state(), CaptureState::Idle);
        assert_eq!(session.stop().unwrap(), None);
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[test]
    fn test_double_stop_exports_once() {
        let (mut session, _rx) = test_session();

        // Put the session into Recording without a device; stop() only needs
        // the window and the state flag.
        session.state = CaptureState::Recording;
        session.window.lock().unwrap().append(&[0.5, -0.5]);

        let bytes = session.stop().unwrap().expect("first stop exports");
        assert_eq!(bytes.len(), 44 + 4);

        assert_eq!(session.stop().unwrap(), None);
    }

    #[test]
    fn test_start_while_recording_is_rejected() {
        let (mut session, _rx) = test_session();
        session.state = CaptureState::Recording;
        session.window.lock().unwrap().append(&[1.0, 2.0, 3.0]);

        let err = session.start().unwrap_err();
        assert!(matches!(err, CaptureError::AlreadyRecording));

        // The in-progress window must be untouched by the rejected start
        assert_eq!(
            session.window.lock().unwrap().snapshot(),
            vec![1.0, 2.0, 3.0]
        );
        assert_eq!(session.state(), CaptureState::Recording);
    }

    #[test]
    fn test_handle_chunk_mono_passthrough() {
        let window = Arc::new(Mutex::new(SampleWindow::with_capacity(8)));
        let (tx, rx) = sync_channel(4);

        CaptureSession::handle_chunk(&[0.1, 0.2, 0.3], 1, &window, &tx);

        assert_eq!(window.lock().unwrap().snapshot(), vec![0.1, 0.2, 0.3]);

        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.samples, vec![0.1, 0.2, 0.3]);
        assert_eq!(frame.capacity, 8);
    }

    #[test]
    fn test_handle_chunk_stereo_downmix_averages() {
        let window = Arc::new(Mutex::new(SampleWindow::with_capacity(8)));
        let (tx, _rx) = sync_channel(4);

        CaptureSession::handle_chunk(&[1.0, 0.0, 0.5, 0.5], 2, &window, &tx);

        assert_eq!(window.lock().unwrap().snapshot(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_handle_chunk_never_blocks_on_full_queue() {
        let window = Arc::new(Mutex::new(SampleWindow::with_capacity(4)));
        let (tx, rx) = sync_channel(1);

        // Second delivery finds the queue full; its frame is dropped
        CaptureSession::handle_chunk(&[0.1], 1, &window, &tx);
        CaptureSession::handle_chunk(&[0.2], 1, &window, &tx);

        assert_eq!(window.lock().unwrap().len(), 2);
        assert_eq!(rx.try_recv().unwrap().samples, vec![0.1]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_handle_chunk_enforces_window_capacity() {
        let window = Arc::new(Mutex::new(SampleWindow::with_capacity(3)));
        let (tx, _rx) = sync_channel(4);

        for i in 0..5 {
            CaptureSession::handle_chunk(&[i as f32, i as f32], 1, &window, &tx);
            assert!(window.lock().unwrap().len() <= 3);
        }

        assert_eq!(window.lock().unwrap().snapshot(), vec![3.0, 4.0, 4.0]);
    }
}
