//! Sliding window of recent audio samples.
//!
//! Backs the waveform display and the WAV export: the window keeps only the
//! most recent `capacity` samples, dropping the oldest as new chunks arrive.

/// A fixed-capacity sliding window of mono f32 samples.
///
/// Stored as a ring buffer so appends from the audio callback stay O(chunk)
/// with no allocation after construction. Insertion order is temporal order;
/// when the window is full the oldest samples are overwritten.
#[derive(Debug)]
pub struct SampleWindow {
    buffer: Vec<f32>,
    capacity: usize,
    write_pos: usize,
    filled: usize,
}

impl SampleWindow {
    /// Creates a window holding `duration_secs` of audio at `sample_rate`.
    pub fn new(duration_secs: f32, sample_rate: u32) -> Self {
        let capacity = (duration_secs * sample_rate as f32) as usize;
        Self::with_capacity(capacity)
    }

    /// Creates a window with an explicit sample capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            capacity,
            write_pos: 0,
            filled: 0,
        }
    }

    /// Appends a chunk of samples, evicting the oldest ones if the window
    /// would exceed its capacity.
    ///
    /// An empty chunk is a no-op. A chunk larger than the capacity keeps only
    /// its most recent `capacity` samples, same as if it had arrived split
    /// across several appends.
    pub fn append(&mut self, chunk: &[f32]) {
        if self.capacity == 0 || chunk.is_empty() {
            return;
        }

        // Only the tail of an oversized chunk can survive; skip the rest.
        let chunk = if chunk.len() > self.capacity {
            &chunk[chunk.len() - self.capacity..]
        } else {
            chunk
        };

        for &sample in chunk {
            self.buffer[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.capacity;
            if self.filled < self.capacity {
                self.filled += 1;
            }
        }
    }

    /// Returns a copy of the window contents in temporal order.
    ///
    /// The copy is stable: further appends never mutate it, so it can be
    /// handed to the renderer or the encoder while capture continues.
    pub fn snapshot(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.filled);

        if self.filled < self.capacity {
            // Not wrapped yet: data is contiguous from the start
            out.extend_from_slice(&self.buffer[..self.filled]);
        } else {
            // Wrapped: oldest sample sits at write_pos
            out.extend_from_slice(&self.buffer[self.write_pos..]);
            out.extend_from_slice(&self.buffer[..self.write_pos]);
        }

        out
    }

    /// Clears the window. Used when a new capture session starts.
    pub fn reset(&mut self) {
        self.write_pos = 0;
        self.filled = 0;
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Maximum number of samples the window can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_from_duration() {
        let win = SampleWindow::new(2.0, 44100);
        assert_eq!(win.capacity(), 88200);
        assert!(win.is_empty());
    }

    #[test]
    fn test_append_under_capacity_keeps_order() {
        let mut win = SampleWindow::with_capacity(10);
        win.append(&[1.0, 2.0]);
        win.append(&[3.0, 4.0, 5.0]);

        assert_eq!(win.len(), 5);
        assert_eq!(win.snapshot(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_append_empty_chunk_is_noop() {
        let mut win = SampleWindow::with_capacity(4);
        win.append(&[1.0, 2.0]);
        win.append(&[]);

        assert_eq!(win.len(), 2);
        assert_eq!(win.snapshot(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_eviction_drops_oldest_first() {
        let mut win = SampleWindow::with_capacity(4);
        win.append(&[1.0, 2.0, 3.0]);
        win.append(&[4.0, 5.0, 6.0]);

        assert_eq!(win.len(), 4);
        assert_eq!(win.snapshot(), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_oversized_chunk_keeps_most_recent_tail() {
        let mut win = SampleWindow::with_capacity(3);
        let chunk: Vec<f32> = (0..10).map(|i| i as f32).collect();
        win.append(&chunk);

        assert_eq!(win.len(), 3);
        assert_eq!(win.snapshot(), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut win = SampleWindow::with_capacity(16);
        for i in 0..100 {
            win.append(&vec![i as f32; 7]);
            assert!(win.len() <= win.capacity());
        }
        assert_eq!(win.len(), 16);
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut win = SampleWindow::with_capacity(4);
        win.append(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let first = win.snapshot();
        let second = win.snapshot();
        assert_eq!(first, second);
        assert_eq!(win.len(), 4);
    }

    #[test]
    fn test_snapshot_stable_across_later_appends() {
        let mut win = SampleWindow::with_capacity(4);
        win.append(&[1.0, 2.0, 3.0, 4.0]);

        let snap = win.snapshot();
        win.append(&[9.0, 9.0]);

        assert_eq!(snap, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(win.snapshot(), vec![3.0, 4.0, 9.0, 9.0]);
    }

    #[test]
    fn test_reset_clears_window() {
        let mut win = SampleWindow::with_capacity(4);
        win.append(&[1.0, 2.0, 3.0]);
        win.reset();

        assert!(win.is_empty());
        assert_eq!(win.snapshot(), Vec::<f32>::new());

        win.append(&[7.0]);
        assert_eq!(win.snapshot(), vec![7.0]);
    }

    #[test]
    fn test_zero_capacity_window() {
        let mut win = SampleWindow::with_capacity(0);
        win.append(&[1.0, 2.0]);
        assert!(win.is_empty());
        assert_eq!(win.snapshot(), Vec::<f32>::new());
    }
}
