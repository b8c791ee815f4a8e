//! Export sink for encoded recordings.
//!
//! The capture session hands over finished WAV bytes; this module delivers
//! them to the user as a timestamped file in the output directory.

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::wav::MIME_TYPE;

/// Writes WAV bytes to a timestamped file under `output_dir`.
///
/// Returns the path of the written file.
///
/// # Errors
/// - If the output directory cannot be created
/// - If the file cannot be written
pub fn write_wav_file(bytes: &[u8], output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .map_err(|e| anyhow!("Failed to create output directory {}: {e}", output_dir.display()))?;

    let filename = format!(
        "wavetap-{}.wav",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );
    let path = output_dir.join(filename);

    fs::write(&path, bytes)
        .map_err(|e| anyhow!("Failed to write {}: {e}", path.display()))?;

    tracing::info!(
        "Recording saved: {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        MIME_TYPE
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_wav_file_creates_file_with_exact_bytes() {
        let dir = std::env::temp_dir().join(format!("wavetap-test-{}", std::process::id()));
        let bytes = crate::wav::encode(&[0.1, -0.1], 8000).unwrap();

        let path = write_wav_file(&bytes, &dir).unwrap();

        assert!(path.extension().is_some_and(|ext| ext == "wav"));
        assert_eq!(fs::read(&path).unwrap(), bytes);

        fs::remove_dir_all(&dir).unwrap();
    }
}
