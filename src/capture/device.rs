//! Audio input device acquisition.
//!
//! Resolves the configured device spec ("default", a device name, or a
//! numeric index) to a cpal input device. All acquisition failures collapse
//! into [`CaptureError::DeviceUnavailable`] so the session surfaces a single
//! condition to its caller.

use cpal::traits::{DeviceTrait, HostTrait};

use super::CaptureError;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Acquires the input device matching `device_spec`.
///
/// # Errors
/// - [`CaptureError::DeviceUnavailable`] if no matching device exists or
///   device enumeration fails
pub fn acquire_input_device(device_spec: &str) -> Result<cpal::Device, CaptureError> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();

        if device_spec == "default" {
            host.default_input_device()
                .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".into()))
        } else {
            find_device_by_spec(&host, device_spec)
        }
    })
}

/// Finds an input device by name or numeric index.
fn find_device_by_spec(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device, CaptureError> {
    let devices: Vec<cpal::Device> = host
        .input_devices()
        .map_err(|e| CaptureError::DeviceUnavailable(format!("failed to enumerate devices: {e}")))?
        .collect();

    // Numeric specs index into the enumeration order shown by `list-devices`
    if let Ok(index) = device_spec.parse::<usize>() {
        return if index < devices.len() {
            Ok(devices.into_iter().nth(index).unwrap())
        } else {
            Err(CaptureError::DeviceUnavailable(format!(
                "device index {} is out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            )))
        };
    }

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(CaptureError::DeviceUnavailable(format!(
        "input device '{device_spec}' not found, see 'wavetap list-devices'"
    )))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T, CaptureError>
where
    F: FnOnce() -> Result<T, CaptureError>,
{
    let dev_null = match OpenOptions::new().write(true).open("/dev/null") {
        Ok(file) => file,
        // If stderr juggling fails, just run without suppression
        Err(_) => return f(),
    };

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return f();
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return f();
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T, CaptureError>
where
    F: FnOnce() -> Result<T, CaptureError>,
{
    f()
}
