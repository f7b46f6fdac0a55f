//! Audio source abstraction.
//!
//! This module defines the common interface the orchestrator uses to pull
//! audio frames, whatever is behind it: a USB sound card fed by a VLF
//! loop antenna, a file replay, or the simulator in [`crate::sim`].
//!
//! Delivery is pull-based with a bounded wait: the orchestrator asks for
//! exactly one frame per sampling tick, which guarantees at most one
//! capture-to-score cycle in flight per station.

use std::time::Duration;

use sidwatch_core::types::Frame;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors that can occur during audio capture.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Capture already running")]
    AlreadyCapturing,

    #[error("Capture not running")]
    NotCapturing,

    #[error("Timed out waiting for frame after {0:?}")]
    Timeout(Duration),

    #[error("Hardware error: {0}")]
    Hardware(String),
}

/// Common interface for audio frame sources.
pub trait AudioSource: Send {
    /// Source name/description.
    fn name(&self) -> &str;

    /// Open the device and begin capturing.
    ///
    /// Fails with [`CaptureError::DeviceUnavailable`] if the device cannot
    /// be opened and [`CaptureError::AlreadyCapturing`] if already started.
    fn start_capture(&mut self) -> CaptureResult<()>;

    /// Stop capturing and release the device.
    fn stop_capture(&mut self) -> CaptureResult<()>;

    /// Whether capture is currently active.
    fn is_capturing(&self) -> bool;

    /// Wait up to `timeout` for the next frame.
    ///
    /// Returns exactly one frame per call; the orchestrator calls this
    /// once per tick.
    fn next_frame(&mut self, timeout: Duration) -> CaptureResult<Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_for_operators() {
        let err = CaptureError::DeviceUnavailable("hw:1,0".to_string());
        assert!(err.to_string().contains("hw:1,0"));
        let err = CaptureError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("5s"));
    }
}
