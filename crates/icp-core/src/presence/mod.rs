//! Webcam presence monitoring.
//!
//! The video device and the face detector are capabilities injected by the
//! host. This module owns the device-selection protocol and the absence
//! tracking; the application layer runs the 1 Hz poll.

mod device;
mod tracker;

pub use device::{MediaDevice, camera_candidates, looks_external_camera, microphone_candidates};
pub use tracker::{PresenceSignal, PresenceTracker};

use async_trait::async_trait;

use crate::error::{IcpError, Result};

/// An open video stream. Dropping it without `stop` may leak the device.
pub trait VideoStream: Send + Sync {
    fn device_id(&self) -> &str;

    /// Releases the device. Must be idempotent.
    fn stop(&self);
}

/// Camera access.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Generic permission grant, needed before labels are visible.
    async fn request_permission(&self) -> Result<()>;

    async fn enumerate(&self) -> Result<Vec<MediaDevice>>;

    async fn open(&self, device_id: &str) -> Result<Box<dyn VideoStream>>;
}

/// Face detection against an open stream.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect_face(&self, stream: &dyn VideoStream) -> Result<bool>;
}

/// Opens the best available camera.
///
/// Tries the preferred device first (see [`camera_candidates`]), then every
/// other device in enumeration order. Returns [`IcpError::Device`] when none
/// opens.
pub async fn acquire_camera(
    source: &dyn VideoSource,
    persisted_id: Option<&str>,
) -> Result<Box<dyn VideoStream>> {
    if let Err(e) = source.request_permission().await {
        tracing::warn!("[Presence] Camera permission request failed: {}", e);
    }

    let devices = source.enumerate().await?;
    for device in camera_candidates(&devices, persisted_id) {
        match source.open(&device.id).await {
            Ok(stream) => {
                tracing::info!("[Presence] Opened camera '{}' ({})", device.label, device.id);
                return Ok(stream);
            }
            Err(e) => {
                tracing::warn!("[Presence] Failed to open camera '{}': {}", device.label, e);
            }
        }
    }

    Err(IcpError::device("No camera could be opened"))
}
