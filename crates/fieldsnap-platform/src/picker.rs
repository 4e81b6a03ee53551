use std::future::Future;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldsnap_shared::constants::CAPTURE_MIME_FILTER;
use fieldsnap_shared::error::PickError;

/// Which device camera the selection surface should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraFacing {
    /// Rear camera, photographing the operator's surroundings.
    Environment,
    /// Front camera.
    User,
}

/// Request handed to the platform image-selection surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickRequest {
    /// MIME filter, e.g. `image/*`.
    pub accept: String,
    pub camera: CameraFacing,
    pub multiple: bool,
}

impl PickRequest {
    /// The capture-screen defaults: images only, rear camera,
    /// multi-selection enabled.
    pub fn capture_defaults() -> Self {
        Self {
            accept: CAPTURE_MIME_FILTER.to_string(),
            camera: CameraFacing::Environment,
            multiple: true,
        }
    }
}

/// One item returned by the selection surface.
#[derive(Debug, Clone)]
pub struct PickedImage {
    pub data: Bytes,
    /// The source file's last-modified time as reported by the platform.
    pub last_modified: DateTime<Utc>,
}

/// The platform image-capture surface.
///
/// The returned future suspends for as long as the operator interacts
/// with the surface; it is not subject to the location timeout. An empty
/// result means the selection was cancelled, which is not an error.
pub trait ImagePicker: Send + Sync + 'static {
    fn pick(
        &self,
        request: PickRequest,
    ) -> impl Future<Output = Result<Vec<PickedImage>, PickError>> + Send;
}
