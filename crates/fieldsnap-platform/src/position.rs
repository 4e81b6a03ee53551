use std::future::Future;

use serde::{Deserialize, Serialize};

use fieldsnap_shared::error::GeoError;

/// Options passed through to the platform positioning sensor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionRequest {
    pub high_accuracy: bool,
}

/// A raw sensor reading, before it is stamped into a
/// [`Coordinate`](fieldsnap_shared::types::Coordinate).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// The device positioning sensor.
///
/// Read-only access: every call must reflect the sensor's current
/// reading, never a memoized prior value. Implementations hold no
/// session references, so an abandoned call mutates nothing.
pub trait PositionSource: Send + Sync + 'static {
    fn current_position(
        &self,
        request: PositionRequest,
    ) -> impl Future<Output = Result<RawFix, GeoError>> + Send;
}
