//! Bounded, single-shot access to the positioning sensor.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use fieldsnap_shared::constants::{DEFAULT_HIGH_ACCURACY, DEFAULT_LOCATION_TIMEOUT_MS};
use fieldsnap_shared::error::GeoError;
use fieldsnap_shared::types::Coordinate;

use crate::position::{PositionRequest, PositionSource};

/// Wraps a [`PositionSource`] behind a bounded, cancellable request.
///
/// Each [`acquire`](CoordinateProvider::acquire) produces exactly one
/// outcome. Dropping the returned future abandons the attempt; the
/// provider keeps no session references, so a late fix can no longer
/// touch anything. Readings are never cached across calls.
pub struct CoordinateProvider<S> {
    source: S,
    timeout: Duration,
    high_accuracy: bool,
}

impl<S: PositionSource> CoordinateProvider<S> {
    pub fn new(source: S, timeout: Duration, high_accuracy: bool) -> Self {
        Self {
            source,
            timeout,
            high_accuracy,
        }
    }

    /// Provider with the stock field-operator settings: 5 s timeout and
    /// a high-accuracy fix.
    pub fn with_defaults(source: S) -> Self {
        Self::new(
            source,
            Duration::from_millis(DEFAULT_LOCATION_TIMEOUT_MS),
            DEFAULT_HIGH_ACCURACY,
        )
    }

    /// Request one fresh fix from the sensor.
    ///
    /// Fails with [`GeoError::Timeout`] when no fix arrives within the
    /// configured window; sensor faults pass through unchanged.
    pub async fn acquire(&self) -> Result<Coordinate, GeoError> {
        let request = PositionRequest {
            high_accuracy: self.high_accuracy,
        };

        let fix = tokio::time::timeout(self.timeout, self.source.current_position(request))
            .await
            .map_err(|_| GeoError::Timeout)??;

        let coordinate = Coordinate {
            latitude: fix.latitude,
            longitude: fix.longitude,
            acquired_at: Utc::now(),
        };

        debug!(
            lat = coordinate.latitude,
            lng = coordinate.longitude,
            "Acquired position fix"
        );

        Ok(coordinate)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
