use thiserror::Error;

use crate::constants::{
    MSG_AUTH_NETWORK, MSG_AUTH_REJECTED, MSG_CAPTURE_BUSY, MSG_LOCATION_FAILED,
    MSG_PERMISSION_DENIED, MSG_PICKER_FAILED,
};

/// Failures while acquiring a geolocation fix.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("No position fix within the timeout")]
    Timeout,
}

/// Failures from the platform image-selection surface.
///
/// A cancelled selection is not an error; it surfaces as an empty
/// selection instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PickError {
    #[error("Image picker unavailable: {0}")]
    Unavailable(String),
}

/// Failures surfaced at the capture-controller boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("A capture gesture is already in flight")]
    Busy,

    #[error("Location error: {0}")]
    Location(#[from] GeoError),

    #[error("Picker error: {0}")]
    Picker(#[from] PickError),
}

impl CaptureError {
    /// The single user-visible message for this failure.
    ///
    /// Every location-class failure shares one message category; the
    /// operator cannot act differently on timeout vs. unavailability.
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::Busy => MSG_CAPTURE_BUSY,
            CaptureError::Location(GeoError::PermissionDenied) => MSG_PERMISSION_DENIED,
            CaptureError::Location(_) => MSG_LOCATION_FAILED,
            CaptureError::Picker(_) => MSG_PICKER_FAILED,
        }
    }
}

/// Authentication collaborator failures. Handled at its own boundary,
/// never visible to the capture core.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The server rejected the credentials; carries the server's
    /// `message` field verbatim.
    #[error("Authentication rejected: {0}")]
    Rejected(String),

    #[error("Network unreachable: {0}")]
    Network(String),

    #[error("Invalid server response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Rejected(message) => message.clone(),
            AuthError::Network(_) => MSG_AUTH_NETWORK.to_string(),
            AuthError::InvalidResponse(_) => MSG_AUTH_REJECTED.to_string(),
        }
    }
}

/// Session-token persistence failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No platform data directory available")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt token file: {0}")]
    Serde(#[from] serde_json::Error),
}
