use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geolocation permission as reported by the host platform.
///
/// `Unknown` is the state before any query has completed. Only the
/// permission gate transitions this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    Unknown,
    Prompt,
    Granted,
    Denied,
}

impl Default for PermissionState {
    fn default() -> Self {
        Self::Unknown
    }
}

/// A single geolocation fix. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// When the fix was produced, not when it was later bound to a record.
    pub acquired_at: DateTime<Utc>,
}

/// Location bound to session state or to a capture record.
///
/// `Unresolved` explicitly marks "no coordinate is bound", distinct from
/// a valid zero coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RecordLocation {
    Unresolved,
    Fixed(Coordinate),
}

impl RecordLocation {
    pub fn coordinate(&self) -> Option<&Coordinate> {
        match self {
            Self::Fixed(coordinate) => Some(coordinate),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

impl Default for RecordLocation {
    fn default() -> Self {
        Self::Unresolved
    }
}

/// Stable identity of one capture record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to transient binary image data held by the session's
/// image registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub Uuid);

impl ImageHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One captured image bound to the coordinate known at capture time.
/// Immutable after creation; `location` is never retroactively updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureRecord {
    pub id: RecordId,
    pub image: ImageHandle,
    /// The source file's last-modified time, not ingestion wall-clock.
    pub captured_at: DateTime<Utc>,
    pub location: RecordLocation,
}
