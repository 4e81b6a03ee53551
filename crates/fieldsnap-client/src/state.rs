//! Session state shared between the capture task and read-side handles.
//!
//! The [`SessionState`] struct is wrapped in `Arc<Mutex<>>`; every
//! transition happens on the session task, the handles only read.

use serde::Serialize;

use fieldsnap_shared::types::{PermissionState, RecordLocation};

use crate::images::ImageStore;
use crate::records::RecordStore;

/// Capture controller states. The machine cycles for the life of the
/// session; `Errored` is left on the next capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaptureState {
    Idle,
    AwaitingLocation,
    AwaitingSelection,
    Ingesting,
    Errored,
}

/// In-memory state for one authenticated visit to the capture screen.
/// Destroyed with the session; nothing here survives a reload.
pub struct SessionState {
    /// Latest permission state published by the gate.
    pub permission: PermissionState,

    /// Coordinate from the most recent successful acquisition;
    /// `Unresolved` until the first fix.
    pub current_location: RecordLocation,

    pub capture_state: CaptureState,

    /// The single user-visible message. Successful actions clear it.
    pub status_message: Option<String>,

    /// Ordered capture records; append-only.
    pub records: RecordStore,

    /// Binary data behind the records' image handles.
    pub images: ImageStore,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            permission: PermissionState::Unknown,
            current_location: RecordLocation::Unresolved,
            capture_state: CaptureState::Idle,
            status_message: None,
            records: RecordStore::new(),
            images: ImageStore::new(),
        }
    }

    /// Point-in-time copy of the displayable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            permission: self.permission,
            current_location: self.current_location,
            capture_state: self.capture_state,
            status_message: self.status_message.clone(),
            record_count: self.records.len(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Displayable view of the session at one instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub permission: PermissionState,
    pub current_location: RecordLocation,
    pub capture_state: CaptureState,
    pub status_message: Option<String>,
    pub record_count: usize,
}
