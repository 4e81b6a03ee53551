//! Session events pushed to the presentation layer.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use fieldsnap_shared::types::{Coordinate, PermissionState};

/// Notifications from the session task toward the embedding shell.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    PermissionChanged { state: PermissionState },
    LocationUpdated { coordinate: Coordinate },
    RecordsAppended { count: usize },
    SelectionCancelled,
    CaptureFailed { message: String },
    SessionClosed,
}

/// Forward an event without ever blocking the session task. A full or
/// closed channel drops the event; the state itself stays readable
/// through the session handle.
pub fn emit(tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    if let Err(e) = tx.try_send(event) {
        debug!(error = %e, "Dropped session event");
    }
}
