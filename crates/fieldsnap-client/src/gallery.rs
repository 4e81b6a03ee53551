//! Read-only projection of the session into the review gallery.
//!
//! Pure presentation input: the gallery holds no state of its own and
//! never writes back into the session.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use fieldsnap_shared::types::{ImageHandle, RecordId, RecordLocation};

use crate::state::SessionState;

/// Map-marker icon shown next to each entry's coordinate.
///
/// Installed at most once by gallery setup, never as a load-time side
/// effect of importing this crate.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerIcon {
    pub icon_url: String,
    pub shadow_url: Option<String>,
    pub size: (u32, u32),
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            icon_url: "markers/pin.png".to_string(),
            shadow_url: Some("markers/pin-shadow.png".to_string()),
            size: (25, 41),
        }
    }
}

static MARKER_ICON: OnceLock<MarkerIcon> = OnceLock::new();

/// Install the marker icon. Returns `false` when setup already ran.
pub fn install_marker_icon(icon: MarkerIcon) -> bool {
    MARKER_ICON.set(icon).is_ok()
}

/// The installed icon, or the stock one when setup never customised it.
pub fn marker_icon() -> MarkerIcon {
    MARKER_ICON.get().cloned().unwrap_or_default()
}

/// One reviewable gallery row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    pub id: RecordId,
    pub image: ImageHandle,
    pub captured_at: DateTime<Utc>,
    pub location: RecordLocation,
    /// Pre-formatted display strings for the review list.
    pub captured_at_label: String,
    pub location_label: String,
}

/// Project the session's records, oldest first.
pub fn entries(state: &SessionState) -> Vec<GalleryEntry> {
    state
        .records
        .all()
        .iter()
        .map(|record| GalleryEntry {
            id: record.id,
            image: record.image,
            captured_at: record.captured_at,
            location: record.location,
            captured_at_label: record.captured_at.format("%d/%m/%Y %H:%M:%S").to_string(),
            location_label: location_label(&record.location),
        })
        .collect()
}

fn location_label(location: &RecordLocation) -> String {
    match location.coordinate() {
        Some(coordinate) => format!("Lat {}, Lng {}", coordinate.latitude, coordinate.longitude),
        None => "Esperando...".to_string(),
    }
}
