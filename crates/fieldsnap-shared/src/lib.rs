// Data model, error taxonomy and constants shared by every crate.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{AuthError, CaptureError, GeoError, PickError, StoreError};
pub use types::{
    CaptureRecord, Coordinate, ImageHandle, PermissionState, RecordId, RecordLocation,
};
