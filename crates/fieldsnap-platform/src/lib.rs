// Host platform surfaces (positioning sensor, permission introspection,
// image capture) wrapped behind traits and bounded async operations.

pub mod permission;
pub mod picker;
pub mod position;
pub mod provider;

pub use permission::{query_permission, PermissionGate, PermissionProbe, ProbeError};
pub use fieldsnap_shared::error::PickError;
pub use picker::{CameraFacing, ImagePicker, PickRequest, PickedImage};
pub use position::{PositionRequest, PositionSource, RawFix};
pub use provider::CoordinateProvider;
