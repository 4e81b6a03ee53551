/// Application name
pub const APP_NAME: &str = "Fieldsnap";

/// Default geolocation acquisition timeout in milliseconds
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 5_000;

/// Whether geolocation requests ask for a high-accuracy fix by default
pub const DEFAULT_HIGH_ACCURACY: bool = true;

/// Login endpoint path on the authentication server
pub const AUTH_LOGIN_PATH: &str = "/auth/login";

/// Fixed key the session token is persisted under
pub const SESSION_TOKEN_KEY: &str = "token";

/// MIME filter handed to the platform image picker
pub const CAPTURE_MIME_FILTER: &str = "image/*";

// User-facing messages, shown verbatim by the operator UI. At most one
// is visible at a time.

/// Geolocation permission was denied by the operator or the device policy
pub const MSG_PERMISSION_DENIED: &str =
    "Permisos de ubicación denegados. Actívalos en la configuración de tu dispositivo.";

/// The sensor failed or timed out; shared by every location-class failure
pub const MSG_LOCATION_FAILED: &str =
    "No se pudo obtener la ubicación. Activa los permisos de ubicación.";

/// A capture gesture was requested while another one is in flight
pub const MSG_CAPTURE_BUSY: &str = "Ya hay una captura en curso.";

/// The platform image-selection surface could not be opened
pub const MSG_PICKER_FAILED: &str = "No se pudo abrir la cámara. Inténtalo de nuevo.";

/// Fallback when the authentication server rejects without a message
pub const MSG_AUTH_REJECTED: &str = "Error de autenticación";

/// The authentication server could not be reached
pub const MSG_AUTH_NETWORK: &str = "Error de conexión con el servidor";
