//! Field capture client: the capture-session coordinator, its record
//! and image stores, the gallery projection and the authentication
//! boundary. The presentation shell embeds this crate and renders from
//! the session's state and event stream.

pub mod auth;
pub mod capture;
pub mod config;
pub mod events;
pub mod gallery;
pub mod images;
pub mod records;
pub mod state;
pub mod token;

use tracing_subscriber::{fmt, EnvFilter};

pub use auth::AuthClient;
pub use capture::{Session, SessionCommand};
pub use config::ClientConfig;
pub use events::SessionEvent;
pub use state::{CaptureState, SessionSnapshot, SessionState};
pub use token::TokenStore;

/// Initialise structured logging for the embedding shell.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("fieldsnap_client=debug,fieldsnap_platform=debug,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
