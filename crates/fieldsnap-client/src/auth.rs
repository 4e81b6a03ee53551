//! Authentication collaborator: a single-attempt login call against the
//! remote credential endpoint. Its failures are handled here and never
//! reach the capture core.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use fieldsnap_shared::constants::{AUTH_LOGIN_PATH, MSG_AUTH_REJECTED};
use fieldsnap_shared::error::{AuthError, StoreError};

use crate::capture::Session;
use crate::token::TokenStore;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct RejectionBody {
    message: Option<String>,
}

/// Client for the remote authentication endpoint.
pub struct AuthClient {
    http: reqwest::Client,
    server_url: String,
}

impl AuthClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            server_url: server_url.into(),
        }
    }

    /// One login attempt; no retry on failure.
    ///
    /// A non-2xx response yields the server's `message` verbatim,
    /// falling back to the stock rejection text when the body carries
    /// none.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let url = format!("{}{}", self.server_url.trim_end_matches('/'), AUTH_LOGIN_PATH);

        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if response.status().is_success() {
            let body: LoginResponse = response
                .json()
                .await
                .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
            info!(username, "Login accepted");
            Ok(body.access_token)
        } else {
            let status = response.status();
            let message = response
                .json::<RejectionBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| MSG_AUTH_REJECTED.to_string());
            warn!(username, status = %status, "Login rejected");
            Err(AuthError::Rejected(message))
        }
    }

    /// Login and persist the token under the fixed key.
    ///
    /// A persistence failure does not undo the login: the session can
    /// proceed, it just will not be restored after a reload.
    pub async fn login_and_store(
        &self,
        tokens: &TokenStore,
        username: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let token = self.login(username, password).await?;
        if let Err(e) = tokens.save(&token) {
            warn!(error = %e, "Session token not persisted");
        }
        Ok(token)
    }
}

/// Operator logout: clear the persisted token and tear the session
/// down. The shell then routes back to the login screen.
pub async fn logout(session: Session, tokens: &TokenStore) -> Result<(), StoreError> {
    tokens.clear()?;
    session.shutdown().await;
    info!("Operator logged out");
    Ok(())
}
