//! Auth collaborator contract.
//!
//! The session layer never refreshes credentials itself. It asks a provider
//! to inject whatever headers the backend needs right before the websocket
//! handshake; a failure there rejects the connect call.

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{LiveError, Result};

/// Injects authentication headers into an outgoing handshake request.
///
/// Implementations may perform a network round-trip (e.g. exchanging
/// application-default credentials for an access token).
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Add auth headers in place, or fail.
    async fn inject_auth_headers(&self, headers: &mut HeaderMap) -> Result<()>;
}

/// An [`AuthProvider`] backed by a fixed bearer token.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    /// Wrap an already-resolved access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: SecretString::from(token.into()) }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn inject_auth_headers(&self, headers: &mut HeaderMap) -> Result<()> {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret()))
            .map_err(|e| LiveError::auth(format!("invalid bearer token header: {e}")))?;
        headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}
