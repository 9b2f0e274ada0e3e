//! Authenticated session against the HICD web backend.
//!
//! The backend is stateful: a landing page hands out cookies, a form login binds them
//! to a user, and every resource call afterwards rides on that cookie jar.

pub mod client;
pub mod transport;

pub use client::*;
pub use transport::*;

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Error, Debug)]
pub enum SessionError {
    /// Login rejected. Carries the backend body verbatim for diagnostics.
    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Not authenticated: login required before fetching records")]
    NotAuthenticated,

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    /// Backend answered as if no session existed (401/403, login redirect, HTML page).
    #[error("Session expired (status {status}), re-authentication required")]
    SessionExpired { status: u16 },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl SessionError {
    /// HTTP-level failures, including the expired-session subtype.
    pub fn is_http(&self) -> bool {
        matches!(self, SessionError::Http { .. } | SessionError::SessionExpired { .. })
    }
}

/// Authentication state of a session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated => "authenticated",
        }
    }
}

/// Login credential pair. The password is wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Read `HICD_USERNAME` / `HICD_PASSWORD`. Returns `None` if either is missing.
    pub fn from_env() -> Option<Self> {
        let user = std::env::var("HICD_USERNAME").ok()?;
        let password = std::env::var("HICD_PASSWORD").ok()?;
        Some(Self::new(user, password))
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Mask a patient identifier for logs (`1234****`).
pub fn mask_patient_id(patient_id: &str) -> String {
    let prefix: String = patient_id.chars().take(4).collect();
    if patient_id.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{prefix}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("nayara", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("nayara"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn expired_session_is_http_subtype() {
        assert!(SessionError::SessionExpired { status: 401 }.is_http());
        assert!(SessionError::Http { status: 500, body: String::new() }.is_http());
        assert!(!SessionError::Auth("erro".into()).is_http());
        assert!(!SessionError::Network("refused".into()).is_http());
    }

    #[test]
    fn auth_error_message_keeps_body() {
        let err = SessionError::Auth("erro|credenciais invalidas".into());
        assert!(err.to_string().contains("erro|credenciais invalidas"));
    }

    #[test]
    fn mask_patient_id_short_and_long() {
        assert_eq!(mask_patient_id("40380"), "4038****");
        assert_eq!(mask_patient_id("123"), "****");
        assert_eq!(mask_patient_id("1234"), "****");
    }

    #[test]
    fn state_labels() {
        assert_eq!(SessionState::Authenticated.as_str(), "authenticated");
        assert_eq!(SessionState::Unauthenticated.as_str(), "unauthenticated");
    }
}
