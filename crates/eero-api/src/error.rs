use thiserror::Error;

/// Coarse classification of an [`Error`], for callers that branch on the
/// failure family rather than on individual variants (exit codes, retry UI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    NotAuthenticated,
    Auth,
    Verification,
    SessionExpired,
    Transport,
    Api,
    MalformedResponse,
    Cancelled,
    CredentialStore,
    Config,
}

/// Top-level error type for the `eero-api` crate.
///
/// Every failure of the session manager and the request pipeline surfaces
/// as one of these variants. Nothing is swallowed: transient transport
/// failures on idempotent calls are retried first, everything else is
/// returned immediately.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session ─────────────────────────────────────────────────────
    /// No authenticated session. The caller must run the login/verify
    /// handshake; the client never prompts on its own.
    #[error("Not authenticated -- log in first")]
    NotAuthenticated,

    /// Login rejected, or no login handshake in a state that allows the call.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// One-time code rejected. The login stays pending; `verify` may be retried.
    #[error("Verification failed: {message}")]
    Verification { message: String },

    /// A previously valid session was rejected mid-use.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// Network failure or server-busy response, after retries were exhausted
    /// (or immediately, for calls that are never retried).
    #[error("Transport error after {attempts} attempt(s): {message}")]
    Transport {
        message: String,
        attempts: u32,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The caller cancelled the call before it completed.
    #[error("Request cancelled")]
    Cancelled,

    // ── API ─────────────────────────────────────────────────────────
    /// The service rejected the request (not found, bad request, conflict...).
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The payload did not have the shape required for `entity`.
    #[error("Malformed {entity} response: {message}")]
    MalformedResponse {
        entity: &'static str,
        message: String,
    },

    // ── Local ───────────────────────────────────────────────────────
    /// Reading or writing the persisted session token failed.
    #[error("Credential store error: {message}")]
    CredentialStore { message: String },

    /// The client could not be built from its configuration.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthenticated => ErrorKind::NotAuthenticated,
            Self::Authentication { .. } => ErrorKind::Auth,
            Self::Verification { .. } => ErrorKind::Verification,
            Self::SessionExpired => ErrorKind::SessionExpired,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Api { .. } => ErrorKind::Api,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::CredentialStore { .. } => ErrorKind::CredentialStore,
            Self::InvalidUrl(_) | Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns `true` if the caller has to (re-)run the login handshake.
    pub fn is_auth_related(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated
                | Self::Authentication { .. }
                | Self::Verification { .. }
                | Self::SessionExpired
        )
    }

    /// Returns `true` for failures a later attempt may clear: network
    /// errors and "busy" statuses (429, 502, 503, 504).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Api { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" rejection.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The HTTP status the service answered with, if the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport {
                source: Some(e), ..
            } => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn credential_store(err: impl std::fmt::Display) -> Self {
        Self::CredentialStore {
            message: err.to_string(),
        }
    }
}

/// HTTP statuses the pipeline retries on idempotent calls.
pub(crate) fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503 | 504)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Error::NotAuthenticated.kind(), ErrorKind::NotAuthenticated);
        assert_eq!(Error::SessionExpired.kind(), ErrorKind::SessionExpired);
        assert_eq!(
            Error::Api {
                status: 404,
                message: "gone".into()
            }
            .kind(),
            ErrorKind::Api
        );
        assert_eq!(ErrorKind::MalformedResponse.to_string(), "malformed-response");
    }

    #[test]
    fn auth_related_covers_session_failures() {
        assert!(Error::SessionExpired.is_auth_related());
        assert!(
            Error::Verification {
                message: "bad code".into()
            }
            .is_auth_related()
        );
        assert!(!Error::Cancelled.is_auth_related());
    }

    #[test]
    fn status_and_not_found() {
        let err = Error::Api {
            status: 404,
            message: "missing".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert_eq!(Error::SessionExpired.status(), None);
    }

    #[test]
    fn busy_statuses_are_transient() {
        for status in [429, 502, 503, 504] {
            let err = Error::Api {
                status,
                message: String::new(),
            };
            assert!(err.is_transient(), "{status} should be transient");
        }
        let err = Error::Api {
            status: 500,
            message: String::new(),
        };
        assert!(!err.is_transient());
        assert!(!Error::SessionExpired.is_transient());
    }
}
