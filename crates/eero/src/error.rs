//! CLI error types with miette diagnostics.
//!
//! Maps `eero_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use eero_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(code(eero::not_authenticated), help("Run: eero login"))]
    NotAuthenticated,

    #[error("Login failed: {message}")]
    #[diagnostic(
        code(eero::auth_failed),
        help("Start over with: eero login --force")
    )]
    AuthFailed { message: String },

    #[error("Verification code rejected: {message}")]
    #[diagnostic(
        code(eero::verification_failed),
        help("Check the code that was sent to you, or enter `r` at the prompt to get a new one.")
    )]
    VerificationFailed { message: String },

    #[error("Too many failed verification attempts")]
    #[diagnostic(code(eero::too_many_attempts), help("Run: eero login"))]
    TooManyAttempts,

    #[error("Session expired")]
    #[diagnostic(
        code(eero::session_expired),
        help("The service ended the session. Log in again with: eero login")
    )]
    SessionExpired,

    // ── Transport ────────────────────────────────────────────────────
    #[error("Could not reach the eero service after {attempts} attempt(s): {message}")]
    #[diagnostic(
        code(eero::connection_failed),
        help("Check your internet connection, or raise --timeout.")
    )]
    ConnectionFailed { message: String, attempts: u32 },

    #[error("Operation cancelled")]
    #[diagnostic(code(eero::cancelled))]
    Cancelled,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(eero::not_found),
        help("Run: eero {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' is ambiguous ({matches} matches)")]
    #[diagnostic(code(eero::ambiguous), help("Use the ID instead of the name."))]
    Ambiguous {
        resource_type: String,
        identifier: String,
        matches: usize,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(eero::api_error))]
    Api { status: u16, message: String },

    #[error("Unexpected {entity} data from the service: {message}")]
    #[diagnostic(
        code(eero::malformed_response),
        help("The service returned data this version does not understand. Try -vv for details.")
    )]
    MalformedResponse {
        entity: &'static str,
        message: String,
    },

    #[error("Credential store error: {message}")]
    #[diagnostic(
        code(eero::credential_store),
        help("Try the file store instead: --credential-store file")
    )]
    CredentialStore { message: String },

    // ── Validation & configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(eero::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(eero::config),
        help("Inspect the file at `eero config path`, or unset EERO_* variables.")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(eero::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(eero::render))]
    Render(String),

    #[error(transparent)]
    #[diagnostic(code(eero::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotAuthenticated
            | Self::AuthFailed { .. }
            | Self::VerificationFailed { .. }
            | Self::TooManyAttempts
            | Self::SessionExpired => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Ambiguous { .. } => exit_code::CONFLICT,
            Self::Api { status, .. } => match status {
                404 => exit_code::NOT_FOUND,
                409 => exit_code::CONFLICT,
                401 | 403 => exit_code::AUTH,
                _ => exit_code::GENERAL,
            },
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── eero_api::Error → CliError mapping ───────────────────────────────

impl From<eero_api::Error> for CliError {
    fn from(err: eero_api::Error) -> Self {
        use eero_api::Error as E;

        match err {
            E::NotAuthenticated => Self::NotAuthenticated,
            E::Authentication { message } => Self::AuthFailed { message },
            E::Verification { message } => Self::VerificationFailed { message },
            E::SessionExpired => Self::SessionExpired,
            E::Transport {
                message, attempts, ..
            } => Self::ConnectionFailed { message, attempts },
            E::InvalidUrl(e) => Self::Validation {
                field: "api_url".into(),
                reason: e.to_string(),
            },
            E::Cancelled => Self::Cancelled,
            E::Api { status, message } => Self::Api { status, message },
            E::MalformedResponse { entity, message } => Self::MalformedResponse { entity, message },
            E::CredentialStore { message } => Self::CredentialStore { message },
            E::Config(message) => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}
