//! eero-api: async client for the eero home network cloud API.
//!
//! Owns everything between a caller and the wire: the login session and
//! its persistence, the request pipeline with bounded retry, and the
//! response cache. Typed domain records live one layer up in `eero-core`.

mod auth;
pub mod cache;
pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod request;
pub mod retry;
pub mod session;
pub mod transport;

pub use cache::{CacheFamily, CacheKey, DEFAULT_CACHE_TTL, ResponseCache};
pub use client::{ApiClient, ApiConfig};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use endpoints::{ContentFilter, DomainList, NetworkResource};
pub use error::{Error, ErrorKind};
pub use request::RequestDescriptor;
pub use retry::RetryPolicy;
pub use session::{AuthBackend, AuthContext, Session, SessionIdentity, SessionManager, SessionState};
pub use transport::{DEFAULT_API_URL, DEFAULT_TIMEOUT, TransportConfig};

pub use secrecy::{ExposeSecret, SecretString};
pub use tokio_util::sync::CancellationToken;
