// Session state machine.
//
// Holds the authentication state (Unauthenticated -> LoginPending ->
// Authenticated), drives the two-step login handshake through an
// `AuthBackend`, and persists the session token through a
// `CredentialStore`. Transitions are serialized by one async mutex held
// across the handshake's network I/O; readers load an `ArcSwap` snapshot.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use secrecy::SecretString;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::credentials::CredentialStore;
use crate::error::Error;

/// Random per-login identifier. Never derived from the token, so it is safe
/// to log and to embed in cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionIdentity(Uuid);

impl SessionIdentity {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionState {
    Unauthenticated,
    LoginPending,
    Authenticated,
}

/// Authentication state. Each variant carries exactly the data valid in it:
/// a verification handle only while a login is pending, a token only once
/// authenticated.
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    LoginPending {
        handle: SecretString,
    },
    Authenticated {
        token: SecretString,
        identity: SessionIdentity,
    },
}

impl Session {
    pub fn state(&self) -> SessionState {
        match self {
            Self::Unauthenticated => SessionState::Unauthenticated,
            Self::LoginPending { .. } => SessionState::LoginPending,
            Self::Authenticated { .. } => SessionState::Authenticated,
        }
    }

    pub fn identity(&self) -> Option<SessionIdentity> {
        match self {
            Self::Authenticated { identity, .. } => Some(*identity),
            _ => None,
        }
    }
}

/// What an authenticated call needs: the cookie value and the identity it
/// belongs to.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub token: SecretString,
    pub identity: SessionIdentity,
}

/// Network side of the login handshake.
///
/// Implemented by [`ApiClient`](crate::ApiClient); tests substitute a
/// scripted backend. Error mapping contract for `confirm_code`:
/// `Verification` for a rejected code, `Authentication` for a dead handle,
/// anything else leaves the session untouched.
pub trait AuthBackend: Sync {
    /// Ask the service to send a code to `identifier`. Returns the handle.
    fn request_code(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<SecretString, Error>> + Send;

    /// Confirm `code` for the pending `handle`.
    fn confirm_code(
        &self,
        handle: &SecretString,
        code: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Ask for the code to be delivered again.
    fn resend_code(&self, handle: &SecretString)
    -> impl Future<Output = Result<(), Error>> + Send;

    /// Exchange `token` for a fresh one. `Ok(None)` when the service
    /// accepted the request without issuing a new token.
    fn renew_session(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Option<SecretString>, Error>> + Send;

    /// Tell the service the session is over.
    fn end_session(&self, token: &SecretString)
    -> impl Future<Output = Result<(), Error>> + Send;
}

/// Owns the session and its persistence.
pub struct SessionManager {
    current: ArcSwap<Session>,
    transition: tokio::sync::Mutex<()>,
    store: Arc<dyn CredentialStore>,
}

impl SessionManager {
    /// Start unauthenticated, without looking at the store.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            current: ArcSwap::from_pointee(Session::Unauthenticated),
            transition: tokio::sync::Mutex::new(()),
            store,
        }
    }

    /// Start from whatever the store holds. A stored token yields an
    /// authenticated session with a fresh identity; a read failure is
    /// logged and yields an unauthenticated one.
    pub fn hydrate(store: Arc<dyn CredentialStore>) -> Self {
        let session = match store.load() {
            Ok(Some(token)) => {
                debug!("resuming persisted session");
                Session::Authenticated {
                    token,
                    identity: SessionIdentity::fresh(),
                }
            }
            Ok(None) => Session::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "could not read persisted session, starting logged out");
                Session::Unauthenticated
            }
        };

        Self {
            current: ArcSwap::from_pointee(session),
            transition: tokio::sync::Mutex::new(()),
            store,
        }
    }

    pub fn state(&self) -> SessionState {
        self.current.load().state()
    }

    /// Consistent point-in-time view of the session.
    pub fn snapshot(&self) -> Arc<Session> {
        self.current.load_full()
    }

    /// Auth context for an outgoing call. Never touches the network.
    pub fn ensure_authenticated(&self) -> Result<AuthContext, Error> {
        match self.current.load().as_ref() {
            Session::Authenticated { token, identity } => Ok(AuthContext {
                token: token.clone(),
                identity: *identity,
            }),
            _ => Err(Error::NotAuthenticated),
        }
    }

    /// Request a verification code for `identifier` (email or phone).
    ///
    /// Allowed while logged out or while another login is pending (the old
    /// handle is discarded). Refused while authenticated.
    pub async fn start_login<B: AuthBackend>(
        &self,
        backend: &B,
        identifier: &str,
    ) -> Result<(), Error> {
        let _guard = self.transition.lock().await;

        if self.state() == SessionState::Authenticated {
            return Err(Error::Authentication {
                message: "already logged in; log out first".into(),
            });
        }

        let handle = backend
            .request_code(identifier)
            .await
            .map_err(into_auth_error)?;

        self.current
            .store(Arc::new(Session::LoginPending { handle }));
        info!("verification code requested");
        Ok(())
    }

    /// Confirm the one-time code. Never retried: codes are single use.
    pub async fn verify<B: AuthBackend>(
        &self,
        backend: &B,
        code: &str,
    ) -> Result<SessionIdentity, Error> {
        let _guard = self.transition.lock().await;

        let snapshot = self.current.load_full();
        let Session::LoginPending { handle } = snapshot.as_ref() else {
            return Err(Error::Authentication {
                message: "no login in progress".into(),
            });
        };

        match backend.confirm_code(handle, code).await {
            Ok(()) => {
                let identity = SessionIdentity::fresh();
                let token = handle.clone();
                self.current.store(Arc::new(Session::Authenticated {
                    token: token.clone(),
                    identity,
                }));
                info!(%identity, "login verified");
                self.store.save(&token)?;
                Ok(identity)
            }
            Err(e @ Error::Authentication { .. }) => {
                debug!("verification handle rejected, login must restart");
                self.current.store(Arc::new(Session::Unauthenticated));
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Ask for the pending code to be sent again.
    pub async fn resend_code<B: AuthBackend>(&self, backend: &B) -> Result<(), Error> {
        let _guard = self.transition.lock().await;

        let snapshot = self.current.load_full();
        let Session::LoginPending { handle } = snapshot.as_ref() else {
            return Err(Error::Authentication {
                message: "no login in progress".into(),
            });
        };

        backend.resend_code(handle).await.map_err(into_auth_error)?;
        debug!("verification code resent");
        Ok(())
    }

    /// End the session. The remote call is best effort; local state is
    /// cleared regardless, so calling this twice is harmless.
    pub async fn logout<B: AuthBackend>(&self, backend: &B) -> Result<(), Error> {
        let _guard = self.transition.lock().await;

        let snapshot = self.current.load_full();
        if let Session::Authenticated { token, .. } = snapshot.as_ref() {
            if let Err(e) = backend.end_session(token).await {
                warn!(error = %e, "remote logout failed, clearing local session anyway");
            }
        }

        self.current.store(Arc::new(Session::Unauthenticated));
        self.store.clear()?;
        info!("logged out");
        Ok(())
    }

    /// Ask the service for a fresh session token.
    ///
    /// Only valid while authenticated; never starts a login. A new token
    /// replaces the old one under a new identity and is persisted. A
    /// response without a token keeps the current session. A rejected
    /// token ends the session like any other expiry.
    pub async fn refresh<B: AuthBackend>(&self, backend: &B) -> Result<SessionIdentity, Error> {
        let _guard = self.transition.lock().await;

        let snapshot = self.current.load_full();
        let Session::Authenticated { token, identity } = snapshot.as_ref() else {
            return Err(Error::NotAuthenticated);
        };

        match backend.renew_session(token).await {
            Ok(Some(token)) => {
                let identity = SessionIdentity::fresh();
                self.current.store(Arc::new(Session::Authenticated {
                    token: token.clone(),
                    identity,
                }));
                info!(%identity, "session refreshed");
                self.store.save(&token)?;
                Ok(identity)
            }
            Ok(None) => {
                debug!(%identity, "refresh returned no new token, keeping session");
                Ok(*identity)
            }
            Err(Error::Api { status: 401, .. }) => {
                self.expire_locked(&snapshot, *identity);
                Err(Error::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }

    /// Called when the service rejected `identity`'s token.
    ///
    /// Drops the session and the persisted token only if `identity` is
    /// still current: a newer login that raced the failing call is kept.
    /// Waits for any transition in progress, so the store is never cleared
    /// underneath a login that just saved its token. Always returns
    /// [`Error::SessionExpired`] for the caller to propagate.
    pub async fn on_session_expired(&self, identity: SessionIdentity) -> Error {
        let _guard = self.transition.lock().await;

        let snapshot = self.current.load_full();
        if snapshot.identity() == Some(identity) {
            self.expire_locked(&snapshot, identity);
        } else {
            debug!(%identity, "stale session expiry ignored");
        }
        Error::SessionExpired
    }

    /// Drop `snapshot` and the persisted token. Caller holds `transition`.
    fn expire_locked(&self, snapshot: &Arc<Session>, identity: SessionIdentity) {
        let previous = self
            .current
            .compare_and_swap(snapshot, Arc::new(Session::Unauthenticated));
        if Arc::ptr_eq(&previous, snapshot) {
            warn!(%identity, "session rejected by service");
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "failed to clear persisted session token");
            }
        }
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn into_auth_error(err: Error) -> Error {
    match err {
        Error::Authentication { .. } | Error::Cancelled => err,
        other => Error::Authentication {
            message: other.to_string(),
        },
    }
}
