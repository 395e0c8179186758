// Login handshake against the service.
//
// `ApiClient` is the `AuthBackend` its own session manager drives. The
// public wrappers below add the cache resets that go with each transition.

use secrecy::SecretString;
use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::endpoints;
use crate::error::Error;
use crate::models::LoginData;
use crate::session::{AuthBackend, SessionIdentity};

impl AuthBackend for ApiClient {
    async fn request_code(&self, identifier: &str) -> Result<SecretString, Error> {
        let data = self.send(&endpoints::login(identifier), None).await?;

        let login: LoginData =
            serde_json::from_value((*data).clone()).map_err(|_| Error::Authentication {
                message: "login response carried no verification handle".into(),
            })?;
        if login.user_token.is_empty() {
            return Err(Error::Authentication {
                message: "login response carried an empty verification handle".into(),
            });
        }

        debug!("verification handle received");
        Ok(SecretString::from(login.user_token))
    }

    async fn confirm_code(&self, handle: &SecretString, code: &str) -> Result<(), Error> {
        match self.send(&endpoints::login_verify(code), Some(handle)).await {
            Ok(_) => Ok(()),
            Err(Error::Api {
                status: 400 | 401 | 422,
                message,
            }) => Err(Error::Verification { message }),
            Err(Error::Api {
                status: 403 | 404 | 410,
                message,
            }) => Err(Error::Authentication {
                message: format!("login attempt expired ({message}); start again"),
            }),
            Err(e) => Err(e),
        }
    }

    async fn resend_code(&self, handle: &SecretString) -> Result<(), Error> {
        self.send(&endpoints::login_resend(), Some(handle))
            .await
            .map(|_| ())
    }

    async fn renew_session(&self, token: &SecretString) -> Result<Option<SecretString>, Error> {
        let data = self.send(&endpoints::account_refresh(), Some(token)).await?;
        let renewed = data
            .get("user_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        debug!(renewed = renewed.is_some(), "session refresh answered");
        Ok(renewed)
    }

    async fn end_session(&self, token: &SecretString) -> Result<(), Error> {
        self.send(&endpoints::logout(), Some(token)).await.map(|_| ())
    }
}

impl ApiClient {
    /// Step one of the login: ask the service to send a one-time code to
    /// `identifier` (email address or phone number).
    pub async fn start_login(&self, identifier: &str) -> Result<(), Error> {
        self.session.start_login(self, identifier).await
    }

    /// Step two: confirm the code. On success the session is persisted and
    /// every cached response is dropped.
    pub async fn verify(&self, code: &str) -> Result<SessionIdentity, Error> {
        let identity = self.session.verify(self, code).await?;
        self.cache.clear();
        Ok(identity)
    }

    /// Ask for the pending code to be sent again.
    pub async fn resend_code(&self) -> Result<(), Error> {
        self.session.resend_code(self).await
    }

    /// Trade the current token for a fresh one. Never logs in: without a
    /// session this fails with [`Error::NotAuthenticated`]. Cached
    /// responses are dropped whenever the identity changes.
    pub async fn refresh_session(&self) -> Result<SessionIdentity, Error> {
        let before = self.session.snapshot().identity();
        let result = self.session.refresh(self).await;
        if self.session.snapshot().identity() != before {
            self.cache.clear();
        }
        result
    }

    /// End the session locally and, best effort, remotely.
    pub async fn logout(&self) -> Result<(), Error> {
        let result = self.session.logout(self).await;
        self.cache.clear();
        result
    }
}
