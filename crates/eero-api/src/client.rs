// Request pipeline.
//
// `ApiClient` is the only path to the service. `execute` checks the
// session, consults the cache, sends the request with the session cookie,
// classifies the response and retries transient failures on idempotent
// calls. Cache writes and session transitions happen synchronously after
// the last network await, so dropping a call mid-flight mutates nothing.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{DEFAULT_CACHE_TTL, ResponseCache};
use crate::credentials::CredentialStore;
use crate::error::{Error, is_transient_status};
use crate::models::{self, Envelope};
use crate::request::RequestDescriptor;
use crate::retry::RetryPolicy;
use crate::session::{SessionManager, SessionState};
use crate::transport::{DEFAULT_API_URL, TransportConfig};

/// Everything needed to build an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Versioned API root. A missing trailing `/` is added.
    pub base_url: String,
    pub transport: TransportConfig,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            transport: TransportConfig::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            retry: RetryPolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Point the client at another deployment (or a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Async client for the eero cloud API.
///
/// `Send + Sync`; share it behind an `Arc` for concurrent calls.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    pub(crate) session: SessionManager,
    pub(crate) cache: ResponseCache,
    retry: RetryPolicy,
}

/// Outcome of a single network attempt.
enum Attempt {
    Done(Result<Arc<Value>, Error>),
    Transient {
        message: String,
        source: Option<reqwest::Error>,
    },
}

impl ApiClient {
    /// Build a client and resume any session found in `store`.
    pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Self::with_client(http, &config, store)
    }

    /// Build a client around a pre-configured `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        config: &ApiConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(&config.base_url)?,
            session: SessionManager::hydrate(store),
            cache: ResponseCache::new(config.cache_ttl),
            retry: config.retry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    // ── Pipeline ─────────────────────────────────────────────────────

    /// Run `desc` as the current session and return the envelope's `data`.
    pub async fn execute(&self, desc: &RequestDescriptor) -> Result<Arc<Value>, Error> {
        let auth = self.session.ensure_authenticated()?;

        let key = desc
            .is_cacheable()
            .then(|| desc.cache_key(auth.identity));
        if let Some(hit) = key.as_ref().and_then(|k| self.cache.get(k)) {
            return Ok(hit);
        }

        match self.send(desc, Some(&auth.token)).await {
            Ok(data) => {
                if let Some(key) = key {
                    self.cache.put(key, Arc::clone(&data), desc.families.clone());
                }
                if desc.is_mutating() {
                    for family in &desc.families {
                        self.cache.invalidate_family(family);
                    }
                }
                Ok(data)
            }
            Err(Error::Api { status: 401, .. }) => {
                let err = self.session.on_session_expired(auth.identity).await;
                self.cache.clear();
                Err(err)
            }
            Err(e) => Err(e),
        }
    }

    /// [`execute`](Self::execute), abandoned with [`Error::Cancelled`] as
    /// soon as `cancel` fires.
    pub async fn execute_with_cancel(
        &self,
        desc: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Arc<Value>, Error> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(path = %desc.path, "request cancelled");
                Err(Error::Cancelled)
            }
            result = self.execute(desc) => result,
        }
    }

    /// Send `desc` with an optional session cookie, retrying transient
    /// failures when the descriptor allows it. No cache, no session checks:
    /// the login handshake goes through here directly.
    pub(crate) async fn send(
        &self,
        desc: &RequestDescriptor,
        cookie: Option<&SecretString>,
    ) -> Result<Arc<Value>, Error> {
        let url = self.url(&desc.path)?;
        let cookie = cookie.map(session_cookie).transpose()?;
        let max_attempts = if desc.idempotent {
            self.retry.max_attempts
        } else {
            1
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(desc, url.clone(), cookie.as_ref(), attempt).await {
                Attempt::Done(result) => return result,
                Attempt::Transient { message, source } => {
                    if attempt >= max_attempts {
                        return Err(Error::Transport {
                            message,
                            attempts: attempt,
                            source,
                        });
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        method = %desc.method,
                        path = %desc.path,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "transient failure, retrying: {message}"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn attempt(
        &self,
        desc: &RequestDescriptor,
        url: Url,
        cookie: Option<&HeaderValue>,
        attempt: u32,
    ) -> Attempt {
        debug!(method = %desc.method, path = %desc.path, attempt, "sending request");

        let mut builder = self.http.request(desc.method.clone(), url);
        if !desc.query.is_empty() {
            builder = builder.query(&desc.query);
        }
        if let Some(body) = &desc.body {
            builder = builder.json(body);
        }
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie.clone());
        }

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() || e.is_connect() => {
                return Attempt::Transient {
                    message: e.to_string(),
                    source: Some(e),
                };
            }
            Err(e) => {
                return Attempt::Done(Err(Error::Transport {
                    message: e.to_string(),
                    attempts: attempt,
                    source: Some(e),
                }));
            }
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                return Attempt::Transient {
                    message: format!("failed to read response body: {e}"),
                    source: Some(e),
                };
            }
        };

        if is_transient_status(status.as_u16()) {
            return Attempt::Transient {
                message: describe_status(status, &body),
                source: None,
            };
        }

        Attempt::Done(parse_envelope(status, &body))
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session.state())
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Unwrap `{meta, data}`. An envelope reporting an error code is treated
/// like the matching HTTP status.
fn parse_envelope(status: StatusCode, body: &str) -> Result<Arc<Value>, Error> {
    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: describe_status(status, body),
        });
    }

    if body.trim().is_empty() {
        return Ok(Arc::new(Value::Null));
    }

    let envelope: Envelope = serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
        entity: "envelope",
        message: format!("{e} (body preview: {:?})", preview(body)),
    })?;

    if let Some(code) = envelope.meta.code.filter(|c| *c >= 400) {
        return Err(Error::Api {
            status: code,
            message: envelope
                .meta
                .error
                .unwrap_or_else(|| format!("service reported code {code}")),
        });
    }

    Ok(Arc::new(envelope.data))
}

fn describe_status(status: StatusCode, body: &str) -> String {
    models::error_message(body).unwrap_or_else(|| {
        let preview = preview(body);
        if preview.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {preview}")
        }
    })
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

fn session_cookie(token: &SecretString) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(&format!("s={}", token.expose_secret())).map_err(|_| {
        Error::Authentication {
            message: "session token contains invalid characters".into(),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Parse `raw` and make sure the path ends in `/` so relative joins keep
/// the version segment.
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
