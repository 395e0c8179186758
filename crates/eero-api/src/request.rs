use std::collections::BTreeSet;

use reqwest::Method;
use serde_json::Value;

use crate::cache::{CacheFamily, CacheKey};
use crate::session::SessionIdentity;

/// One call to the service: what to send and how the pipeline may treat it.
///
/// `families` has two meanings depending on the method. For reads it tags
/// the cache entry; for mutations it lists what to evict on success.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the API base URL, ids already substituted.
    pub path: String,
    /// Query parameters, kept sorted by name.
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Safe to send more than once. Only idempotent calls are retried.
    pub idempotent: bool,
    pub families: BTreeSet<CacheFamily>,
}

impl RequestDescriptor {
    fn new(method: Method, path: impl Into<String>, idempotent: bool) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            idempotent,
            families: BTreeSet::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, true)
    }

    /// POST is treated as non-idempotent unless marked otherwise.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path, false)
    }

    /// PUT replaces state, so repeating it is safe.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path, true)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let pos = self.query.partition_point(|(n, _)| *n <= name);
        self.query.insert(pos, (name, value.into()));
        self
    }

    pub fn with_family(mut self, family: CacheFamily) -> Self {
        self.families.insert(family);
        self
    }

    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    /// Anything other than GET/HEAD changes server state.
    pub fn is_mutating(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD)
    }

    pub fn is_cacheable(&self) -> bool {
        self.idempotent && !self.is_mutating()
    }

    pub fn cache_key(&self, identity: SessionIdentity) -> CacheKey {
        CacheKey {
            method: self.method.clone(),
            path: self.path.trim_matches('/').to_owned(),
            params: self.query.clone(),
            identity,
        }
    }
}
