// In-memory response cache for idempotent reads.
//
// Entries are keyed by (method, path, normalized query, session identity)
// and tagged with the resource families the request touches, so a
// mutation can evict everything it may have made stale.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::Instant;
use tracing::trace;

use crate::session::SessionIdentity;

/// Default lifetime of a cached response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Group of cache entries that a mutation invalidates together.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheFamily(String);

impl CacheFamily {
    /// Account details.
    pub fn account() -> Self {
        Self("account".into())
    }

    /// The account's network list.
    pub fn networks() -> Self {
        Self("networks".into())
    }

    /// One network's details (including guest network settings) and the
    /// per-network resources read alongside them.
    pub fn network(network_id: &str) -> Self {
        Self(format!("network:{network_id}"))
    }

    pub fn eeros(network_id: &str) -> Self {
        Self(format!("eeros:{network_id}"))
    }

    pub fn devices(network_id: &str) -> Self {
        Self(format!("devices:{network_id}"))
    }

    pub fn profiles(network_id: &str) -> Self {
        Self(format!("profiles:{network_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a cacheable request. Query parameters are kept sorted so
/// that parameter order never produces distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: reqwest::Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub identity: SessionIdentity,
}

#[derive(Debug)]
struct CacheEntry {
    value: Arc<Value>,
    families: BTreeSet<CacheFamily>,
    expires_at: Instant,
}

/// Concurrent TTL cache. Last writer wins per key; expiry is lazy.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live entry for `key`. An expired entry is removed and reported absent.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Value>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if now < entry.expires_at {
                trace!(path = %key.path, "cache hit");
                return Some(Arc::clone(&entry.value));
            }
        }
        // Ref dropped above; re-check under the shard lock in case a fresh
        // value landed in between.
        self.entries.remove_if(key, |_, entry| now >= entry.expires_at);
        None
    }

    /// Store `value` under `key` with the cache's TTL.
    pub fn put(&self, key: CacheKey, value: Arc<Value>, families: BTreeSet<CacheFamily>) {
        self.put_with_ttl(key, value, families, self.ttl);
    }

    pub fn put_with_ttl(
        &self,
        key: CacheKey,
        value: Arc<Value>,
        families: BTreeSet<CacheFamily>,
        ttl: Duration,
    ) {
        if ttl.is_zero() {
            return;
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                families,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Remove every entry tagged with `family`. Returns how many went.
    pub fn invalidate_family(&self, family: &CacheFamily) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.families.contains(family);
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            trace!(%family, removed, "cache family invalidated");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn key(path: &str) -> CacheKey {
        CacheKey {
            method: reqwest::Method::GET,
            path: path.into(),
            params: Vec::new(),
            identity: SessionIdentity::from_uuid(Uuid::nil()),
        }
    }

    fn families(list: &[CacheFamily]) -> BTreeSet<CacheFamily> {
        list.iter().cloned().collect()
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put(
            key("networks"),
            Arc::new(json!([1])),
            families(&[CacheFamily::networks()]),
        );

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get(&key("networks")).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&key("networks")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_family_removes_only_tagged_entries() {
        let cache = ResponseCache::default();
        cache.put(
            key("networks/1/devices"),
            Arc::new(json!([])),
            families(&[CacheFamily::devices("1")]),
        );
        cache.put(
            key("networks/1/profiles"),
            Arc::new(json!([])),
            families(&[CacheFamily::profiles("1"), CacheFamily::devices("1")]),
        );
        cache.put(
            key("networks/1/eeros"),
            Arc::new(json!([])),
            families(&[CacheFamily::eeros("1")]),
        );

        assert_eq!(cache.invalidate_family(&CacheFamily::devices("1")), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("networks/1/eeros")).is_some());
        assert_eq!(cache.invalidate_family(&CacheFamily::devices("1")), 0);
    }

    #[test]
    fn keys_are_scoped_by_session_identity() {
        let cache = ResponseCache::default();
        cache.put(key("networks"), Arc::new(json!([])), BTreeSet::new());

        let mut other = key("networks");
        other.identity = SessionIdentity::from_uuid(Uuid::from_u128(7));
        assert!(cache.get(&other).is_none());
        assert!(cache.get(&key("networks")).is_some());
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.put(key("networks"), Arc::new(json!([])), BTreeSet::new());
        assert!(cache.is_empty());
    }

    #[test]
    fn family_display() {
        assert_eq!(CacheFamily::network("42").to_string(), "network:42");
        assert_eq!(CacheFamily::networks().as_str(), "networks");
    }
}
