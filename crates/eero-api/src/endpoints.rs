// Descriptor builders for every endpoint the client uses.
//
// Each function fixes the method, the path, the body shape and the cache
// families, so call sites never assemble paths by hand.

use serde_json::{Map, Value, json};
use strum::{EnumString, IntoStaticStr, VariantArray};

use crate::cache::CacheFamily;
use crate::request::RequestDescriptor;

// ── Auth ────────────────────────────────────────────────────────────

/// `POST login`. Repeating it only re-sends the code, so it may be retried.
pub fn login(identifier: &str) -> RequestDescriptor {
    RequestDescriptor::post("login")
        .with_body(json!({ "login": identifier }))
        .idempotent(true)
}

/// `POST login/verify`. Single-use code: never retried.
pub fn login_verify(code: &str) -> RequestDescriptor {
    RequestDescriptor::post("login/verify").with_body(json!({ "code": code }))
}

pub fn login_resend() -> RequestDescriptor {
    RequestDescriptor::post("login/resend")
}

pub fn logout() -> RequestDescriptor {
    RequestDescriptor::post("logout")
}

// ── Account ─────────────────────────────────────────────────────────

pub fn account() -> RequestDescriptor {
    RequestDescriptor::get("account").with_family(CacheFamily::account())
}

/// `POST account/refresh`. Rotates the token, so it is never retried.
pub fn account_refresh() -> RequestDescriptor {
    RequestDescriptor::post("account/refresh")
}

// ── Networks ────────────────────────────────────────────────────────

pub fn networks() -> RequestDescriptor {
    RequestDescriptor::get("networks").with_family(CacheFamily::networks())
}

pub fn network(network_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("networks/{network_id}"))
        .with_family(CacheFamily::network(network_id))
}

/// `PUT networks/{id}/guest_network`. Name and password are only sent when
/// given, leaving the current values in place otherwise.
pub fn set_guest_network(
    network_id: &str,
    enabled: bool,
    name: Option<&str>,
    password: Option<&str>,
) -> RequestDescriptor {
    let mut body = Map::new();
    body.insert("enabled".into(), Value::Bool(enabled));
    if let Some(name) = name {
        body.insert("name".into(), Value::String(name.to_owned()));
    }
    if let Some(password) = password {
        body.insert("password".into(), Value::String(password.to_owned()));
    }

    RequestDescriptor::put(format!("networks/{network_id}/guest_network"))
        .with_body(Value::Object(body))
        .with_family(CacheFamily::network(network_id))
        .with_family(CacheFamily::networks())
}

pub fn run_speed_test(network_id: &str) -> RequestDescriptor {
    RequestDescriptor::post(format!("networks/{network_id}/speedtest"))
        .with_family(CacheFamily::network(network_id))
}

/// `POST networks/{id}/reboot`. Every node restarts, so everything read
/// from the network goes stale.
pub fn reboot_network(network_id: &str) -> RequestDescriptor {
    RequestDescriptor::post(format!("networks/{network_id}/reboot"))
        .with_body(json!({}))
        .with_family(CacheFamily::networks())
        .with_family(CacheFamily::network(network_id))
        .with_family(CacheFamily::eeros(network_id))
        .with_family(CacheFamily::devices(network_id))
}

/// Read-only sub-resources of a network, returned as the service sends
/// them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumString, IntoStaticStr, VariantArray,
)]
#[strum(serialize_all = "snake_case")]
pub enum NetworkResource {
    Diagnostics,
    Settings,
    Insights,
    Routing,
    Thread,
    Support,
    Blacklist,
    Reservations,
    Forwards,
    Transfer,
    BurstReporters,
    AcCompat,
    Ouicheck,
    Password,
    Updates,
}

impl NetworkResource {
    /// Path segment under `networks/{id}/`.
    pub fn segment(self) -> &'static str {
        self.into()
    }
}

/// `GET networks/{id}/{resource}`, or `.../{resource}/{item}` for one
/// insight, burst reporter or device's transfer stats.
pub fn network_resource(
    network_id: &str,
    resource: NetworkResource,
    item: Option<&str>,
) -> RequestDescriptor {
    let mut path = format!("networks/{network_id}/{}", resource.segment());
    if let Some(item) = item {
        path.push('/');
        path.push_str(item);
    }
    RequestDescriptor::get(path).with_family(CacheFamily::network(network_id))
}

/// `POST networks/{id}/diagnostics`. Starts a new diagnostics run.
pub fn run_diagnostics(network_id: &str) -> RequestDescriptor {
    RequestDescriptor::post(format!("networks/{network_id}/diagnostics"))
        .with_body(json!({}))
        .with_family(CacheFamily::network(network_id))
}

// ── Eeros ───────────────────────────────────────────────────────────

pub fn eeros(network_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("networks/{network_id}/eeros"))
        .with_family(CacheFamily::eeros(network_id))
}

pub fn eero(network_id: &str, eero_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("networks/{network_id}/eeros/{eero_id}"))
        .with_family(CacheFamily::eeros(network_id))
}

pub fn reboot_eero(network_id: &str, eero_id: &str) -> RequestDescriptor {
    RequestDescriptor::post(format!("networks/{network_id}/eeros/{eero_id}/reboot"))
        .with_family(CacheFamily::eeros(network_id))
}

// ── Client devices ──────────────────────────────────────────────────

pub fn devices(network_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("networks/{network_id}/devices"))
        .with_family(CacheFamily::devices(network_id))
}

pub fn device(network_id: &str, device_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("networks/{network_id}/devices/{device_id}"))
        .with_family(CacheFamily::devices(network_id))
}

pub fn set_device_blocked(network_id: &str, device_id: &str, blocked: bool) -> RequestDescriptor {
    RequestDescriptor::put(format!("networks/{network_id}/devices/{device_id}"))
        .with_body(json!({ "blocked": blocked }))
        .with_family(CacheFamily::devices(network_id))
}

pub fn rename_device(network_id: &str, device_id: &str, nickname: &str) -> RequestDescriptor {
    RequestDescriptor::put(format!("networks/{network_id}/devices/{device_id}"))
        .with_body(json!({ "nickname": nickname }))
        .with_family(CacheFamily::devices(network_id))
}

// ── Profiles ────────────────────────────────────────────────────────

pub fn profiles(network_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("networks/{network_id}/profiles"))
        .with_family(CacheFamily::profiles(network_id))
}

pub fn profile(network_id: &str, profile_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(format!("networks/{network_id}/profiles/{profile_id}"))
        .with_family(CacheFamily::profiles(network_id))
}

/// Pausing a profile changes its devices' reachability too.
pub fn set_profile_paused(network_id: &str, profile_id: &str, paused: bool) -> RequestDescriptor {
    RequestDescriptor::put(format!("networks/{network_id}/profiles/{profile_id}"))
        .with_body(json!({ "paused": paused }))
        .with_family(CacheFamily::profiles(network_id))
        .with_family(CacheFamily::devices(network_id))
}

/// Content filter categories a profile can toggle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumString, IntoStaticStr, VariantArray,
)]
#[strum(serialize_all = "snake_case")]
pub enum ContentFilter {
    Adblock,
    AdblockPlus,
    SafeSearch,
    BlockMalware,
    BlockIllegal,
    BlockViolent,
    BlockAdult,
    YoutubeRestricted,
}

/// `PUT networks/{id}/profiles/{pid}` with `{"content_filter": {...}}`.
/// Categories not listed keep their current setting.
pub fn set_profile_content_filter(
    network_id: &str,
    profile_id: &str,
    filters: &[(ContentFilter, bool)],
) -> RequestDescriptor {
    let filter: Map<String, Value> = filters
        .iter()
        .map(|(category, on)| (<&str>::from(*category).to_owned(), Value::Bool(*on)))
        .collect();

    RequestDescriptor::put(format!("networks/{network_id}/profiles/{profile_id}"))
        .with_body(json!({ "content_filter": filter }))
        .with_family(CacheFamily::profiles(network_id))
}

/// Which of a profile's custom domain lists to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DomainList {
    Block,
    Allow,
}

impl DomainList {
    fn field(self) -> &'static str {
        match self {
            Self::Block => "custom_block_list",
            Self::Allow => "custom_allow_list",
        }
    }
}

/// `PUT networks/{id}/profiles/{pid}` replacing the custom block or allow
/// list with `domains`.
pub fn set_profile_domain_list(
    network_id: &str,
    profile_id: &str,
    list: DomainList,
    domains: &[String],
) -> RequestDescriptor {
    let mut body = Map::new();
    body.insert(list.field().into(), json!(domains));

    RequestDescriptor::put(format!("networks/{network_id}/profiles/{profile_id}"))
        .with_body(Value::Object(body))
        .with_family(CacheFamily::profiles(network_id))
}
