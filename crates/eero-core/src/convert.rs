// ── Payload-to-domain mapping ──
//
// Turns the raw `data` payloads returned by the pipeline into typed domain
// records. Parsing is strict about the fields a record cannot exist
// without and ignores everything it does not know. A payload that fails
// either check surfaces as `Error::MalformedResponse`, never as a
// transport error and never as a silently defaulted record.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use eero_api::Error;

use crate::model::{
    ClientDevice, ClientStatus, EeroDevice, GuestNetwork, MacAddress, Network, NetworkStatus,
    Profile, ResourceId, SpeedTest,
};

/// A domain record that can be built from one JSON object.
pub trait Record: Sized {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn from_payload(value: &Value) -> Result<Self, Error>;
}

/// Map a single-object payload to `T`.
pub fn parse<T: Record>(payload: &Value) -> Result<T, Error> {
    T::from_payload(payload)
}

// ── Records ─────────────────────────────────────────────────────────

/// Lazy view over an already-fetched list payload.
///
/// Items are mapped on demand, one `Result` per element, and every call to
/// [`iter`](Self::iter) starts over from the payload without re-fetching.
pub struct Records<T> {
    payload: Arc<Value>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Record> Records<T> {
    /// Wrap `payload`, checking only that it has a list shape. Accepted:
    /// a JSON array, `{"data": [...]}`, `{"networks": [...]}` and
    /// `{"networks": {"data": [...]}}`.
    pub fn new(payload: Arc<Value>) -> Result<Self, Error> {
        if list_items(&payload).is_none() {
            return Err(malformed(
                T::ENTITY,
                format!("expected a list, got {}", shape_name(&payload)),
            ));
        }
        Ok(Self {
            payload,
            marker: PhantomData,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<T, Error>> + '_ {
        self.items().iter().map(T::from_payload)
    }

    /// Map every item, failing on the first malformed one.
    pub fn to_vec(&self) -> Result<Vec<T>, Error> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// The raw payload, for callers that want to print it untouched.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    fn items(&self) -> &[Value] {
        list_items(&self.payload).map_or(&[], Vec::as_slice)
    }
}

impl<T> Clone for Records<T> {
    fn clone(&self) -> Self {
        Self {
            payload: Arc::clone(&self.payload),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Records<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("payload", &self.payload)
            .finish()
    }
}

fn list_items(payload: &Value) -> Option<&Vec<Value>> {
    match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => match (map.get("data"), map.get("networks")) {
            (Some(Value::Array(items)), _) | (None, Some(Value::Array(items))) => Some(items),
            (None, Some(Value::Object(inner))) => match inner.get("data") {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object without a list",
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn malformed(entity: &'static str, message: impl Into<String>) -> Error {
    Error::MalformedResponse {
        entity,
        message: message.into(),
    }
}

fn decode<'a, R: Deserialize<'a>>(entity: &'static str, value: &'a Value) -> Result<R, Error> {
    if !value.is_object() {
        return Err(malformed(
            entity,
            format!("expected an object, got {}", shape_name(value)),
        ));
    }
    R::deserialize(value).map_err(|e| malformed(entity, e.to_string()))
}

fn required<T>(entity: &'static str, field: &str, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| malformed(entity, format!("missing required field `{field}`")))
}

/// Explicit `id`, else the last segment of `url`.
fn resolve_id(
    entity: &'static str,
    id: Option<String>,
    url: Option<&str>,
) -> Result<ResourceId, Error> {
    id.filter(|s| !s.is_empty())
        .map(ResourceId::new)
        .or_else(|| url.and_then(|u| ResourceId::from_url(u, 0)))
        .ok_or_else(|| malformed(entity, "missing required field `id` (no id or url)"))
}

/// Parse a timestamp, dropping values that are not RFC 3339.
fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Ids arrive as strings or bare numbers.
fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Number(u64),
    }

    Ok(
        Option::<IdRepr>::deserialize(deserializer)?.map(|repr| match repr {
            IdRepr::Text(s) => s,
            IdRepr::Number(n) => n.to_string(),
        }),
    )
}

/// `location` is a plain string on most payloads and an object on some.
fn text_or_field(value: Option<&Value>, field: &str) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map.get(field).and_then(Value::as_str).map(str::to_owned),
        _ => None,
    }
}

#[derive(Deserialize)]
struct RawLink {
    #[serde(default, deserialize_with = "opt_id")]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl RawLink {
    fn resolve(&self) -> Option<ResourceId> {
        self.id
            .clone()
            .map(ResourceId::new)
            .or_else(|| self.url.as_deref().and_then(|u| ResourceId::from_url(u, 0)))
    }
}

// ── Network ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawNetwork {
    #[serde(default, deserialize_with = "opt_id")]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    isp_name: Option<String>,
    #[serde(default)]
    public_ip: Option<String>,
    #[serde(default)]
    gateway_ip: Option<String>,
    #[serde(default)]
    wan_type: Option<String>,
    #[serde(default)]
    guest_network: Option<RawGuestNetwork>,
    #[serde(default)]
    guest_network_enabled: Option<bool>,
    #[serde(default)]
    guest_network_name: Option<String>,
    #[serde(default)]
    speed: Option<RawSpeed>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct RawGuestNetwork {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawSpeed {
    #[serde(default)]
    down: Option<RawRate>,
    #[serde(default)]
    up: Option<RawRate>,
    #[serde(default)]
    date: Option<String>,
}

impl RawSpeed {
    fn into_speed_test(self) -> SpeedTest {
        SpeedTest {
            down_mbps: self.down.and_then(|r| r.value),
            up_mbps: self.up.and_then(|r| r.value),
            tested_at: parse_datetime(self.date.as_deref()),
        }
    }
}

/// A speed test payload carries at least one of `down` and `up`.
impl Record for SpeedTest {
    const ENTITY: &'static str = "speed test";

    fn from_payload(value: &Value) -> Result<Self, Error> {
        let raw: RawSpeed = decode(Self::ENTITY, value)?;
        if raw.down.is_none() && raw.up.is_none() {
            return Err(malformed(Self::ENTITY, "neither `down` nor `up` present"));
        }
        Ok(raw.into_speed_test())
    }
}

/// Result of starting a speed test. The service answers either with the
/// measurement or with an acknowledgement that carries no numbers yet.
pub fn speed_test_result(payload: &Value) -> Result<Option<SpeedTest>, Error> {
    let measured = payload
        .as_object()
        .is_some_and(|map| map.contains_key("down") || map.contains_key("up"));
    measured.then(|| SpeedTest::from_payload(payload)).transpose()
}

#[derive(Deserialize)]
struct RawRate {
    #[serde(default)]
    value: Option<f64>,
}

impl Record for Network {
    const ENTITY: &'static str = "network";

    fn from_payload(value: &Value) -> Result<Self, Error> {
        let raw: RawNetwork = decode(Self::ENTITY, value)?;
        let id = resolve_id(Self::ENTITY, raw.id, raw.url.as_deref())?;
        let name = required(Self::ENTITY, "name", raw.name)?;

        let guest_network = match raw.guest_network {
            Some(guest) => GuestNetwork {
                enabled: guest.enabled.unwrap_or(false),
                name: guest.name,
            },
            None => GuestNetwork {
                enabled: raw.guest_network_enabled.unwrap_or(false),
                name: raw.guest_network_name,
            },
        };

        let speed = raw.speed.map(RawSpeed::into_speed_test);

        Ok(Self {
            id,
            name,
            status: NetworkStatus::from_raw(raw.status.as_deref()),
            display_name: raw.display_name,
            isp_name: raw.isp_name,
            public_ip: raw.public_ip,
            gateway_ip: raw.gateway_ip,
            wan_type: raw.wan_type,
            guest_network,
            speed,
            created_at: parse_datetime(raw.created_at.as_deref().or(raw.created.as_deref())),
            url: raw.url,
        })
    }
}

// ── EeroDevice ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawEero {
    #[serde(default, deserialize_with = "opt_id")]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    serial: Option<String>,
    #[serde(default)]
    mac_address: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    location: Option<Value>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    gateway: Option<bool>,
    #[serde(default)]
    is_gateway: Option<bool>,
    #[serde(default)]
    connected: Option<bool>,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    os_version: Option<String>,
    #[serde(default)]
    os: Option<String>,
    #[serde(default)]
    connected_clients_count: Option<u32>,
    #[serde(default)]
    mesh_quality_bars: Option<u8>,
    #[serde(default)]
    network: Option<RawLink>,
}

impl Record for EeroDevice {
    const ENTITY: &'static str = "eero";

    fn from_payload(value: &Value) -> Result<Self, Error> {
        let raw: RawEero = decode(Self::ENTITY, value)?;
        let id = resolve_id(Self::ENTITY, raw.id, raw.url.as_deref())?;
        let serial = required(Self::ENTITY, "serial", raw.serial)?;
        let mac_address = required(Self::ENTITY, "mac_address", raw.mac_address)?;
        let model = required(Self::ENTITY, "model", raw.model)?;

        Ok(Self {
            id,
            network_id: raw.network.as_ref().and_then(RawLink::resolve),
            serial,
            mac_address: MacAddress::new(mac_address),
            model,
            location: text_or_field(raw.location.as_ref(), "address"),
            status: raw.status,
            is_gateway: raw.gateway.or(raw.is_gateway).unwrap_or(false),
            connected: raw.connected.unwrap_or(false),
            ip_address: raw.ip_address,
            os_version: raw.os_version.or(raw.os),
            connected_clients_count: raw.connected_clients_count.unwrap_or(0),
            mesh_quality_bars: raw.mesh_quality_bars,
            url: raw.url,
        })
    }
}

// ── ClientDevice ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawDevice {
    #[serde(default, deserialize_with = "opt_id")]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    network_id: Option<String>,
    #[serde(default)]
    mac: Option<String>,
    #[serde(default)]
    mac_address: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    connected: Option<bool>,
    #[serde(default)]
    wireless: Option<bool>,
    #[serde(default)]
    blocked: Option<bool>,
    #[serde(default)]
    blacklisted: Option<bool>,
    #[serde(default)]
    paused: Option<bool>,
    #[serde(default)]
    is_guest: Option<bool>,
    #[serde(default)]
    guest: Option<bool>,
    #[serde(default)]
    connection_type: Option<String>,
    #[serde(default)]
    profile: Option<RawLink>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    last_active: Option<String>,
    #[serde(default)]
    last_seen: Option<String>,
}

#[derive(Deserialize)]
struct RawSource {
    #[serde(default)]
    location: Option<Value>,
}

impl Record for ClientDevice {
    const ENTITY: &'static str = "device";

    fn from_payload(value: &Value) -> Result<Self, Error> {
        let raw: RawDevice = decode(Self::ENTITY, value)?;
        let id = resolve_id(Self::ENTITY, raw.id, raw.url.as_deref())?;
        let mac = required(Self::ENTITY, "mac", raw.mac.or(raw.mac_address))?;

        let network_id = raw
            .network_id
            .map(ResourceId::new)
            .or_else(|| raw.url.as_deref().and_then(|u| ResourceId::from_url(u, 2)));
        let connected = raw.connected.unwrap_or(false);
        let blocked = raw.blocked.or(raw.blacklisted).unwrap_or(false);

        Ok(Self {
            id,
            network_id,
            mac: MacAddress::new(mac),
            nickname: raw.nickname.filter(|s| !s.is_empty()),
            hostname: raw.hostname.filter(|s| !s.is_empty()),
            display_name: raw.display_name.filter(|s| !s.is_empty()),
            manufacturer: raw.manufacturer,
            ip: raw.ip.or(raw.ip_address),
            connected,
            wireless: raw.wireless.unwrap_or(false),
            blocked,
            paused: raw.paused.unwrap_or(false),
            is_guest: raw.is_guest.or(raw.guest).unwrap_or(false),
            connection_type: raw.connection_type,
            profile_id: raw.profile.as_ref().and_then(RawLink::resolve),
            source_location: raw
                .source
                .and_then(|s| text_or_field(s.location.as_ref(), "address")),
            last_active: parse_datetime(raw.last_active.as_deref().or(raw.last_seen.as_deref())),
            status: ClientStatus::derive(connected, blocked),
        })
    }
}

// ── Profile ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawProfile {
    #[serde(default, deserialize_with = "opt_id")]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    paused: Option<bool>,
    #[serde(default)]
    devices: Option<Vec<RawLink>>,
}

impl Record for Profile {
    const ENTITY: &'static str = "profile";

    fn from_payload(value: &Value) -> Result<Self, Error> {
        let raw: RawProfile = decode(Self::ENTITY, value)?;
        let id = resolve_id(Self::ENTITY, raw.id, raw.url.as_deref())?;
        let name = required(Self::ENTITY, "name", raw.name)?;

        Ok(Self {
            id,
            network_id: raw.url.as_deref().and_then(|u| ResourceId::from_url(u, 2)),
            name,
            paused: raw.paused.unwrap_or(false),
            device_ids: raw
                .devices
                .unwrap_or_default()
                .iter()
                .filter_map(RawLink::resolve)
                .collect(),
            url: raw.url,
        })
    }
}
