// ── Network domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ResourceId;

/// Reported state of a network. The service says `connected` for a
/// healthy network; that maps to [`NetworkStatus::Online`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NetworkStatus {
    Online,
    Offline,
    Updating,
    Unknown,
}

impl NetworkStatus {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("online" | "connected") => Self::Online,
            Some("offline" | "disconnected") => Self::Offline,
            Some("updating") => Self::Updating,
            _ => Self::Unknown,
        }
    }
}

/// Guest network settings as reported on the network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestNetwork {
    pub enabled: bool,
    pub name: Option<String>,
}

/// Latest speed test result attached to a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTest {
    pub down_mbps: Option<f64>,
    pub up_mbps: Option<f64>,
    pub tested_at: Option<DateTime<Utc>>,
}

/// A network on the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: ResourceId,
    pub name: String,
    pub status: NetworkStatus,
    pub display_name: Option<String>,
    pub isp_name: Option<String>,
    pub public_ip: Option<String>,
    pub gateway_ip: Option<String>,
    pub wan_type: Option<String>,
    pub guest_network: GuestNetwork,
    pub speed: Option<SpeedTest>,
    pub created_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}
