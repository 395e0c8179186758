// ── Client device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{MacAddress, ResourceId};

/// Connection state of a client, derived from the `connected` and
/// `blocked` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClientStatus {
    Connected,
    Disconnected,
    Blocked,
}

impl ClientStatus {
    pub fn derive(connected: bool, blocked: bool) -> Self {
        match (connected, blocked) {
            (true, true) => Self::Blocked,
            (true, false) => Self::Connected,
            (false, _) => Self::Disconnected,
        }
    }
}

/// A phone, laptop or other device seen on a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClientDevice {
    pub id: ResourceId,
    pub network_id: Option<ResourceId>,
    pub mac: MacAddress,
    pub nickname: Option<String>,
    pub hostname: Option<String>,
    pub display_name: Option<String>,
    pub manufacturer: Option<String>,
    pub ip: Option<String>,
    pub connected: bool,
    pub wireless: bool,
    pub blocked: bool,
    pub paused: bool,
    pub is_guest: bool,
    pub connection_type: Option<String>,
    pub profile_id: Option<ResourceId>,
    /// Location of the eero the device is attached to.
    pub source_location: Option<String>,
    pub last_active: Option<DateTime<Utc>>,
    pub status: ClientStatus,
}

impl ClientDevice {
    /// Best available name: nickname, then hostname, then display name,
    /// then the MAC address.
    pub fn name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.hostname.as_deref())
            .or(self.display_name.as_deref())
            .unwrap_or(self.mac.as_str())
    }
}
