// ── eero (mesh node) domain types ──

use serde::{Deserialize, Serialize};

use super::ids::{MacAddress, ResourceId};

/// A physical eero node in the mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EeroDevice {
    pub id: ResourceId,
    /// Owning network, when the payload links it.
    pub network_id: Option<ResourceId>,
    pub serial: String,
    pub mac_address: MacAddress,
    pub model: String,
    pub location: Option<String>,
    pub status: Option<String>,
    pub is_gateway: bool,
    pub connected: bool,
    pub ip_address: Option<String>,
    pub os_version: Option<String>,
    pub connected_clients_count: u32,
    pub mesh_quality_bars: Option<u8>,
    pub url: Option<String>,
}

impl EeroDevice {
    /// Human label: the location if set, otherwise the model.
    pub fn label(&self) -> &str {
        self.location.as_deref().unwrap_or(&self.model)
    }
}
