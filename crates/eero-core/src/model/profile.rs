// ── Profile domain types ──

use serde::{Deserialize, Serialize};

use super::ids::ResourceId;

/// A group of client devices sharing schedules and pause state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ResourceId,
    pub network_id: Option<ResourceId>,
    pub name: String,
    pub paused: bool,
    /// Ids of the devices assigned to the profile.
    pub device_ids: Vec<ResourceId>,
    pub url: Option<String>,
}

impl Profile {
    pub fn device_count(&self) -> usize {
        self.device_ids.len()
    }
}
