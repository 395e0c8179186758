// ── Domain model ──
//
// Immutable snapshots of eero resources. Relationships between records are
// foreign ids only; nothing here holds a reference to another record.

pub mod client_device;
pub mod eero;
pub mod ids;
pub mod network;
pub mod profile;

pub use client_device::{ClientDevice, ClientStatus};
pub use eero::EeroDevice;
pub use ids::{MacAddress, ResourceId};
pub use network::{GuestNetwork, Network, NetworkStatus, SpeedTest};
pub use profile::Profile;
