//! Typed layer between `eero-api` and the CLI.
//!
//! - **[`EeroClient`]**: facade offering typed operations on networks, eeros,
//!   client devices and profiles, untyped reads of the remaining network
//!   resources, plus the login handshake and session refresh passthroughs.
//!   Reads go through the pipeline's cache; mutations evict what they touch.
//!
//! - **Data mapper** ([`convert`]): [`parse`] maps one payload to a record,
//!   [`Records`] is a lazy, restartable view over a list payload. Missing or
//!   mistyped required fields surface as `Error::MalformedResponse`.
//!
//! - **Domain model** ([`model`]): immutable snapshots identified by
//!   [`ResourceId`], with ids derived from resource URLs when the payload
//!   omits them.

pub mod client;
pub mod convert;
pub mod model;

pub use client::{EeroClient, GuestNetworkUpdate};
pub use convert::{Record, Records, parse, speed_test_result};
pub use model::{
    ClientDevice, ClientStatus, EeroDevice, GuestNetwork, MacAddress, Network, NetworkStatus,
    Profile, ResourceId, SpeedTest,
};

pub use eero_api::{ContentFilter, DomainList, Error, ErrorKind, NetworkResource, SessionState};
