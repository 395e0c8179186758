// ── Identity types ──
//
// eero payloads identify resources by string ids, often only through the
// resource `url`. ResourceId and MacAddress keep both forms uniform.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── ResourceId ──────────────────────────────────────────────────────

/// Server-assigned identifier of a network, eero, device or profile.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id segment of a resource URL, counted from the end.
    ///
    /// For `/2.2/networks/123/devices/abc`, `back = 0` yields `abc` and
    /// `back = 2` yields `123`.
    pub fn from_url(url: &str, back: usize) -> Option<Self> {
        url.trim_end_matches('/')
            .rsplit('/')
            .nth(back)
            .filter(|segment| !segment.is_empty() && *segment != "2.2")
            .map(Self::new)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase().replace('-', ":"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_device_url() {
        let url = "/2.2/networks/3401709/devices/44070b35c7b2";
        assert_eq!(
            ResourceId::from_url(url, 0),
            Some(ResourceId::new("44070b35c7b2"))
        );
        assert_eq!(ResourceId::from_url(url, 2), Some(ResourceId::new("3401709")));
    }

    #[test]
    fn id_from_short_url() {
        assert_eq!(
            ResourceId::from_url("/2.2/eeros/26172144/", 0),
            Some(ResourceId::new("26172144"))
        );
        assert_eq!(ResourceId::from_url("/2.2/eeros/26172144", 2), None);
        assert_eq!(ResourceId::from_url("", 0), None);
    }

    #[test]
    fn mac_address_normalizes() {
        assert_eq!(MacAddress::new("AA-BB-CC-DD-EE-FF").as_str(), "aa:bb:cc:dd:ee:ff");
    }
}
