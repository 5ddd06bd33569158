// NetBox wire types
//
// Only the fields vlansync reads are modelled; everything else in the
// NetBox payloads is ignored by serde.

use serde::Deserialize;

/// NetBox list envelope: `{ count, next, previous, results }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub count: Option<u64>,
    /// Absolute URL of the next page, `null` on the last page.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A device from `GET /api/dcim/devices/`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetboxDevice {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site: Option<NestedSite>,
    #[serde(default)]
    pub status: Option<StatusValue>,
    /// Tags are kept as raw JSON: NetBox returns nested tag objects,
    /// older plugins and fixtures return bare strings.
    #[serde(default)]
    pub tags: Vec<serde_json::Value>,
    #[serde(default)]
    pub primary_ip4: Option<NestedIp>,
}

impl NetboxDevice {
    /// Primary IPv4 address without its prefix length (`10.0.0.5/24` -> `10.0.0.5`).
    pub fn management_address(&self) -> Option<&str> {
        self.primary_ip4
            .as_ref()
            .and_then(|ip| ip.address.split('/').next())
            .filter(|addr| !addr.is_empty())
    }

    /// Whether the device status value is `active`.
    pub fn is_active(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.value == "active")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedSite {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Choice field: `{ "value": "active", "label": "Active" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusValue {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedIp {
    #[serde(default)]
    pub id: Option<u64>,
    /// CIDR notation, e.g. `192.0.2.10/24`.
    pub address: String,
}
