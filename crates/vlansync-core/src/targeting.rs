// ── Device targeting ──
//
// Selects the active devices at a site whose tags intersect a VLAN's
// tags. One inventory query per call, no caching.

use std::future::Future;

use tracing::{debug, info};

use vlansync_api::{NetboxClient, NetboxDevice};

use crate::error::{InventoryError, InventoryUnavailable};
use crate::model::{Device, EmptyTagPolicy, SiteId, TagSet};

/// Source of truth for devices.
pub trait Inventory: Send + Sync {
    /// All devices at `site_id` with `active` status.
    fn query_active_devices(
        &self,
        site_id: SiteId,
    ) -> impl Future<Output = Result<Vec<Device>, InventoryError>> + Send;
}

/// Active devices at `site_id` sharing at least one tag with `tags`.
///
/// An empty tag set targets nothing and skips the inventory query.
/// Order follows the inventory and carries no meaning.
pub async fn target_devices<I: Inventory>(
    inventory: &I,
    site_id: SiteId,
    tags: &TagSet,
) -> Result<Vec<Device>, InventoryUnavailable> {
    if tags.is_empty() {
        debug!(%site_id, "no tags to match, targeting no devices");
        return Ok(Vec::new());
    }

    debug!(%site_id, %tags, "querying active devices");
    let devices = inventory
        .query_active_devices(site_id)
        .await
        .map_err(|source| InventoryUnavailable { site_id, source })?;

    let targets: Vec<Device> = devices
        .into_iter()
        .filter(|device| {
            if !device.active {
                debug!(device = %device.name, "skipping inactive device");
                return false;
            }
            let matching = device.tags.intersection(tags);
            if matching.is_empty() {
                debug!(device = %device.name, device_tags = %device.tags, "no matching tags");
                false
            } else {
                debug!(device = %device.name, %matching, "device matches VLAN tags");
                true
            }
        })
        .collect();

    info!(%site_id, %tags, count = targets.len(), "found switches matching VLAN tags");
    Ok(targets)
}

// ── NetBox-backed inventory ──────────────────────────────────────────

/// [`Inventory`] over the NetBox DCIM API.
pub struct NetboxInventory {
    client: NetboxClient,
    empty_tags: EmptyTagPolicy,
}

impl NetboxInventory {
    pub fn new(client: NetboxClient, empty_tags: EmptyTagPolicy) -> Self {
        Self { client, empty_tags }
    }

    pub fn client(&self) -> &NetboxClient {
        &self.client
    }
}

impl Inventory for NetboxInventory {
    async fn query_active_devices(&self, site_id: SiteId) -> Result<Vec<Device>, InventoryError> {
        let devices = self.client.list_devices(site_id.get(), "active").await?;
        Ok(devices
            .into_iter()
            .map(|raw| device_from_netbox(raw, site_id, self.empty_tags))
            .collect())
    }
}

/// Normalize a NetBox device into the engine's model.
pub fn device_from_netbox(raw: NetboxDevice, site_id: SiteId, policy: EmptyTagPolicy) -> Device {
    let active = raw.is_active();
    let management_address = raw.management_address().map(str::to_owned);
    let site_id = raw
        .site
        .as_ref()
        .and_then(|site| SiteId::new(site.id))
        .unwrap_or(site_id);

    Device {
        name: raw.name.clone().unwrap_or_else(|| format!("device-{}", raw.id)),
        id: raw.id,
        site_id,
        tags: TagSet::from_values(&raw.tags, policy),
        management_address,
        active,
    }
}
