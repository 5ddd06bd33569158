// NetBox DCIM device endpoints

use tracing::debug;

use crate::error::Error;
use crate::netbox::client::NetboxClient;
use crate::netbox::models::NetboxDevice;

impl NetboxClient {
    /// List every device at a site with the given status.
    ///
    /// `GET /api/dcim/devices/?site_id={site_id}&status={status}&limit={n}`,
    /// following pagination to the end.
    pub async fn list_devices(&self, site_id: u64, status: &str) -> Result<Vec<NetboxDevice>, Error> {
        let mut url = self.api_url("dcim/devices/")?;
        url.query_pairs_mut()
            .append_pair("site_id", &site_id.to_string())
            .append_pair("status", status)
            .append_pair("limit", &self.page_size().to_string());

        debug!(site_id, status, "listing devices");
        let devices: Vec<NetboxDevice> = self.get_all(url).await?;
        debug!(site_id, count = devices.len(), "devices listed");
        Ok(devices)
    }
}
