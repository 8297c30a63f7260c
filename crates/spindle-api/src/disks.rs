// Disk endpoints: physical inventory and formatting.

use crate::client::ArrayServiceClient;
use crate::error::Error;
use crate::models::{ActionMessage, DiskInventoryResponse, FormatDiskRequest};

impl ArrayServiceClient {
    /// Fetch every physical disk visible to the system, independent of
    /// array membership.
    pub async fn get_available_disks(&self) -> Result<DiskInventoryResponse, Error> {
        self.get(self.api_url("storage/disks")).await
    }

    /// Format a disk with the given filesystem and optional label.
    pub async fn format_disk(
        &self,
        disk: &str,
        request: &FormatDiskRequest,
    ) -> Result<ActionMessage, Error> {
        let url = self.api_url(&format!("storage/disks/{disk}/format"));
        self.post_action(url, request).await
    }
}
