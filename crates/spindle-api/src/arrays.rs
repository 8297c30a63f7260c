// Array endpoints: status, member operations, options, lifecycle.

use serde_json::json;

use crate::client::ArrayServiceClient;
use crate::error::Error;
use crate::models::{
    ActionMessage, ArrayOptionsUpdate, CreateArrayRequest, CreateCacheRequest, RaidStatusResponse,
};

impl ArrayServiceClient {
    /// Fetch the authoritative state of every array plus the global
    /// speed limits.
    pub async fn get_raid_status(&self) -> Result<RaidStatusResponse, Error> {
        self.get(self.api_url("storage/raid")).await
    }

    /// Mark a member device failed. With `device = None` the service
    /// picks the member it already considers faulty.
    pub async fn mark_device_failed(
        &self,
        array: &str,
        device: Option<&str>,
    ) -> Result<ActionMessage, Error> {
        let url = self.api_url(&format!("storage/raid/{array}/fail"));
        self.post_action(url, &json!({ "device": device })).await
    }

    /// Start rebuilding onto the given member device.
    pub async fn start_rebuild(&self, array: &str, device: &str) -> Result<ActionMessage, Error> {
        let url = self.api_url(&format!("storage/raid/{array}/rebuild"));
        self.post_action(url, &json!({ "device": device })).await
    }

    /// Acknowledge a completed rebuild, returning the array to service.
    pub async fn finalize_rebuild(&self, array: &str) -> Result<ActionMessage, Error> {
        let url = self.api_url(&format!("storage/raid/{array}/finalize"));
        self.post_action(url, &json!({})).await
    }

    /// Apply an options update (bitmap, scrub, write-mostly, spare,
    /// member removal, speed limits).
    pub async fn update_array_options(
        &self,
        array: &str,
        options: &ArrayOptionsUpdate,
    ) -> Result<ActionMessage, Error> {
        let url = self.api_url(&format!("storage/raid/{array}/options"));
        self.put_action(url, options).await
    }

    /// Delete an array. The service refuses unsafe deletions unless
    /// `force` is set.
    pub async fn delete_array(&self, array: &str, force: bool) -> Result<ActionMessage, Error> {
        let mut url = self.api_url(&format!("storage/raid/{array}"));
        url.query_pairs_mut()
            .append_pair("force", if force { "true" } else { "false" });
        self.delete_action(url).await
    }

    /// Create a new array from the given disks.
    pub async fn create_array(
        &self,
        request: &CreateArrayRequest,
    ) -> Result<ActionMessage, Error> {
        self.post_action(self.api_url("storage/raid"), request).await
    }

    /// Attach an acceleration cache to an existing array.
    pub async fn create_cache(
        &self,
        array: &str,
        request: &CreateCacheRequest,
    ) -> Result<ActionMessage, Error> {
        let url = self.api_url(&format!("storage/raid/{array}/cache"));
        self.post_action(url, request).await
    }
}
