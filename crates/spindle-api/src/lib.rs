// spindle-api: Async Rust client for the Spindle NAS array-management service

pub mod arrays;
pub mod client;
pub mod disks;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ArrayServiceClient;
pub use error::Error;
pub use models::{
    ActionMessage, ArrayOptionsUpdate, CacheVolumeWire, CreateArrayRequest, CreateCacheRequest,
    DiskInventoryResponse, DiskWire, FormatDiskRequest, MemberWire, RaidArrayWire,
    RaidStatusResponse, SpeedLimitsWire,
};
pub use transport::{TlsMode, TransportConfig};
