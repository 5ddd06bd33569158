// vlansync-api: Async Rust client for the NetBox inventory API

pub mod error;
pub mod netbox;
pub mod transport;

pub use error::Error;
pub use netbox::client::NetboxClient;
pub use netbox::models::{NestedIp, NestedSite, NetboxDevice, Paginated, StatusValue};
pub use transport::{TlsMode, TransportConfig};
