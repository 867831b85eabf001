pub mod api_status;
pub mod data_table;
pub mod env_version;
pub mod notifications_bell;

pub use api_status::api_status;
pub use env_version::env_version;
pub use notifications_bell::notifications_bell;
