//! Assembly configuration: option record, defaults, and persisted storage

pub mod store;
pub mod types;

pub use store::{ConfigStore, StoredConfig};
pub use types::{CONFIG_VERSION, PrintConfig};
