//! Infrastructure layer: loading configuration from outside the process

mod config_loader;

pub use config_loader::{config_from_json, load_config};
