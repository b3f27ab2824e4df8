pub mod loader;
pub mod schema;

pub use loader::{load_for_root, load_from_path, load_from_str, ConfigError, CONFIG_FILE_NAME};
pub use schema::{
    DiscoveryConfig, ValidationError, ValidationIssue, VitestifyConfig, WorkerConfig,
};
