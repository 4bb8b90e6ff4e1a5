pub mod defaults;
pub mod manager;
pub mod types;

pub use defaults::ProcessDefaults;
pub use manager::{ConfigError, ConfigManager};
pub use types::{PathSettings, PortioConfig, StreamSettings};
