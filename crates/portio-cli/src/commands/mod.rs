pub mod config;
pub mod dump;
pub mod path;

pub use config::{handle_config_command, load_manager, ConfigCommand};
pub use dump::{dump, DumpOptions, RecordFormat};
