use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use portio_config::{ConfigManager, PortioConfig};
use portio_fs::{resolve_current_directory, resolve_temp_directory};
use serde::Serialize;

use crate::output::{emit, OutputFormat, Report};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show config file path
    Path,
}

/// Loads the config the other commands run with.
///
/// An explicit path must exist; the default location falls back to the
/// built-in defaults when absent.
pub fn load_manager(explicit: Option<&Path>) -> Result<ConfigManager> {
    match explicit {
        Some(path) => ConfigManager::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => ConfigManager::load_or_default().context("Failed to load config"),
    }
}

pub fn handle_config_command(
    cmd: ConfigCommand,
    explicit: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let manager = load_manager(explicit)?;
            emit(&ConfigReport::new(&manager), format)
        }
        ConfigCommand::Init { force } => init_config(explicit, force),
        ConfigCommand::Path => show_config_path(explicit),
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub path: PathBuf,
    pub exists: bool,
    pub config: PortioConfig,
    /// Temporary directory after applying overrides and fallbacks
    pub temp_directory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_directory: Option<String>,
}

impl ConfigReport {
    pub fn new(manager: &ConfigManager) -> Self {
        let config = manager.config().clone();
        Self {
            path: manager.path().to_path_buf(),
            exists: manager.path().exists(),
            temp_directory: resolve_temp_directory(&config.paths),
            current_directory: resolve_current_directory(&config.paths),
            config,
        }
    }
}

impl Report for ConfigReport {
    fn print_human(&self) {
        let source = if self.exists { "" } else { " (not created, using defaults)" };
        println!("{} {}{}", "Config:".bold(), self.path.display(), source);
        match toml::to_string_pretty(&self.config) {
            Ok(text) => println!("\n{}", text.trim_end()),
            Err(e) => eprintln!("Error serializing config: {}", e),
        }
        println!("\n{} {}", "Temp directory:".bold(), self.temp_directory);
        if let Some(dir) = &self.current_directory {
            println!("{} {}", "Current directory:".bold(), dir);
        }
    }
}

fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => ConfigManager::config_path()?,
    };

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("To reinitialize, pass --force.");
        return Ok(());
    }

    ConfigManager::init_at(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("{} Initialized config at: {}", "✓".green(), config_path.display());
    Ok(())
}

fn show_config_path(explicit: Option<&Path>) -> Result<()> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => ConfigManager::config_path()?,
    };
    println!("{}", config_path.display());
    Ok(())
}
