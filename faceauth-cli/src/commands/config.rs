//! Config command - show or change settings.json

use anyhow::{Context, Result};
use clap::Subcommand;

use faceauth_core::config::{Config, SETTINGS_FILE};

use super::get_faceauth_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show,
    /// Set a value by dotted path, e.g. `api.baseUrl http://host:8000`
    Set {
        /// Setting path (camelCase, dot separated)
        key: String,
        /// New value; parsed as JSON when possible
        value: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let faceauth_dir = get_faceauth_dir()?;

    match command {
        ConfigCommands::Show => {
            let config = Config::load(&faceauth_dir)?;
            println!("{}", serde_json::to_string_pretty(&config.to_json()?)?);
        }
        ConfigCommands::Set { key, value } => {
            std::fs::create_dir_all(&faceauth_dir)
                .with_context(|| format!("Failed to create faceauth directory: {:?}", faceauth_dir))?;
            let mut config = Config::load(&faceauth_dir)?;
            config.set_path(&key, &value)?;
            config.save(&faceauth_dir)?;
            output::success(&format!(
                "Updated {} in {}",
                key,
                faceauth_dir.join(SETTINGS_FILE).display()
            ));
        }
    }

    Ok(())
}
