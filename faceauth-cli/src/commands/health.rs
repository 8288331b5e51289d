//! Health command - probe the backend

use anyhow::{bail, Result};
use colored::Colorize;

use faceauth_core::ContextOptions;

use super::get_context;
use crate::shell::spinner;

pub fn run(options: &ContextOptions, json: bool) -> Result<()> {
    let ctx = get_context(options)?;

    let progress = (!json).then(|| spinner(&format!("Contacting {}...", ctx.config.api.base_url)));
    let result = ctx.gateway.health();
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let health = match result {
        Ok(health) => health,
        Err(e) => {
            if json {
                println!("{}", serde_json::json!({ "healthy": false, "error": e.to_string() }));
            }
            bail!("Backend unreachable: {}", e);
        }
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "healthy": health.is_healthy(),
                "status": health.status,
                "message": health.message,
                "database": health.database,
            })
        );
        return Ok(());
    }

    let label = if health.is_healthy() {
        "healthy".green()
    } else {
        "unhealthy".red()
    };
    println!("Backend {} is {}", ctx.config.api.base_url, label);
    if let Some(message) = &health.message {
        println!("  {}", message);
    }
    if let Some(database) = &health.database {
        println!("  Database: {}", database);
    }
    Ok(())
}
