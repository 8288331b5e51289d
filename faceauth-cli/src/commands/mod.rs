//! CLI command implementations

pub mod app;
pub mod config;
pub mod doctor;
pub mod health;
pub mod login;
pub mod logout;
pub mod logs;
pub mod register;
pub mod whoami;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use faceauth_core::services::{EntryPoint, LogEvent, LoggingService, PageEnv};
use faceauth_core::{ContextOptions, FaceAuthContext};

use crate::shell::{TerminalNavigator, TerminalStatusView};

/// Get the logging service
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger(entry_point: EntryPoint) -> Option<LoggingService> {
    let faceauth_dir = get_faceauth_dir().ok()?;
    match LoggingService::new(&faceauth_dir, entry_point, env!("CARGO_PKG_VERSION")) {
        Ok(logger) => Some(logger),
        Err(e) => {
            tracing::debug!(error = %e, "event log unavailable");
            None
        }
    }
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// `FACEAUTH_DIR`, else `~/.faceauth`
pub fn get_faceauth_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FACEAUTH_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".faceauth"))
        .ok_or_else(|| anyhow!("Could not find home directory; set FACEAUTH_DIR"))
}

pub fn get_context(options: &ContextOptions) -> Result<FaceAuthContext> {
    let faceauth_dir = get_faceauth_dir()?;

    std::fs::create_dir_all(&faceauth_dir)
        .with_context(|| format!("Failed to create faceauth directory: {:?}", faceauth_dir))?;

    FaceAuthContext::new(&faceauth_dir, options).context("Failed to initialize faceauth context")
}

/// Page collaborators hosted by the terminal
pub fn terminal_env(ctx: &FaceAuthContext, quiet: bool) -> (PageEnv, Arc<TerminalNavigator>) {
    let navigator = Arc::new(TerminalNavigator::default());
    let env = ctx.page_env(navigator.clone(), Arc::new(TerminalStatusView { quiet }));
    (env, navigator)
}

/// Password from a flag, `FACEAUTH_PASSWORD`, or a hidden prompt
pub fn password_or_prompt(flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = flag {
        return Ok(p);
    }
    if let Ok(p) = std::env::var("FACEAUTH_PASSWORD") {
        return Ok(p);
    }
    Ok(dialoguer::Password::new().with_prompt(prompt).interact()?)
}

/// A value from a flag, or an interactive prompt
pub fn value_or_prompt(flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(v) = flag {
        return Ok(v);
    }
    Ok(dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}
