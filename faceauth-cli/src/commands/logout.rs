//! Logout command - forget the cached session

use anyhow::Result;

use faceauth_core::services::{DashboardPage, EntryPoint, LogEvent};
use faceauth_core::ContextOptions;

use super::{get_context, get_logger, log_event, terminal_env};
use crate::output;

pub fn run(options: &ContextOptions) -> Result<()> {
    let ctx = get_context(options)?;
    let logger = get_logger(EntryPoint::Cli);
    log_event(&logger, LogEvent::new("command_executed").with_command("logout"));

    let (env, navigator) = terminal_env(&ctx, false);
    let mut page = DashboardPage::new(env);

    let Some(view) = page.load() else {
        let _ = navigator.take();
        output::info("Not signed in.");
        return Ok(());
    };

    page.logout()?;
    let _ = navigator.take();
    log_event(&logger, LogEvent::new("logged_out").with_command("logout"));
    output::success(&format!("Signed out {}", view.username));
    Ok(())
}
