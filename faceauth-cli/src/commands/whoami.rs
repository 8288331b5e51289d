//! Whoami command - show the signed-in user

use anyhow::{bail, Result};
use colored::Colorize;

use faceauth_core::services::{DashboardPage, DashboardView, EntryPoint, LogEvent};
use faceauth_core::ContextOptions;

use super::{get_context, get_logger, log_event, terminal_env};
use crate::output;

pub fn run(options: &ContextOptions, refresh: bool, json: bool) -> Result<()> {
    let ctx = get_context(options)?;
    let logger = get_logger(EntryPoint::Cli);
    log_event(&logger, LogEvent::new("command_executed").with_command("whoami"));

    let (env, navigator) = terminal_env(&ctx, json);
    let mut page = DashboardPage::new(env);

    let Some(mut view) = page.load() else {
        let _ = navigator.take();
        if json {
            println!("{}", serde_json::json!({ "signed_in": false }));
            return Ok(());
        }
        bail!("Not signed in. Run 'faceauth login' first.");
    };

    if refresh {
        match page.refresh() {
            Ok(fresh) => view = fresh,
            Err(e) => {
                log_event(
                    &logger,
                    LogEvent::new("profile_refresh_failed")
                        .with_command("whoami")
                        .with_error(e.to_string()),
                );
                bail!("Could not refresh profile");
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

pub(crate) fn print_view(view: &DashboardView) {
    println!("{}  {}", format!("[{}]", view.initial).bold(), view.username.bold());
    let mut table = output::create_table();
    table.add_row(vec!["Email", view.email.as_str()]);
    table.add_row(vec!["Member since", view.member_since.as_str()]);
    table.add_row(vec!["Last login", view.last_login.as_str()]);
    println!("{}", table);
}
