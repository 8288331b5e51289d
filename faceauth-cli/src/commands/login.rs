//! Login command - password or face login

use anyhow::{bail, Result};
use colored::Colorize;

use faceauth_core::services::{EntryPoint, LoadOutcome, LogEvent, LoginPage, LoginTab};
use faceauth_core::ContextOptions;

use super::{get_context, get_logger, log_event, password_or_prompt, terminal_env, value_or_prompt};
use crate::shell::capture_with_prompt;

pub fn run(
    options: &ContextOptions,
    face: bool,
    username: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context(options)?;
    let logger = get_logger(EntryPoint::Cli);
    log_event(&logger, LogEvent::new("command_executed").with_command("login"));

    let (env, navigator) = terminal_env(&ctx, json);
    let mut page = LoginPage::new(env);

    if page.load() == LoadOutcome::Redirected {
        let current = ctx.session.get_user()?.map(|u| u.username).unwrap_or_default();
        if json {
            println!("{}", serde_json::json!({ "already_signed_in": current }));
        } else {
            println!("Already signed in as {}. Run 'faceauth logout' first.", current.bold());
        }
        return Ok(());
    }

    let method = if face { "face" } else { "password" };
    let result = if face {
        page.select_tab(LoginTab::Face);
        let username = value_or_prompt(username, "Username")?;
        page.set_face_username(username);
        let image = capture_with_prompt(&mut page, super::is_interactive() && !json, json)?;
        let outcome = page.submit_face();
        if let Ok(user) = &outcome {
            log_event(
                &logger,
                LogEvent::new("login_succeeded")
                    .with_command("login")
                    .with_auth_method(method)
                    .with_image(&image),
            );
            tracing::debug!(user_id = ?user.id, "face login complete");
        }
        outcome
    } else {
        let username = value_or_prompt(username, "Username")?;
        let password = password_or_prompt(password, "Password")?;
        let outcome = page.submit_password(&username, &password);
        if outcome.is_ok() {
            log_event(
                &logger,
                LogEvent::new("login_succeeded")
                    .with_command("login")
                    .with_auth_method(method),
            );
        }
        outcome
    };

    match result {
        Ok(user) => {
            // The dashboard is a separate command here; drop the redirect
            let _ = navigator.take();
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("Signed in as {} <{}>", user.username.bold(), user.email);
            }
            Ok(())
        }
        Err(e) => {
            let mut event = LogEvent::new("login_failed")
                .with_command("login")
                .with_auth_method(method)
                .with_error(e.to_string());
            if let Some(status) = gateway_status(&e) {
                event = event.with_error_details(format!("status {}", status));
            }
            log_event(&logger, event);
            if json {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            }
            bail!("Login failed")
        }
    }
}

pub(crate) fn gateway_status(error: &faceauth_core::Error) -> Option<u16> {
    match error {
        faceauth_core::Error::Gateway(e) => e.status(),
        _ => None,
    }
}
