//! Register command - create an account with a face photo

use anyhow::{bail, Result};
use colored::Colorize;

use faceauth_core::domain::RegistrationField;
use faceauth_core::services::{EntryPoint, LoadOutcome, LogEvent, RegisterPage};
use faceauth_core::ContextOptions;

use super::{get_context, get_logger, log_event, password_or_prompt, terminal_env, value_or_prompt};
use crate::output;
use crate::shell::capture_with_prompt;

pub struct RegisterArgs {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub json: bool,
}

pub fn run(options: &ContextOptions, args: RegisterArgs) -> Result<()> {
    let ctx = get_context(options)?;
    let logger = get_logger(EntryPoint::Cli);
    log_event(&logger, LogEvent::new("command_executed").with_command("register"));

    let (env, navigator) = terminal_env(&ctx, args.json);
    let mut page = RegisterPage::new(env);

    if page.load() == LoadOutcome::Redirected {
        bail!("Already signed in. Run 'faceauth logout' before registering a new account.");
    }

    fill_form(&mut page, args.username, args.email, args.password)?;

    let image = capture_with_prompt(&mut page, super::is_interactive() && !args.json, args.json)?;

    match page.submit() {
        Ok(user) => {
            log_event(
                &logger,
                LogEvent::new("registration_succeeded")
                    .with_command("register")
                    .with_image(&image),
            );
            let _ = navigator.take();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("Run {} to sign in.", "faceauth login".bold());
            }
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("registration_failed")
                    .with_command("register")
                    .with_error(e.to_string()),
            );
            if args.json {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            }
            bail!("Registration failed")
        }
    }
}

/// Prompt for anything not given on the command line
pub(crate) fn fill_form(
    page: &mut RegisterPage,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    page.set_field(RegistrationField::Username, value_or_prompt(username, "Username")?);
    page.set_field(RegistrationField::Email, value_or_prompt(email, "Email")?);

    let from_flag = password.is_some();
    let password = password_or_prompt(password, "Password")?;
    page.set_field(RegistrationField::Password, password.clone());

    // A password given non-interactively is its own confirmation
    let confirm = if from_flag || std::env::var("FACEAUTH_PASSWORD").is_ok() {
        password
    } else {
        password_or_prompt(None, "Confirm password")?
    };
    page.set_field(RegistrationField::ConfirmPassword, confirm);

    if let Some(hint) = page.confirm_password_hint() {
        output::warning(hint);
    }
    Ok(())
}
