//! App command - the interactive login / register / dashboard loop
//!
//! Each page is a fresh controller; it is dropped (releasing the camera)
//! as soon as it asks to navigate elsewhere.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password, Select};

use faceauth_core::domain::RegistrationField;
use faceauth_core::services::{
    DashboardPage, EntryPoint, LoadOutcome, LogEvent, LoggingService, LoginPage, LoginTab, PageEnv,
    RegisterPage,
};
use faceauth_core::{ContextOptions, Page, User};

use super::{get_context, get_logger, log_event, terminal_env};
use crate::output;
use crate::shell::{capture_with_prompt, follow, TerminalNavigator};

/// What a page loop ended with
enum Exit {
    Navigate(Page),
    Quit,
}

pub fn run(options: &ContextOptions) -> Result<()> {
    let ctx = get_context(options)?;
    let logger = get_logger(EntryPoint::Interactive);
    let (env, navigator) = terminal_env(&ctx, false);

    println!("{} {}", "faceauth".bold(), ctx.config.api.base_url.dimmed());

    let mut page = Page::Login;
    loop {
        log_event(&logger, LogEvent::new("page_opened").with_page(page.as_str()));
        let exit = match page {
            Page::Login => login_page(env.clone(), &navigator, &logger)?,
            Page::Register => register_page(env.clone(), &navigator, &logger)?,
            Page::Dashboard => dashboard_page(env.clone(), &navigator, &logger)?,
        };
        match exit {
            Exit::Navigate(next) => page = next,
            Exit::Quit => break,
        }
    }
    Ok(())
}

fn pending(navigator: &TerminalNavigator) -> Option<Exit> {
    navigator
        .take()
        .map(|navigation| Exit::Navigate(follow(navigation, false)))
}

fn choose(prompt: &str, items: &[&str]) -> Result<usize> {
    Ok(Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()?)
}

fn login_page(env: PageEnv, navigator: &TerminalNavigator, logger: &Option<LoggingService>) -> Result<Exit> {
    let mut page = LoginPage::new(env);
    if page.load() == LoadOutcome::Redirected {
        return Ok(pending(navigator).unwrap_or(Exit::Quit));
    }

    println!();
    println!("{}", "Login".bold());

    loop {
        page.status_mut().tick();
        let items = [
            "Login with password",
            "Login with face",
            "Create an account",
            "Quit",
        ];
        match choose("Choose", &items)? {
            0 => {
                page.select_tab(LoginTab::Password);
                let username: String = Input::new().with_prompt("Username").allow_empty(true).interact_text()?;
                let password = Password::new().with_prompt("Password").allow_empty_password(true).interact()?;
                match page.submit_password(&username, &password) {
                    Ok(_) => log_event(
                        logger,
                        LogEvent::new("login_succeeded")
                            .with_page("login")
                            .with_auth_method("password"),
                    ),
                    Err(e) => log_event(
                        logger,
                        LogEvent::new("login_failed")
                            .with_page("login")
                            .with_auth_method("password")
                            .with_error(e.to_string()),
                    ),
                }
            }
            1 => {
                page.select_tab(LoginTab::Face);
                let username: String = Input::new().with_prompt("Username").allow_empty(true).interact_text()?;
                page.set_face_username(username);
                match capture_with_prompt(&mut page, true, false) {
                    Ok(image) => {
                        let event = LogEvent::new("face_login_attempted")
                            .with_page("login")
                            .with_auth_method("face")
                            .with_image(&image);
                        match page.submit_face() {
                            Ok(_) => log_event(logger, event),
                            Err(e) => log_event(logger, event.with_error(e.to_string())),
                        }
                    }
                    Err(e) => output::error(&e.to_string()),
                }
            }
            2 => page.go_to_register(),
            _ => return Ok(Exit::Quit),
        }

        if let Some(exit) = pending(navigator) {
            return Ok(exit);
        }
    }
}

fn register_page(env: PageEnv, navigator: &TerminalNavigator, logger: &Option<LoggingService>) -> Result<Exit> {
    let mut page = RegisterPage::new(env);
    if page.load() == LoadOutcome::Redirected {
        return Ok(pending(navigator).unwrap_or(Exit::Quit));
    }

    println!();
    println!("{}", "Create an account".bold());

    loop {
        page.status_mut().tick();
        let photo = if page.camera().captured_image().is_some() {
            "Retake photo"
        } else {
            "Take photo"
        };
        let submit = if page.submit_control().is_enabled() {
            "Register"
        } else {
            "Register (incomplete)"
        };
        let items = ["Edit details", photo, submit, "Back to login", "Quit"];
        match choose("Choose", &items)? {
            0 => edit_details(&mut page)?,
            1 => {
                if page.camera().captured_image().is_some() {
                    if let Err(e) = page.retake() {
                        output::error(&e.to_string());
                        continue;
                    }
                    // retake leaves the camera running; capture from it
                    match page.capture_photo() {
                        Some(_) => output::success("Photo retaken"),
                        None => output::error("Could not capture a photo"),
                    }
                } else if let Err(e) = capture_with_prompt(&mut page, true, false) {
                    output::error(&e.to_string());
                }
            }
            2 => log_event(logger, registration_event(&page.submit())),
            3 => page.go_to_login(),
            _ => return Ok(Exit::Quit),
        }

        if let Some(exit) = pending(navigator) {
            return Ok(exit);
        }
    }
}

/// Interactive events carry the page, not a command
fn registration_event(outcome: &faceauth_core::domain::result::Result<User>) -> LogEvent {
    match outcome {
        Ok(_) => LogEvent::new("registration_succeeded").with_page("register"),
        Err(e) => LogEvent::new("registration_failed")
            .with_page("register")
            .with_error(e.to_string()),
    }
}

fn edit_details(page: &mut RegisterPage) -> Result<()> {
    let form = page.form().clone();
    let username: String = Input::new()
        .with_prompt("Username")
        .with_initial_text(form.username)
        .allow_empty(true)
        .interact_text()?;
    page.set_field(RegistrationField::Username, username);

    let email: String = Input::new()
        .with_prompt("Email")
        .with_initial_text(form.email)
        .allow_empty(true)
        .interact_text()?;
    page.set_field(RegistrationField::Email, email);

    let password = Password::new().with_prompt("Password").allow_empty_password(true).interact()?;
    page.set_field(RegistrationField::Password, password);
    let confirm = Password::new()
        .with_prompt("Confirm password")
        .allow_empty_password(true)
        .interact()?;
    page.set_field(RegistrationField::ConfirmPassword, confirm);

    if let Some(hint) = page.confirm_password_hint() {
        output::warning(hint);
    }
    Ok(())
}

fn dashboard_page(env: PageEnv, navigator: &TerminalNavigator, logger: &Option<LoggingService>) -> Result<Exit> {
    let mut page = DashboardPage::new(env);
    let Some(view) = page.load() else {
        return Ok(pending(navigator).unwrap_or(Exit::Quit));
    };

    println!();
    super::whoami::print_view(&view);

    loop {
        page.status_mut().tick();
        match choose("Choose", &["Refresh profile", "Logout", "Quit"])? {
            0 => {
                if let Ok(view) = page.refresh() {
                    super::whoami::print_view(&view);
                }
            }
            1 => {
                if page.logout().is_ok() {
                    log_event(logger, LogEvent::new("logged_out").with_page("dashboard"));
                }
            }
            _ => return Ok(Exit::Quit),
        }

        if let Some(exit) = pending(navigator) {
            return Ok(exit);
        }
    }
}
