//! Dashboard page controller

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{Page, User};
use crate::services::control::Control;
use crate::services::page::PageEnv;
use crate::services::status::StatusReporter;

const DATE_FORMAT: &str = "%B %-d, %Y at %H:%M";

/// Profile card contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub username: String,
    pub email: String,
    pub initial: String,
    pub member_since: String,
    pub last_login: String,
}

impl DashboardView {
    pub fn from_user(user: &User) -> Self {
        Self::at(user, Utc::now())
    }

    /// Build the view with `now` standing in for a missing last login
    pub fn at(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            initial: user.initial(),
            member_since: user
                .created_at
                .map(format_date)
                .unwrap_or_else(|| "Unknown".to_string()),
            last_login: format_date(user.last_login.unwrap_or(now)),
        }
    }
}

pub fn format_date(date: DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub struct DashboardPage {
    env: PageEnv,
    status: StatusReporter,
    user: Option<User>,
    refresh_control: Control,
}

impl DashboardPage {
    pub fn new(env: PageEnv) -> Self {
        let status = env.status_reporter();
        Self {
            env,
            status,
            user: None,
            refresh_control: Control::new("Refresh"),
        }
    }

    /// Show the signed-in user, or bounce to the login page
    pub fn load(&mut self) -> Option<DashboardView> {
        match self.env.signed_in_user() {
            Some(user) => {
                let view = DashboardView::from_user(&user);
                self.user = Some(user);
                Some(view)
            }
            None => {
                self.env.navigator.navigate(Page::Login, Duration::ZERO);
                None
            }
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Re-fetch the user record and overwrite the session with it
    pub fn refresh(&mut self) -> Result<DashboardView> {
        let Some(user) = self.user.as_ref() else {
            self.env.navigator.navigate(Page::Login, Duration::ZERO);
            return Err(Error::storage("No active session"));
        };
        let Some(id) = user.id else {
            tracing::info!(username = %user.username, "profile refresh skipped, user has no id");
            let err = Error::MissingUserId;
            self.status.error(err.to_string());
            return Err(err);
        };

        let fetched = {
            let _loading = self.refresh_control.begin()?;
            self.env.gateway.get_user(id)
        };

        let user = match fetched {
            Ok(user) => user,
            Err(e) => {
                tracing::info!(user_id = id, error = %e, "profile refresh failed");
                self.status.error(e.to_string());
                return Err(e.into());
            }
        };

        if let Err(e) = self.env.session.set_user(&user) {
            self.status.error(e.to_string());
            return Err(e);
        }

        let view = DashboardView::from_user(&user);
        self.user = Some(user);
        Ok(view)
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Err(e) = self.env.session.remove_user() {
            self.status.error(e.to_string());
            return Err(e);
        }
        if let Some(user) = self.user.take() {
            tracing::info!(username = %user.username, "logged out");
        }
        self.env.navigator.navigate(Page::Login, Duration::ZERO);
        Ok(())
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusReporter {
        &mut self.status
    }

    pub fn refresh_control(&self) -> &Control {
        &self.refresh_control
    }
}
