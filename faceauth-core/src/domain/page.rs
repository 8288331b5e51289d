//! Page identifiers understood by the hosting shell

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::result::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Login,
    Register,
    Dashboard,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Login => "login",
            Page::Register => "register",
            Page::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "login" => Ok(Page::Login),
            "register" => Ok(Page::Register),
            "dashboard" => Ok(Page::Dashboard),
            other => Err(Error::config(format!("Unknown page: {}", other))),
        }
    }
}
