//! User domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account as reported by the backend
///
/// The client never holds the password; it only travels in a registration
/// request. Some login responses omit the id, so it is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            username: username.into(),
            email: email.into(),
            is_active: None,
            created_at: None,
            last_login: None,
        }
    }

    /// First character of the username, uppercased, for the avatar
    pub fn initial(&self) -> String {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

/// Backend timestamps arrive either as RFC 3339 or as naive ISO-8601 (UTC).
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        parse(&raw).map(Some).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_user_creation() {
        let user = User::new(7, "alice", "a@x.com");
        assert_eq!(user.id, Some(7));
        assert_eq!(user.username, "alice");
        assert_eq!(user.initial(), "A");
    }

    #[test]
    fn test_initial_of_empty_username() {
        let user = User::new(1, "", "");
        assert_eq!(user.initial(), "");
    }

    #[test]
    fn test_parses_naive_backend_timestamp() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"username":"bob","email":"b@x.com","is_active":true,
                "created_at":"2024-01-15T14:30:00.123456"}"#,
        )
        .unwrap();
        let created = user.created_at.unwrap();
        assert_eq!(created.date_naive(), Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap().date_naive());
        assert!(user.last_login.is_none());
    }

    #[test]
    fn test_missing_email_defaults_to_empty() {
        let user: User = serde_json::from_str(r#"{"id":3,"username":"carol"}"#).unwrap();
        assert_eq!(user.email, "");
    }

    #[test]
    fn test_user_without_id() {
        let user: User = serde_json::from_str(r#"{"username":"alice","email":"a@x.com"}"#).unwrap();
        assert_eq!(user.id, None);
        assert_eq!(user.username, "alice");

        let stored = serde_json::to_string(&user).unwrap();
        assert!(!stored.contains("\"id\""));
        assert_eq!(serde_json::from_str::<User>(&stored).unwrap(), user);
    }
}
