//! Local session store
//!
//! The signed-in user is cached as one JSON record under `currentUser`.
//! There is no expiry; logging out is the only way to end a session.

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::User;
use crate::ports::KeyValueStore;

pub const SESSION_KEY: &str = "currentUser";

/// What is stored under the session key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Absent,
    Present(User),
    /// Present but not a user record; the parse error is kept
    Corrupted(String),
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the session with `user`
    pub fn set_user(&self, user: &User) -> Result<()> {
        let record = serde_json::to_string(user)?;
        self.store.set(SESSION_KEY, &record)?;
        tracing::debug!(user_id = ?user.id, "session stored");
        Ok(())
    }

    /// The cached user. A corrupted record reads as no session.
    pub fn get_user(&self) -> Result<Option<User>> {
        match self.inspect()? {
            SessionState::Present(user) => Ok(Some(user)),
            SessionState::Absent => Ok(None),
            SessionState::Corrupted(reason) => {
                tracing::warn!(%reason, "ignoring corrupted session record");
                Ok(None)
            }
        }
    }

    pub fn remove_user(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)?;
        tracing::debug!("session removed");
        Ok(())
    }

    pub fn inspect(&self) -> Result<SessionState> {
        let Some(record) = self.store.get(SESSION_KEY)? else {
            return Ok(SessionState::Absent);
        };
        Ok(match serde_json::from_str::<User>(&record) {
            Ok(user) => SessionState::Present(user),
            Err(e) => SessionState::Corrupted(e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_store::MemoryStore;

    fn store() -> (Arc<MemoryStore>, SessionStore) {
        let kv = Arc::new(MemoryStore::new());
        (kv.clone(), SessionStore::new(kv))
    }

    #[test]
    fn test_round_trip_and_remove() {
        let (_, session) = store();
        let user = User::new(7, "alice", "a@x.com");

        session.set_user(&user).unwrap();
        assert_eq!(session.get_user().unwrap(), Some(user));

        session.remove_user().unwrap();
        assert_eq!(session.get_user().unwrap(), None);
        assert_eq!(session.inspect().unwrap(), SessionState::Absent);
    }

    #[test]
    fn test_login_overwrites_previous_user() {
        let (_, session) = store();
        session.set_user(&User::new(1, "alice", "a@x.com")).unwrap();
        session.set_user(&User::new(2, "bob", "b@x.com")).unwrap();
        assert_eq!(session.get_user().unwrap().unwrap().username, "bob");
    }

    #[test]
    fn test_corrupted_record_reads_as_none() {
        let (kv, session) = store();
        kv.set(SESSION_KEY, "{not json").unwrap();

        assert_eq!(session.get_user().unwrap(), None);
        assert!(matches!(session.inspect().unwrap(), SessionState::Corrupted(_)));
    }
}
