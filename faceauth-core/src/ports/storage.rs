//! Client-local key/value storage port

use crate::domain::result::Result;

/// String key/value storage with local-storage semantics
///
/// Single-threaded UI access only; implementations need no cross-call
/// locking beyond what `Send + Sync` requires.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
