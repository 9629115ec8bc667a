//! Round-robin API key rotation.

use crate::config::mask_key;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Ordered set of API keys with a shared rotation cursor.
///
/// Every call to [`CredentialPool::next`] advances the cursor once, whether or
/// not the request that uses the key later succeeds.
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    /// Create a pool; blank keys are dropped.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(Into::into)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            keys,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Take the next key in rotation, or `None` for an empty pool.
    pub fn next(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        Some(&self.keys[index])
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of keys handed out so far.
    pub fn rotations(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("keys", &self.keys.iter().map(|k| mask_key(k)).collect::<Vec<_>>())
            .field("rotations", &self.rotations())
            .finish()
    }
}
