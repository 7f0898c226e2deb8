//! Idempotent attachment of third-party embeds.
//!
//! An ad slot (or the network's loader script) must be attached at most
//! once per page lifetime, and released when that lifetime ends so a later
//! page can attach it again. [`EmbedRegistry::acquire`] hands out an
//! [`EmbedGuard`] for the first attachment only; dropping the guard
//! releases it.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

/// Tracks which embeds are currently attached.
#[derive(Debug, Clone, Default)]
pub struct EmbedRegistry {
    attached: Arc<Mutex<HashSet<String>>>,
}

impl EmbedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `id` unless it is already attached.
    ///
    /// Returns `None` if another guard for `id` is alive.
    pub fn acquire(&self, id: &str) -> Option<EmbedGuard> {
        let mut attached = self.attached.lock();
        if !attached.insert(id.to_string()) {
            tracing::trace!(embed = %id, "embed already attached");
            return None;
        }
        Some(EmbedGuard {
            id: id.to_string(),
            attached: Arc::clone(&self.attached),
        })
    }

    pub fn is_attached(&self, id: &str) -> bool {
        self.attached.lock().contains(id)
    }

    /// Number of embeds currently attached.
    pub fn len(&self) -> usize {
        self.attached.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Proof that an embed is attached. Releases it on drop.
#[derive(Debug)]
pub struct EmbedGuard {
    id: String,
    attached: Arc<Mutex<HashSet<String>>>,
}

impl EmbedGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for EmbedGuard {
    fn drop(&mut self) {
        self.attached.lock().remove(&self.id);
        tracing::trace!(embed = %self.id, "embed released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_noop() {
        let registry = EmbedRegistry::new();
        let guard = registry.acquire("feed-top");
        assert!(guard.is_some());
        assert!(registry.acquire("feed-top").is_none());
        assert!(registry.is_attached("feed-top"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_release_on_drop() {
        let registry = EmbedRegistry::new();
        {
            let _guard = registry.acquire("loader").unwrap();
            assert!(registry.is_attached("loader"));
        }
        assert!(!registry.is_attached("loader"));
        assert!(registry.is_empty());
        assert!(registry.acquire("loader").is_some());
    }

    #[test]
    fn test_independent_ids() {
        let registry = EmbedRegistry::new();
        let a = registry.acquire("slot-1").unwrap();
        let b = registry.acquire("slot-2").unwrap();
        assert_eq!(a.id(), "slot-1");
        assert_eq!(b.id(), "slot-2");
        assert_eq!(registry.len(), 2);
        drop(a);
        assert!(!registry.is_attached("slot-1"));
        assert!(registry.is_attached("slot-2"));
    }

    #[test]
    fn test_clones_share_state() {
        let registry = EmbedRegistry::new();
        let other = registry.clone();
        let _guard = registry.acquire("x").unwrap();
        assert!(other.acquire("x").is_none());
    }
}
