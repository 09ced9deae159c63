use std::collections::HashMap;

use crate::types::{ProxyId, Seconds};

/// Per-proxy suppression window with timestamp expiry.
///
/// Entries are purged at tick start and checked on access, so nothing needs
/// to be scheduled.
#[derive(Debug, Default)]
pub struct RecencySet {
    window: Seconds,
    expiries: HashMap<ProxyId, Seconds>,
}

impl RecencySet {
    pub fn new(window: Seconds) -> Self {
        Self {
            window,
            expiries: HashMap::new(),
        }
    }

    pub fn contains(&self, id: ProxyId, now: Seconds) -> bool {
        self.expiries.get(&id).is_some_and(|&expiry| now < expiry)
    }

    /// Record `id` unless it is already present and unexpired. Returns true when recorded.
    pub fn insert(&mut self, id: ProxyId, now: Seconds) -> bool {
        if self.contains(id, now) {
            return false;
        }
        self.expiries.insert(id, now + self.window);
        true
    }

    /// Drop every entry whose expiry has passed.
    pub fn purge(&mut self, now: Seconds) {
        self.expiries.retain(|_, expiry| now < *expiry);
    }

    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_suppresses_until_expiry() {
        let mut r = RecencySet::new(0.5);
        assert!(r.insert(ProxyId(1), 0.0));
        assert!(!r.insert(ProxyId(1), 0.25));
        assert!(!r.insert(ProxyId(1), 0.49));
        assert!(r.insert(ProxyId(1), 0.5));
        assert!(r.contains(ProxyId(1), 0.6));
    }

    #[test]
    fn test_entries_are_independent() {
        let mut r = RecencySet::new(0.5);
        assert!(r.insert(ProxyId(1), 0.0));
        assert!(r.insert(ProxyId(2), 0.1));
        assert!(!r.contains(ProxyId(3), 0.1));
    }

    #[test]
    fn test_purge_drops_only_expired() {
        let mut r = RecencySet::new(0.5);
        r.insert(ProxyId(1), 0.0);
        r.insert(ProxyId(2), 0.3);
        r.purge(0.6);
        assert_eq!(r.len(), 1);
        assert!(r.contains(ProxyId(2), 0.6));
        r.clear();
        assert!(r.is_empty());
    }
}
