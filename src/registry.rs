// registry.rs - Found-Host Registry and Scan Counters
// Purpose: Shared mutable scan state: which hosts already yielded an archive,
//          and monotonically increasing progress counters

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Hosts with a confirmed finding. Entries are added once and never removed.
#[derive(Debug, Default)]
pub struct FoundHostRegistry {
    hosts: Mutex<HashSet<String>>,
}

impl FoundHostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_found(&self, host: &str) -> bool {
        match self.hosts.lock() {
            Ok(hosts) => hosts.contains(host),
            Err(poisoned) => poisoned.into_inner().contains(host),
        }
    }

    /// Atomic check-and-set. Returns true only for the caller that performed
    /// the absent → found transition.
    pub fn try_mark_found(&self, host: &str) -> bool {
        let mut hosts = match self.hosts.lock() {
            Ok(hosts) => hosts,
            Err(poisoned) => poisoned.into_inner(),
        };
        hosts.insert(host.to_string())
    }
}

/// Lock-free progress counters shared by all workers
#[derive(Debug, Default)]
pub struct ScanCounters {
    completed: AtomicU64,
    hosts: AtomicU64,
    found: AtomicU64,
    errors: AtomicU64,
}

impl ScanCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// One call per candidate URL, whatever the outcome
    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_host(&self) {
        self.hosts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn hosts(&self) -> u64 {
        self.hosts.load(Ordering::Relaxed)
    }

    pub fn found(&self) -> u64 {
        self.found.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_try_mark_found_once() {
        let registry = FoundHostRegistry::new();
        assert!(!registry.is_found("a.com"));
        assert!(registry.try_mark_found("a.com"));
        assert!(!registry.try_mark_found("a.com"));
        assert!(registry.is_found("a.com"));
        assert!(!registry.is_found("b.com"));
    }

    #[test]
    fn test_single_winner_across_threads() {
        let registry = Arc::new(FoundHostRegistry::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.try_mark_found("a.com"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_counters() {
        let counters = ScanCounters::new();
        counters.record_completed();
        counters.record_completed();
        counters.record_found();
        counters.record_host();
        assert_eq!(counters.completed(), 2);
        assert_eq!(counters.found(), 1);
        assert_eq!(counters.hosts(), 1);
        assert_eq!(counters.errors(), 0);
    }
}
