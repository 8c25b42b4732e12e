//! Snapshot cache for gathered Ethereum data.
//!
//! This module provides a cache layer that decouples Prometheus scrapes from
//! the refresh task that talks to the upstream APIs.
//!
//! ## Problem
//!
//! A gather cycle takes several network round trips and can fail entirely.
//! Serving scrapes straight from the upstream APIs would make every scrape as
//! slow and as flaky as the slowest API, and concurrent scrapes would multiply
//! the load on rate-limited third parties.
//!
//! ## Solution
//!
//! A background task periodically gathers fresh data and stores it here as one
//! complete snapshot. Scrapes read the latest snapshot under a short `RwLock`
//! and never wait on network I/O. When a refresh fails, the previous snapshot
//! simply stays in place.
//!
//! ```text
//! Refresh task                      Scrapes
//! ────────────                      ───────
//!     │                                │
//!     │ gather_info()                  │
//!     │ (network I/O, can fail)        │
//!     └────────────────────────────────┤
//!                              ┌───────▼───────┐
//!                              │ SnapshotCache │
//!                              │ (RwLock, fast)│
//!                              └───────┬───────┘
//!                          ┌───────────┴───────────┐
//!                    ┌─────▼─────┐       ┌─────────▼─────────┐
//!                    │ /metrics  │       │ /metrics/balances │
//!                    └───────────┘       └───────────────────┘
//! ```

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::info::EthereumInfo;

/// Point-in-time copy of the gathered Ethereum data.
///
/// The data itself is shared behind an [`Arc`], so cloning a snapshot is
/// cheap no matter how many balances it carries.
#[derive(Debug, Clone, Default)]
pub struct InfoSnapshot {
    pub timestamp: Option<Instant>,
    pub info: Arc<EthereumInfo>,
}

impl InfoSnapshot {
    /// Check if this snapshot is stale (older than the given duration)
    pub fn is_stale(&self, max_age: Duration) -> bool {
        match self.timestamp {
            None => true,
            Some(ts) => ts.elapsed() > max_age,
        }
    }

    /// Get the age of this snapshot
    pub fn age(&self) -> Option<Duration> {
        self.timestamp.map(|ts| ts.elapsed())
    }
}

/// A cache that holds the most recent successful gather result.
#[derive(Debug)]
pub struct SnapshotCache {
    snapshot: RwLock<InfoSnapshot>,
}

impl SnapshotCache {
    /// Create an empty cache.
    ///
    /// Until the first [`update`](Self::update) the snapshot has no timestamp
    /// and zeroed data.
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(InfoSnapshot::default()),
        }
    }

    /// Get the current snapshot.
    ///
    /// This is a fast read that never touches the network. The returned
    /// snapshot may be up to one refresh interval old, plus however long the
    /// upstream APIs have been failing.
    pub fn get_snapshot(&self) -> InfoSnapshot {
        self.snapshot.read().unwrap().clone()
    }

    /// Replace the cached snapshot with freshly gathered data.
    ///
    /// The replacement is atomic: a concurrent [`get_snapshot`](Self::get_snapshot)
    /// observes either the previous snapshot or this one in full, never a mix
    /// of the two.
    pub fn update(&self, info: EthereumInfo) {
        let new_snapshot = InfoSnapshot {
            timestamp: Some(Instant::now()),
            info: Arc::new(info),
        };
        *self.snapshot.write().unwrap() = new_snapshot;
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{Balance, BalanceLocation, NetworkStats};

    fn sample_info(seed: u64) -> EthereumInfo {
        let s = seed as f64;
        EthereumInfo::from_parts(
            NetworkStats {
                block_time_secs: 13.0 + s,
                block_reward: 2.0 + s,
                block_reward_24h: 2.1 + s,
                block_reward_3d: 2.2 + s,
                block_reward_7d: 2.3 + s,
                last_block: 1_000_000 + seed,
                difficulty: 1e15 + s,
                difficulty_24h: 2e15 + s,
                difficulty_3d: 3e15 + s,
                difficulty_7d: 4e15 + s,
                network_hashrate: 5e14 + s,
            },
            1000.0 + s,
            vec![Balance {
                address: format!("0x{seed:040x}"),
                location: BalanceLocation::Wallet,
                amount: s,
            }],
        )
    }

    #[test]
    fn test_cache_starts_uninitialized() {
        let cache = SnapshotCache::new();

        let snapshot = cache.get_snapshot();
        assert!(snapshot.timestamp.is_none());
        assert!(snapshot.age().is_none());
        assert!(snapshot.is_stale(Duration::from_secs(3600)));
        assert_eq!(*snapshot.info, EthereumInfo::default());
    }

    #[test]
    fn test_update_replaces_the_whole_snapshot() {
        let cache = SnapshotCache::new();

        cache.update(sample_info(1));
        let snapshot = cache.get_snapshot();
        assert!(snapshot.timestamp.is_some());
        assert!(snapshot.age().unwrap() < Duration::from_millis(100));
        assert_eq!(*snapshot.info, sample_info(1));

        // A later update with no balances must not leave old balances behind.
        let empty = EthereumInfo::from_parts(NetworkStats::default(), 900.0, vec![]);
        cache.update(empty.clone());
        let snapshot = cache.get_snapshot();
        assert_eq!(*snapshot.info, empty);
        assert!(snapshot.info.balances.is_empty());
    }

    /// Verifies that scrapes can never observe a half-written snapshot.
    ///
    /// A writer thread keeps alternating between two complete snapshots while
    /// reader threads hammer `get_snapshot`. Every observed snapshot must be
    /// exactly one of the two, never a mix of fields from both.
    #[test]
    fn test_concurrent_reads_never_tear() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let cache = Arc::new(SnapshotCache::new());
        let first = sample_info(1);
        let second = sample_info(2);
        cache.update(first.clone());

        let stop = Arc::new(AtomicBool::new(false));

        let writer = {
            let cache = Arc::clone(&cache);
            let stop = Arc::clone(&stop);
            let (first, second) = (first.clone(), second.clone());
            std::thread::spawn(move || {
                let mut flip = false;
                while !stop.load(Ordering::SeqCst) {
                    let info = if flip { second.clone() } else { first.clone() };
                    cache.update(info);
                    flip = !flip;
                }
            })
        };

        let mut readers = vec![];
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let (first, second) = (first.clone(), second.clone());
            readers.push(std::thread::spawn(move || {
                let start = Instant::now();
                while start.elapsed() < Duration::from_millis(100) {
                    let snapshot = cache.get_snapshot();
                    assert!(
                        *snapshot.info == first || *snapshot.info == second,
                        "observed a snapshot mixing two updates: {:?}",
                        snapshot.info
                    );
                }
            }));
        }

        for reader in readers {
            reader.join().unwrap();
        }
        stop.store(true, Ordering::SeqCst);
        writer.join().unwrap();
    }
}
