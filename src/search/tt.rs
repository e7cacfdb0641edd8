//! Transposition cache for one top-level search
//!
//! Results are keyed by (position hash, remaining depth, side to move).
//! Node values depend on the remaining depth, so a cached shallow result is
//! never served for a deeper query; the cache is cleared before every
//! top-level search.
//!
//! # Example
//!
//! ```
//! use gomoku::board::PositionHash;
//! use gomoku::search::{CacheKey, EntryType, TranspositionCache};
//!
//! let mut tt = TranspositionCache::new();
//! let key = CacheKey { hash: PositionHash(0x1234), depth: 2, maximizing: true };
//!
//! tt.store(key, 100, EntryType::Exact);
//! assert_eq!(tt.probe(key, -1000, 1000), Some(100));
//! ```

use std::collections::HashMap;

use crate::board::PositionHash;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - every child was searched inside the window
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub hash: PositionHash,
    pub depth: u8,
    pub maximizing: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CacheEntry {
    pub score: i32,
    pub entry_type: EntryType,
}

/// Cache usage statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub probes: u64,
}

impl CacheStats {
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64 * 100.0
        }
    }
}

#[derive(Debug, Default)]
pub struct TranspositionCache {
    entries: HashMap<CacheKey, CacheEntry>,
    hits: u64,
    probes: u64,
}

impl TranspositionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached score usable inside the (alpha, beta) window, if any.
    ///
    /// Bound entries are only returned when they already decide the node:
    /// a lower bound at or above beta, an upper bound at or below alpha.
    pub fn probe(&mut self, key: CacheKey, alpha: i32, beta: i32) -> Option<i32> {
        self.probes += 1;
        let entry = self.entries.get(&key)?;
        let usable = match entry.entry_type {
            EntryType::Exact => true,
            EntryType::LowerBound => entry.score >= beta,
            EntryType::UpperBound => entry.score <= alpha,
        };
        if usable {
            self.hits += 1;
            Some(entry.score)
        } else {
            None
        }
    }

    pub fn store(&mut self, key: CacheKey, score: i32, entry_type: EntryType) {
        self.entries.insert(key, CacheEntry { score, entry_type });
    }

    /// Clear all entries and counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.probes = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            probes: self.probes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(hash: u64, depth: u8, maximizing: bool) -> CacheKey {
        CacheKey {
            hash: PositionHash(hash),
            depth,
            maximizing,
        }
    }

    #[test]
    fn test_store_and_probe_exact() {
        let mut tt = TranspositionCache::new();
        tt.store(key(1, 3, true), 42, EntryType::Exact);
        assert_eq!(tt.probe(key(1, 3, true), -100, 100), Some(42));
        assert_eq!(tt.stats().hits, 1);
    }

    #[test]
    fn test_depth_and_side_are_part_of_key() {
        let mut tt = TranspositionCache::new();
        tt.store(key(1, 2, true), 42, EntryType::Exact);
        assert_eq!(tt.probe(key(1, 3, true), -100, 100), None);
        assert_eq!(tt.probe(key(1, 2, false), -100, 100), None);
    }

    #[test]
    fn test_bounds_respect_window() {
        let mut tt = TranspositionCache::new();
        tt.store(key(7, 1, true), 50, EntryType::LowerBound);
        assert_eq!(tt.probe(key(7, 1, true), 0, 40), Some(50));
        assert_eq!(tt.probe(key(7, 1, true), 0, 60), None);

        tt.store(key(8, 1, false), -20, EntryType::UpperBound);
        assert_eq!(tt.probe(key(8, 1, false), -10, 100), Some(-20));
        assert_eq!(tt.probe(key(8, 1, false), -30, 100), None);
    }

    #[test]
    fn test_clear() {
        let mut tt = TranspositionCache::new();
        tt.store(key(1, 1, true), 1, EntryType::Exact);
        assert_eq!(tt.len(), 1);
        tt.clear();
        assert!(tt.is_empty());
        assert_eq!(tt.stats().probes, 0);
    }

    #[test]
    fn test_hit_rate() {
        let mut tt = TranspositionCache::new();
        tt.store(key(1, 1, true), 1, EntryType::Exact);
        let _ = tt.probe(key(1, 1, true), -10, 10);
        let _ = tt.probe(key(2, 1, true), -10, 10);
        assert!((tt.stats().hit_rate() - 50.0).abs() < f64::EPSILON);
    }
}
