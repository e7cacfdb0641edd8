//! Persistent move-preference learning
//!
//! Two records survive between sessions: moves the AI played in games it
//! won (`good_moves.json`) and in games it lost (`bad_moves.json`). Each maps
//! a position hash to the moves played from that position and an integer
//! bonus. The heuristic adds a clamped bias from both records when it
//! pre-scores a move.
//!
//! The store is loaded once when an engine is built, read-only during play,
//! and written back once per finished game.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{info, warn};

use crate::board::{Board, Move, Pos, PositionHash, Stone};
use crate::error::StoreError;

/// Position hash (hex) -> move key (`"row,col"`) -> accumulated bonus
pub type LearningRecord = BTreeMap<String, BTreeMap<String, i32>>;

pub const GOOD_FILE: &str = "good_moves.json";
pub const BAD_FILE: &str = "bad_moves.json";

/// Bonus added per recorded move in a won game
pub const WIN_REWARD: i32 = 10;
/// Penalty added per recorded move in a lost game
pub const LOSS_PENALTY: i32 = -10;

/// Size bounds applied to each record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub ceiling: usize,
    pub floor: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            ceiling: 3000,
            floor: 2000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LearningStore {
    good: LearningRecord,
    bad: LearningRecord,
    dir: Option<PathBuf>,
    limits: StoreLimits,
    bias_clamp: i32,
}

/// Platform data directory for the learning files, if one can be resolved
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gomoku").map(|dirs| dirs.data_dir().to_path_buf())
}

impl LearningStore {
    /// Store that never touches disk
    pub fn in_memory(limits: StoreLimits, bias_clamp: i32) -> Self {
        Self {
            good: LearningRecord::new(),
            bad: LearningRecord::new(),
            dir: None,
            limits,
            bias_clamp,
        }
    }

    /// Load both records from `dir`.
    ///
    /// Missing or malformed files are logged and treated as empty; loading
    /// never fails. Oversized records are trimmed right away.
    pub fn load(dir: Option<PathBuf>, limits: StoreLimits, bias_clamp: i32) -> Self {
        let mut store = Self::in_memory(limits, bias_clamp);
        if let Some(dir) = dir {
            store.good = read_record(&dir.join(GOOD_FILE));
            store.bad = read_record(&dir.join(BAD_FILE));
            store.evict();
            info!(
                "learning store loaded from {} ({} good, {} bad positions)",
                dir.display(),
                store.good.len(),
                store.bad.len()
            );
            store.dir = Some(dir);
        }
        store
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn good(&self) -> &LearningRecord {
        &self.good
    }

    pub fn bad(&self) -> &LearningRecord {
        &self.bad
    }

    /// Clamped bias for playing `pos` from the position `hash`
    pub fn bias(&self, hash: PositionHash, pos: Pos) -> i32 {
        let key = hash.to_string();
        let mv = pos.key();
        let lookup = |record: &LearningRecord| {
            record
                .get(&key)
                .and_then(|moves| moves.get(&mv))
                .copied()
                .unwrap_or(0)
        };
        lookup(&self.good).min(self.bias_clamp) + lookup(&self.bad).max(-self.bias_clamp)
    }

    /// Fold a finished game into the records.
    ///
    /// Only `ai`'s own moves are credited, each keyed by the position it was
    /// played from. A position reached twice in one game counts once. Draws
    /// (`winner == None`) are not recorded. Returns the number of entries
    /// touched.
    pub fn record_game(&mut self, moves: &[Move], ai: Stone, winner: Option<Stone>) -> usize {
        let Some(winner) = winner else {
            return 0;
        };
        let (record, delta) = if winner == ai {
            (&mut self.good, WIN_REWARD)
        } else {
            (&mut self.bad, LOSS_PENALTY)
        };

        let mut replay = Board::new();
        let mut seen = HashSet::new();
        let mut touched = 0;
        for m in moves {
            let hash = replay.hash();
            if m.stone == ai && seen.insert(hash) {
                *record
                    .entry(hash.to_string())
                    .or_default()
                    .entry(m.pos.key())
                    .or_insert(0) += delta;
                touched += 1;
            }
            // Replay every move, recorded or not, so later hashes stay right
            replay.apply(m.pos, m.stone);
        }
        touched
    }

    /// Trim both records to the configured bounds
    pub fn evict(&mut self) {
        evict_record(&mut self.good, self.limits);
        evict_record(&mut self.bad, self.limits);
    }

    /// Write both records back to disk; a no-op for in-memory stores.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.evict();
        let Some(dir) = self.dir.clone() else {
            return Ok(());
        };
        fs::create_dir_all(&dir).map_err(|e| StoreError::CreateDir {
            path: dir.clone(),
            source: e,
        })?;
        write_record(&dir.join(GOOD_FILE), &self.good)?;
        write_record(&dir.join(BAD_FILE), &self.bad)?;
        info!(
            "learning store saved to {} ({} good, {} bad positions)",
            dir.display(),
            self.good.len(),
            self.bad.len()
        );
        Ok(())
    }
}

/// Drop the lowest-sorting keys once `record` exceeds the ceiling
fn evict_record(record: &mut LearningRecord, limits: StoreLimits) {
    if record.len() <= limits.ceiling {
        return;
    }
    while record.len() > limits.floor {
        record.pop_first();
    }
}

fn read_record(path: &Path) -> LearningRecord {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return LearningRecord::new(),
        Err(e) => {
            warn!("could not read {}: {}", path.display(), e);
            return LearningRecord::new();
        }
    };
    match serde_json::from_str(&json) {
        Ok(record) => record,
        Err(e) => {
            warn!("ignoring malformed {}: {}", path.display(), e);
            LearningRecord::new()
        }
    }
}

/// Write through a sibling temp file and rename into place
fn write_record(path: &Path, record: &LearningRecord) -> Result<(), StoreError> {
    let json = serde_json::to_string(record)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| StoreError::Write {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, path).map_err(|e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(row: u8, col: u8, stone: Stone) -> Move {
        Move {
            pos: Pos::new(row, col),
            stone,
        }
    }

    fn sample_game() -> Vec<Move> {
        vec![
            mv(7, 7, Stone::Black),
            mv(7, 8, Stone::White),
            mv(8, 8, Stone::Black),
            mv(6, 6, Stone::White),
        ]
    }

    #[test]
    fn test_record_win_credits_ai_moves_only() {
        let mut store = LearningStore::in_memory(StoreLimits::default(), 100);
        let touched = store.record_game(&sample_game(), Stone::White, Some(Stone::White));
        assert_eq!(touched, 2);
        assert_eq!(store.good().len(), 2);
        assert!(store.bad().is_empty());

        // White's first move was played from the position after 7,7
        let after_first = Board::from_moves(&[(Pos::new(7, 7), Stone::Black)]);
        assert_eq!(store.bias(after_first.hash(), Pos::new(7, 8)), WIN_REWARD);

        // Black's opening move is never credited
        assert_eq!(store.bias(Board::new().hash(), Pos::new(7, 7)), 0);
    }

    #[test]
    fn test_record_loss_goes_to_bad_record() {
        let mut store = LearningStore::in_memory(StoreLimits::default(), 100);
        store.record_game(&sample_game(), Stone::White, Some(Stone::Black));
        assert!(store.good().is_empty());
        assert_eq!(store.bad().len(), 2);

        let after_first = Board::from_moves(&[(Pos::new(7, 7), Stone::Black)]);
        assert_eq!(store.bias(after_first.hash(), Pos::new(7, 8)), LOSS_PENALTY);
    }

    #[test]
    fn test_draw_records_nothing() {
        let mut store = LearningStore::in_memory(StoreLimits::default(), 100);
        assert_eq!(store.record_game(&sample_game(), Stone::White, None), 0);
        assert!(store.good().is_empty());
        assert!(store.bad().is_empty());
    }

    #[test]
    fn test_bias_is_clamped() {
        let mut store = LearningStore::in_memory(StoreLimits::default(), 100);
        for _ in 0..30 {
            store.record_game(&sample_game(), Stone::White, Some(Stone::White));
        }
        let after_first = Board::from_moves(&[(Pos::new(7, 7), Stone::Black)]);
        assert_eq!(store.bias(after_first.hash(), Pos::new(7, 8)), 100);

        for _ in 0..30 {
            store.record_game(&sample_game(), Stone::White, Some(Stone::Black));
        }
        // +100 clamp and -100 clamp cancel
        assert_eq!(store.bias(after_first.hash(), Pos::new(7, 8)), 0);
    }

    #[test]
    fn test_eviction_bounds() {
        let limits = StoreLimits { ceiling: 30, floor: 20 };
        let mut record = LearningRecord::new();
        for i in 0..30 {
            record.entry(format!("{:016x}", i)).or_default().insert("0,0".into(), 10);
        }
        evict_record(&mut record, limits);
        assert_eq!(record.len(), 30, "at the ceiling nothing is evicted");

        record.entry(format!("{:016x}", 99)).or_default().insert("0,0".into(), 10);
        evict_record(&mut record, limits);
        assert_eq!(record.len(), 20);
        // Lowest keys go first
        assert!(!record.contains_key(&format!("{:016x}", 0)));
        assert!(record.contains_key(&format!("{:016x}", 99)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            LearningStore::load(Some(dir.path().to_path_buf()), StoreLimits::default(), 100);
        store.record_game(&sample_game(), Stone::White, Some(Stone::White));
        store.save().unwrap();

        assert!(dir.path().join(GOOD_FILE).exists());
        assert!(dir.path().join(BAD_FILE).exists());
        assert!(!dir.path().join("good_moves.json.tmp").exists());

        let reloaded =
            LearningStore::load(Some(dir.path().to_path_buf()), StoreLimits::default(), 100);
        assert_eq!(reloaded.good(), store.good());

        let after_first = Board::from_moves(&[(Pos::new(7, 7), Stone::Black)]);
        assert_eq!(reloaded.bias(after_first.hash(), Pos::new(7, 8)), WIN_REWARD);
        // Black's positions were never visited by the AI side
        assert_eq!(reloaded.bias(Board::new().hash(), Pos::new(7, 7)), 0);
    }

    #[test]
    fn test_save_never_exceeds_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let limits = StoreLimits { ceiling: 5, floor: 3 };
        let mut store = LearningStore::load(Some(dir.path().to_path_buf()), limits, 100);
        // Ten distinct White positions along row 0
        let mut moves = Vec::new();
        for col in 0..10 {
            moves.push(mv(14, col, Stone::Black));
            moves.push(mv(0, col, Stone::White));
        }
        store.record_game(&moves, Stone::White, Some(Stone::White));
        assert_eq!(store.good().len(), 10);
        store.save().unwrap();
        assert_eq!(store.good().len(), 3);

        let reloaded = LearningStore::load(Some(dir.path().to_path_buf()), limits, 100);
        assert_eq!(reloaded.good().len(), 3);
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(GOOD_FILE), "{ not json").unwrap();
        let store = LearningStore::load(Some(dir.path().to_path_buf()), StoreLimits::default(), 100);
        assert!(store.good().is_empty());
        assert!(store.bad().is_empty());
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut store = LearningStore::in_memory(StoreLimits::default(), 100);
        store.record_game(&sample_game(), Stone::White, Some(Stone::White));
        assert!(store.save().is_ok());
        assert!(store.dir().is_none());
    }
}
