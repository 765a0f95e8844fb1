use serde::{Deserialize, Serialize};

use crate::mode::GameMode;
use crate::time::{timestamp_now, unix_millis};

/// Running counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub shots_fired: u32,
    pub targets_hit: u32,
    pub targets_missed: u32,
    pub best_combo: u32,
    pub bonus_hit: u32,
    pub bombs_hit: u32,
    pub power_ups_collected: u32,
}

impl SessionStats {
    /// Hit percentage, rounded to the nearest integer. Zero when nothing was fired.
    pub fn accuracy(&self) -> u32 {
        if self.shots_fired == 0 {
            return 0;
        }
        (self.targets_hit as f64 / self.shots_fired as f64 * 100.0).round() as u32
    }
}

/// Local high-score table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
    /// RFC 3339 UTC time the entry was recorded.
    pub timestamp: String,
}

impl HighScoreEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
            timestamp: timestamp_now(),
        }
    }
}

/// Insert `entry` into `table`, keeping it sorted by score descending and at
/// most `limit` long. Ties keep the earlier entry first.
pub fn insert_ranked(table: &mut Vec<HighScoreEntry>, entry: HighScoreEntry, limit: usize) {
    let pos = table
        .iter()
        .position(|e| e.score < entry.score)
        .unwrap_or(table.len());
    table.insert(pos, entry);
    table.truncate(limit);
}

/// Stats block on a submitted record, including the derived accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStats {
    #[serde(flatten)]
    pub counters: SessionStats,
    pub accuracy: u32,
}

/// A finalized score submitted to the remote leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: String,
    pub name: String,
    pub score: u32,
    pub game_mode: GameMode,
    pub stats: RecordStats,
    /// Unix epoch milliseconds.
    pub timestamp: u64,
}

impl ScoreRecord {
    pub fn new(name: impl Into<String>, score: u32, stats: SessionStats, mode: GameMode) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            score,
            game_mode: mode,
            stats: RecordStats {
                counters: stats,
                accuracy: stats.accuracy(),
            },
            timestamp: unix_millis(),
        }
    }
}

/// Errors surfaced by persistence collaborators. Callers in the simulation
/// path log and discard these.
#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Encode(String),
    Closed,
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "storage I/O failed: {e}"),
            Self::Encode(m) => write!(f, "record encoding failed: {m}"),
            Self::Closed => write!(f, "score store is closed"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Local high-score table collaborator.
pub trait HighScoreSink: Send {
    fn append(&mut self, entry: HighScoreEntry) -> Result<(), PersistError>;
}

/// Remote leaderboard collaborator. Must return without waiting on the store.
pub trait ScoreSubmitter: Send {
    fn submit(&mut self, record: ScoreRecord) -> Result<(), PersistError>;
}

/// Collaborator that discards everything; used when persistence is disabled.
#[derive(Debug, Default)]
pub struct DiscardScores;

impl HighScoreSink for DiscardScores {
    fn append(&mut self, _entry: HighScoreEntry) -> Result<(), PersistError> {
        Ok(())
    }
}

impl ScoreSubmitter for DiscardScores {
    fn submit(&mut self, _record: ScoreRecord) -> Result<(), PersistError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> HighScoreEntry {
        HighScoreEntry {
            name: name.to_string(),
            score,
            timestamp: "1970-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn accuracy_rounds() {
        let stats = SessionStats {
            shots_fired: 3,
            targets_hit: 2,
            ..Default::default()
        };
        assert_eq!(stats.accuracy(), 67);
    }

    #[test]
    fn accuracy_zero_without_shots() {
        assert_eq!(SessionStats::default().accuracy(), 0);
    }

    #[test]
    fn insert_ranked_sorts_and_trims() {
        let mut table = Vec::new();
        for (name, score) in [("a", 30), ("b", 90), ("c", 10), ("d", 50)] {
            insert_ranked(&mut table, entry(name, score), 3);
        }
        let scores: Vec<u32> = table.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![90, 50, 30]);
    }

    #[test]
    fn insert_ranked_ties_keep_earlier_first() {
        let mut table = vec![entry("first", 40)];
        insert_ranked(&mut table, entry("second", 40), 10);
        assert_eq!(table[0].name, "first");
        assert_eq!(table[1].name, "second");
    }

    #[test]
    fn record_carries_accuracy_and_mode_tag() {
        let stats = SessionStats {
            shots_fired: 10,
            targets_hit: 7,
            best_combo: 4,
            ..Default::default()
        };
        let record = ScoreRecord::new("Ada", 120, stats, GameMode::Survival);
        assert_eq!(record.stats.accuracy, 70);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["gameMode"], "survival");
        assert_eq!(json["stats"]["shotsFired"], 10);
        assert_eq!(json["stats"]["accuracy"], 70);
        assert_eq!(json["stats"]["bestCombo"], 4);
    }
}
