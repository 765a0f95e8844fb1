use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use quickdraw_core::records::{HighScoreEntry, HighScoreSink, PersistError, ScoreRecord, ScoreSubmitter, insert_ranked};

/// Default number of records kept by the leaderboard before the lowest are evicted.
const DEFAULT_MAX_STORED_RECORDS: usize = 500;

/// On-disk layout of the local profile file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalProfile {
    pub player_name: Option<String>,
    pub high_scores: Vec<HighScoreEntry>,
}

/// Top-N local high scores plus the remembered player name, stored as JSON.
#[derive(Debug)]
pub struct LocalHighScores {
    path: PathBuf,
    limit: usize,
    profile: LocalProfile,
}

impl LocalHighScores {
    /// Open (or start) the profile at `path`. An unreadable file is an error;
    /// a corrupt one is replaced.
    pub fn open(path: impl AsRef<Path>, limit: usize) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let mut profile = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<LocalProfile>(&bytes) {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Corrupt high-score file, starting fresh");
                    LocalProfile::default()
                },
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LocalProfile::default(),
            Err(e) => return Err(e.into()),
        };
        profile.high_scores.sort_by(|a, b| b.score.cmp(&a.score));
        profile.high_scores.truncate(limit);
        Ok(Self { path, limit, profile })
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.profile.high_scores
    }

    pub fn player_name(&self) -> Option<&str> {
        self.profile.player_name.as_deref()
    }

    pub fn set_player_name(&mut self, name: &str) -> Result<(), PersistError> {
        self.profile.player_name = Some(name.to_string());
        self.save()
    }

    fn save(&self) -> Result<(), PersistError> {
        let json = serde_json::to_vec_pretty(&self.profile).map_err(|e| PersistError::Encode(e.to_string()))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl HighScoreSink for LocalHighScores {
    fn append(&mut self, entry: HighScoreEntry) -> Result<(), PersistError> {
        insert_ranked(&mut self.profile.high_scores, entry, self.limit);
        self.save()
    }
}

/// In-memory remote leaderboard with broadcast fan-out of ranked snapshots.
pub struct LeaderboardStore {
    records: Vec<ScoreRecord>,
    feed: broadcast::Sender<Vec<ScoreRecord>>,
    snapshot_limit: usize,
    max_stored_records: usize,
}

pub type SharedLeaderboard = Arc<RwLock<LeaderboardStore>>;

impl LeaderboardStore {
    pub fn new(snapshot_limit: usize, broadcast_capacity: usize) -> Self {
        let (feed, _) = broadcast::channel(broadcast_capacity);
        Self {
            records: Vec::new(),
            feed,
            snapshot_limit,
            max_stored_records: DEFAULT_MAX_STORED_RECORDS.max(snapshot_limit),
        }
    }

    /// Insert a record in score order and broadcast the new top snapshot.
    /// Equal scores keep arrival order.
    pub fn insert(&mut self, record: ScoreRecord) {
        let pos = self
            .records
            .iter()
            .position(|r| r.score < record.score)
            .unwrap_or(self.records.len());
        self.records.insert(pos, record);
        self.records.truncate(self.max_stored_records);
        let _ = self.feed.send(self.top(self.snapshot_limit));
    }

    /// Highest `n` records, best first.
    pub fn top(&self, n: usize) -> Vec<ScoreRecord> {
        self.records.iter().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The current ranked snapshot plus a receiver for every later change.
    /// Both are taken under the same borrow, so no insert falls between them.
    pub fn subscribe(&self) -> LeaderboardSubscription {
        LeaderboardSubscription {
            current: self.top(self.snapshot_limit),
            updates: self.feed.subscribe(),
        }
    }
}

/// A leaderboard snapshot taken at subscription time and the live updates
/// that follow it.
#[derive(Debug)]
pub struct LeaderboardSubscription {
    pub current: Vec<ScoreRecord>,
    pub updates: broadcast::Receiver<Vec<ScoreRecord>>,
}

/// Turn a leaderboard subscription into a stream that yields the current
/// snapshot first. Snapshots missed by a slow consumer are skipped; the next
/// one supersedes them anyway.
pub fn leaderboard_feed(subscription: LeaderboardSubscription) -> impl Stream<Item = Vec<ScoreRecord>> {
    let updates = BroadcastStream::new(subscription.updates).filter_map(|result| match result {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!(error = %e, "Leaderboard feed lagged");
            None
        },
    });
    tokio_stream::once(subscription.current).chain(updates)
}

/// `ScoreSubmitter` that hands records to a background writer task, so the
/// frame loop never waits on the store.
#[derive(Debug, Clone)]
pub struct RemoteSubmitter {
    tx: mpsc::UnboundedSender<ScoreRecord>,
}

impl RemoteSubmitter {
    /// Start the writer task. It exits once every submitter clone is dropped.
    pub fn spawn(store: SharedLeaderboard) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ScoreRecord>();
        let handle = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                tracing::info!(
                    id = %record.id,
                    name = %record.name,
                    score = record.score,
                    mode = %record.game_mode,
                    accuracy = record.stats.accuracy,
                    "Score submitted"
                );
                store.write().await.insert(record);
            }
        });
        (Self { tx }, handle)
    }
}

impl ScoreSubmitter for RemoteSubmitter {
    fn submit(&mut self, record: ScoreRecord) -> Result<(), PersistError> {
        self.tx.send(record).map_err(|_| PersistError::Closed)
    }
}
