//! Tokio host for Quickdraw: paces the pose and frame loops, persists
//! finished games and fans leaderboard updates out to subscribers.

pub mod audio;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod persistence;
pub mod pose_source;
pub mod scheduler;

use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

use persistence::{SharedLeaderboard, leaderboard_feed};

pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use game_loop::{SessionCommand, SessionHandle, spawn_session};

/// Background task that logs every leaderboard snapshot. Ends when the
/// store is dropped.
pub fn spawn_leaderboard_logger(store: SharedLeaderboard) -> JoinHandle<()> {
    tokio::spawn(async move {
        // Subscribe while holding the read lock, then drop it
        let subscription = {
            let store = store.read().await;
            store.subscribe()
        };
        drop(store);

        let feed = leaderboard_feed(subscription);
        tokio::pin!(feed);
        while let Some(snapshot) = feed.next().await {
            if let Some(best) = snapshot.first() {
                tracing::info!(entries = snapshot.len(), leader = %best.name, top_score = best.score, "Leaderboard updated");
            }
        }
        tracing::debug!("Leaderboard feed closed");
    })
}
