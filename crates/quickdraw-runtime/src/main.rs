use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use quickdraw_core::records::ScoreRecord;
use quickdraw_game::{Arena, Collaborators, GameStatus, Session};
use quickdraw_gesture::GestureRecognizer;
use quickdraw_runtime::audio::TracingAudio;
use quickdraw_runtime::persistence::{LeaderboardStore, LocalHighScores, RemoteSubmitter};
use quickdraw_runtime::pose_source::DemoHand;
use quickdraw_runtime::scheduler::IntervalTicks;
use quickdraw_runtime::{RuntimeConfig, RuntimeError, SessionCommand, spawn_leaderboard_logger, spawn_session};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Quickdraw starting");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Quickdraw failed");
        std::process::exit(1);
    }
}

/// Headless demo: one game played by a synthetic hand, scored and recorded
/// like a real one.
async fn run() -> Result<(), RuntimeError> {
    let config = RuntimeConfig::load_or_default();
    config.validate()?;

    let mut local = LocalHighScores::open(&config.storage.high_score_path, config.storage.high_score_limit)?;
    if let Some(name) = &config.player_name {
        local.set_player_name(name)?;
    }
    let player = local.player_name().map(str::to_string);

    let store = Arc::new(RwLock::new(LeaderboardStore::new(
        config.leaderboard.limit,
        config.leaderboard.broadcast_capacity,
    )));
    let logger = spawn_leaderboard_logger(Arc::clone(&store));
    let (submitter, writer) = RemoteSubmitter::spawn(Arc::clone(&store));

    let collaborators = Collaborators {
        audio: Box::new(TracingAudio::default()),
        high_scores: Box::new(local),
        submitter: Box::new(submitter),
    };
    let mut session = Session::new(config.game.clone(), collaborators)
        .with_arena(Arena::new(config.arena_width, config.arena_height));
    if let Some(seed) = config.seed {
        session = session.with_seed(seed);
    }
    if let Some(name) = &player {
        session.set_player_name(name);
    }

    let handle = spawn_session(
        session,
        GestureRecognizer::new(config.gesture.clone()),
        IntervalTicks::new(config.pose_rate),
        IntervalTicks::new(config.frame_rate),
        DemoHand::default(),
    );
    handle.send(SessionCommand::Start(config.mode))?;

    let mut hud = handle.hud();
    let deadline = tokio::time::sleep(Duration::from_secs(config.demo_secs));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => {
                tracing::info!(secs = config.demo_secs, "Demo time limit reached, quitting");
                handle.send(SessionCommand::Quit)?;
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, quitting");
                handle.send(SessionCommand::Quit)?;
                break;
            }
            changed = hud.changed() => {
                if changed.is_err() {
                    break;
                }
                if hud.borrow_and_update().status == GameStatus::GameOver {
                    break;
                }
            }
        }
    }

    let session = handle.shutdown().await?;
    match session.last_result() {
        Some(result) => tracing::info!(
            player = %result.player,
            mode = %result.mode,
            score = result.score,
            accuracy = result.stats.accuracy(),
            shots = result.stats.shots_fired,
            hits = result.stats.targets_hit,
            reason = ?result.reason,
            "Final result"
        ),
        None => tracing::warn!("Session ended without a result"),
    }

    // Dropping the session drops the last submitter, which lets the writer drain and exit
    drop(session);
    if let Err(e) = writer.await {
        tracing::warn!(error = %e, "Score writer failed");
    }

    let top: Vec<ScoreRecord> = store.read().await.top(10);
    for (rank, record) in top.iter().enumerate() {
        tracing::info!(rank = rank + 1, name = %record.name, score = record.score, mode = %record.game_mode, "Leaderboard");
    }
    // Last handle on the store; the logger's feed ends with it
    drop(store);
    if let Err(e) = logger.await {
        tracing::warn!(error = %e, "Leaderboard logger failed");
    }
    Ok(())
}
