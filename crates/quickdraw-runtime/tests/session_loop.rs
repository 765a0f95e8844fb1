//! Session loop tests: drive the pose and frame loops with manual ticks and
//! check that gestures, commands and results flow end to end.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio_stream::StreamExt;

use quickdraw_core::audio::AudioCue;
use quickdraw_core::mode::GameMode;
use quickdraw_core::pose::PoseFrame;
use quickdraw_core::test_helpers::{RecordingAudio, RecordingScores};
use quickdraw_game::{Arena, Collaborators, EndReason, GameConfig, GameStatus, HudSnapshot, Session};
use quickdraw_gesture::{GestureCell, GestureRecognizer};
use quickdraw_runtime::persistence::{LeaderboardStore, RemoteSubmitter, SharedLeaderboard, leaderboard_feed};
use quickdraw_runtime::pose_source::ScriptedPoses;
use quickdraw_runtime::scheduler::{ManualTickSender, ManualTicks};
use quickdraw_runtime::{SessionCommand, SessionHandle, spawn_session};

const WAIT: Duration = Duration::from_secs(2);

struct Rig {
    handle: SessionHandle,
    hud: watch::Receiver<HudSnapshot>,
    pose_tx: ManualTickSender,
    frame_tx: ManualTickSender,
}

impl Rig {
    fn new(config: GameConfig, collaborators: Collaborators, poses: Vec<Option<PoseFrame>>) -> Self {
        let session = Session::new(config, collaborators)
            .with_seed(42)
            .with_arena(Arena::new(800.0, 600.0));
        let (pose_tx, pose_ticks) = ManualTicks::channel();
        let (frame_tx, frame_ticks) = ManualTicks::channel();
        let handle = spawn_session(
            session,
            GestureRecognizer::default(),
            pose_ticks,
            frame_ticks,
            ScriptedPoses::new(poses),
        );
        let hud = handle.hud();
        Self {
            handle,
            hud,
            pose_tx,
            frame_tx,
        }
    }

    /// Feed one pose tick and wait until its result is published.
    async fn pose(&mut self, elapsed: Duration) {
        let cell: &GestureCell = self.handle.cell();
        let before = cell.generation();
        assert!(self.pose_tx.tick(elapsed));
        tokio::time::timeout(WAIT, async {
            while cell.generation() == before {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("pose loop did not publish");
    }

    /// Feed one frame tick and return the HUD it produced.
    async fn frame(&mut self, elapsed: Duration) -> HudSnapshot {
        assert!(self.frame_tx.tick(elapsed));
        tokio::time::timeout(WAIT, self.hud.changed())
            .await
            .expect("frame loop did not publish")
            .expect("frame loop is gone");
        self.hud.borrow_and_update().clone()
    }

    /// Start a game and run the countdown through to Playing.
    async fn start(&mut self, mode: GameMode) -> Duration {
        self.handle.send(SessionCommand::Start(mode)).unwrap();
        let hud = self.frame(Duration::ZERO).await;
        assert_eq!(hud.status, GameStatus::Countdown);
        assert_eq!(hud.countdown, Some(3));
        let go = Duration::from_secs(3);
        let hud = self.frame(go).await;
        assert_eq!(hud.status, GameStatus::Playing);
        go
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test]
async fn flick_fires_a_shot_and_quit_records_it() {
    let audio = RecordingAudio::default();
    let scores = RecordingScores::default();
    let collaborators = Collaborators {
        audio: Box::new(audio.clone()),
        high_scores: Box::new(scores.clone()),
        submitter: Box::new(scores.clone()),
    };
    let poses = vec![Some(PoseFrame::pointing(0.5, 0.6)), Some(PoseFrame::pointing(0.5, 0.5))];
    let mut rig = Rig::new(GameConfig::default(), collaborators, poses);

    let go = rig.start(GameMode::Arcade).await;
    assert_eq!(audio.count(AudioCue::Countdown), 3);
    assert_eq!(audio.count(AudioCue::Go), 1);

    rig.pose(ms(3000)).await;
    rig.pose(ms(3033)).await;
    let hud = rig.frame(go + ms(16)).await;
    assert_eq!(hud.stats.shots_fired, 1);
    assert!(hud.hand_present);
    assert_eq!(audio.count(AudioCue::Shoot), 1);

    // The fire-edge was consumed by the previous frame
    let hud = rig.frame(go + ms(33)).await;
    assert_eq!(hud.stats.shots_fired, 1);

    rig.handle.send(SessionCommand::Quit).unwrap();
    let session = rig.handle.shutdown().await.unwrap();

    assert_eq!(session.status(), GameStatus::GameOver);
    let result = session.last_result().unwrap();
    assert_eq!(result.reason, EndReason::Quit);
    assert_eq!(result.stats.shots_fired, 1);
    assert_eq!(scores.high_score_count(), 1);
    assert_eq!(scores.record_count(), 1);
    assert_eq!(scores.records.lock().unwrap()[0].stats.counters.shots_fired, 1);
}

#[tokio::test]
async fn hand_loss_pauses_and_return_resumes() {
    let config = GameConfig {
        hand_lost_pause_frames: 3,
        ..GameConfig::default()
    };
    let poses = vec![None, Some(PoseFrame::pointing(0.4, 0.5))];
    let mut rig = Rig::new(config, Collaborators::default(), poses);
    let go = rig.start(GameMode::FreePlay).await;

    rig.pose(ms(3000)).await;
    for i in 1..=2 {
        let hud = rig.frame(go + ms(16 * i)).await;
        assert_eq!(hud.status, GameStatus::Playing);
        assert!(!hud.hand_present);
    }
    let hud = rig.frame(go + ms(48)).await;
    assert_eq!(hud.status, GameStatus::Paused);

    // Still no hand: stays paused
    let hud = rig.frame(go + ms(64)).await;
    assert_eq!(hud.status, GameStatus::Paused);

    rig.pose(ms(3100)).await;
    let hud = rig.frame(go + ms(80)).await;
    assert_eq!(hud.status, GameStatus::Playing);
    assert!(hud.hand_present);
    rig.frame(go + ms(96)).await;

    let session = rig.handle.shutdown().await.unwrap();
    assert!(!session.is_auto_paused());
    assert_eq!(session.simulation().unwrap().state().hand_lost_frames, 0);
}

#[tokio::test]
async fn manual_pause_waits_for_resume_command() {
    let mut rig = Rig::new(GameConfig::default(), Collaborators::default(), vec![Some(PoseFrame::pointing(0.5, 0.5))]);
    let go = rig.start(GameMode::Arcade).await;
    rig.pose(ms(3000)).await;

    rig.handle.send(SessionCommand::Pause).unwrap();
    let hud = rig.frame(go + ms(16)).await;
    assert_eq!(hud.status, GameStatus::Paused);
    let hud = rig.frame(go + ms(32)).await;
    assert_eq!(hud.status, GameStatus::Paused);

    rig.handle.send(SessionCommand::Resume).unwrap();
    let hud = rig.frame(go + ms(48)).await;
    assert_eq!(hud.status, GameStatus::Playing);
    assert_eq!(hud.remaining_secs, Some(60));

    rig.handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn submitted_score_reaches_the_leaderboard_feed() {
    let store: SharedLeaderboard = Arc::new(RwLock::new(LeaderboardStore::new(10, 8)));
    let feed = leaderboard_feed(store.read().await.subscribe());
    tokio::pin!(feed);

    let (submitter, writer) = RemoteSubmitter::spawn(Arc::clone(&store));
    let collaborators = Collaborators {
        submitter: Box::new(submitter),
        ..Collaborators::default()
    };
    let mut rig = Rig::new(GameConfig::default(), collaborators, Vec::new());
    rig.handle.send(SessionCommand::SetPlayerName("Ada".to_string())).unwrap();
    rig.start(GameMode::Survival).await;

    rig.handle.send(SessionCommand::Quit).unwrap();
    let session = rig.handle.shutdown().await.unwrap();
    assert_eq!(session.player_name(), "Ada");
    drop(session);
    tokio::time::timeout(WAIT, writer).await.unwrap().unwrap();

    let initial = tokio::time::timeout(WAIT, feed.next()).await.unwrap().unwrap();
    assert!(initial.is_empty());
    let snapshot = tokio::time::timeout(WAIT, feed.next()).await.unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Ada");
    assert_eq!(snapshot[0].game_mode, GameMode::Survival);
    assert_eq!(store.read().await.len(), 1);
}
