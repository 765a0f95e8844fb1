use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use quickdraw_core::mode::GameMode;
use quickdraw_game::{HudSnapshot, Session, SimEvent};
use quickdraw_gesture::{GestureCell, GestureRecognizer};

use crate::error::RuntimeError;
use crate::pose_source::PoseSource;
use crate::scheduler::TickSource;

/// Commands sent from the host (menus, pointer input, window events) to the
/// frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Start(GameMode),
    Retry,
    MainMenu,
    Pause,
    Resume,
    Quit,
    /// Pointer/touch shot in arena pixels.
    FireAt {
        x: f32,
        y: f32,
    },
    Resize {
        width: f32,
        height: f32,
    },
    SetPlayerName(String),
    Stop,
}

/// Pose loop: poll the source once per tick, run the recognizer and publish
/// the result for the frame loop. Returns the recognizer so its filter state
/// outlives the task.
pub async fn run_pose_loop<T, P>(
    mut recognizer: GestureRecognizer,
    mut ticks: T,
    mut source: P,
    cell: GestureCell,
    cancel: CancellationToken,
) -> GestureRecognizer
where
    T: TickSource,
    P: PoseSource,
{
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            tick = ticks.next_tick() => {
                let Some(tick) = tick else {
                    tracing::debug!("Pose ticks exhausted");
                    break;
                };
                let frame = source.next_frame(tick.elapsed);
                let output = recognizer.update(frame.as_ref());
                if output.fire {
                    tracing::debug!(seq = tick.seq, aim_x = output.aim_x, aim_y = output.aim_y, "Trigger pulled");
                }
                cell.publish(&output);
            }
        }
    }
    recognizer
}

/// Frame loop: drain host commands, step the session once per tick and
/// publish the HUD. Cancels `cancel` on exit so the pose loop follows.
pub async fn run_frame_loop<T>(
    mut session: Session,
    mut ticks: T,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    cell: GestureCell,
    hud_tx: watch::Sender<HudSnapshot>,
    cancel: CancellationToken,
) -> Session
where
    T: TickSource,
{
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            cmd = commands.recv() => match cmd {
                Some(SessionCommand::Stop) | None => break,
                Some(cmd) => apply_command(&mut session, cmd),
            },
            tick = ticks.next_tick() => {
                let Some(tick) = tick else {
                    tracing::debug!("Frame ticks exhausted");
                    break;
                };
                let events = session.tick(tick.elapsed, cell.read());
                log_events(tick.seq, &events);
                hud_tx.send_replace(session.hud());
            }
        }
    }
    cancel.cancel();
    session
}

fn apply_command(session: &mut Session, cmd: SessionCommand) {
    tracing::debug!(?cmd, status = %session.status(), "Session command");
    let result = match cmd {
        SessionCommand::Start(mode) => session.start(mode),
        SessionCommand::Retry => session.retry(),
        SessionCommand::MainMenu => session.main_menu(),
        SessionCommand::Pause => session.pause(),
        SessionCommand::Resume => session.resume(),
        SessionCommand::Quit => session.quit(),
        SessionCommand::FireAt { x, y } => {
            let events = session.fire_at(x, y);
            log_events(0, &events);
            Ok(())
        },
        SessionCommand::Resize { width, height } => {
            session.resize(width, height);
            Ok(())
        },
        SessionCommand::SetPlayerName(name) => {
            session.set_player_name(&name);
            Ok(())
        },
        SessionCommand::Stop => Ok(()),
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "Command rejected");
    }
}

fn log_events(seq: u64, events: &[SimEvent]) {
    for event in events {
        match event {
            SimEvent::Streak(n) => tracing::info!(seq, streak = n, "Streak"),
            SimEvent::DifficultyUp(level) => tracing::info!(seq, level, "Difficulty up"),
            SimEvent::LifeLost { remaining } => tracing::info!(seq, remaining, "Life lost"),
            SimEvent::Finished(reason) => tracing::info!(seq, ?reason, "Simulation finished"),
            other => tracing::trace!(seq, event = ?other, "Sim event"),
        }
    }
}

/// Host-side handle to a running session.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    hud: watch::Receiver<HudSnapshot>,
    cell: GestureCell,
    cancel: CancellationToken,
    frame_task: JoinHandle<Session>,
    pose_task: JoinHandle<GestureRecognizer>,
}

impl SessionHandle {
    pub fn send(&self, cmd: SessionCommand) -> Result<(), RuntimeError> {
        self.commands.send(cmd).map_err(|_| RuntimeError::SessionClosed)
    }

    /// A receiver for HUD snapshots, updated after every frame.
    pub fn hud(&self) -> watch::Receiver<HudSnapshot> {
        self.hud.clone()
    }

    pub fn cell(&self) -> &GestureCell {
        &self.cell
    }

    /// Token that stops both loops when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.frame_task.is_finished()
    }

    /// Stop both loops and hand back the session. Commands sent earlier are
    /// applied before the frame loop exits.
    pub async fn shutdown(self) -> Result<Session, RuntimeError> {
        let _ = self.commands.send(SessionCommand::Stop);
        let session = self.frame_task.await.map_err(|e| {
            tracing::error!(error = %e, "Frame task failed");
            RuntimeError::SessionClosed
        })?;
        self.cancel.cancel();
        if let Err(e) = self.pose_task.await {
            tracing::warn!(error = %e, "Pose task failed");
        }
        Ok(session)
    }
}

/// Spawn the pose and frame loops as tokio tasks sharing one gesture cell.
pub fn spawn_session<PT, FT, P>(
    session: Session,
    recognizer: GestureRecognizer,
    pose_ticks: PT,
    frame_ticks: FT,
    source: P,
) -> SessionHandle
where
    PT: TickSource + 'static,
    FT: TickSource + 'static,
    P: PoseSource + 'static,
{
    let cell = GestureCell::new();
    let cancel = CancellationToken::new();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (hud_tx, hud_rx) = watch::channel(session.hud());

    let pose_task = tokio::spawn(run_pose_loop(
        recognizer,
        pose_ticks,
        source,
        cell.clone(),
        cancel.clone(),
    ));
    let frame_task = tokio::spawn(run_frame_loop(
        session,
        frame_ticks,
        cmd_rx,
        cell.clone(),
        hud_tx,
        cancel.clone(),
    ));

    SessionHandle {
        commands: cmd_tx,
        hud: hud_rx,
        cell,
        cancel,
        frame_task,
        pose_task,
    }
}
