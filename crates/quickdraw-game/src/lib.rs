//! Quickdraw game logic: procedural targets, hit resolution, the per-frame
//! simulation and the session status machine that drives it.

pub mod arena;
pub mod collision;
pub mod config;
pub mod effects;
pub mod engine;
pub mod hud;
pub mod powerups;
pub mod scoring;
pub mod session;
pub mod spawner;
pub mod status;
pub mod target;

pub use arena::Arena;
pub use config::GameConfig;
pub use engine::{EndReason, FrameInput, SimEvent, Simulation, SimulationState};
pub use hud::{HudSnapshot, PowerUpStatus};
pub use powerups::PowerUpType;
pub use session::{Collaborators, Session, SessionResult};
pub use spawner::TargetSpawner;
pub use status::{GameStatus, StatusMachine, TransitionError};
pub use target::{MovePattern, Target, TargetKind};
