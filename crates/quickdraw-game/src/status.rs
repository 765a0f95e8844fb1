use serde::{Deserialize, Serialize};

/// Top-level session status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Start,
    Countdown,
    Playing,
    Paused,
    GameOver,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Countdown => "countdown",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::GameOver => "gameover",
        }
    }

    pub fn can_transition_to(self, to: GameStatus) -> bool {
        use GameStatus::*;
        matches!(
            (self, to),
            (Start, Countdown)
                | (Countdown, Playing)
                | (Playing, Paused)
                | (Paused, Playing)
                | (Playing, GameOver)
                | (GameOver, Countdown)
                | (GameOver, Start)
        )
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected status change. The machine is left as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: GameStatus,
    pub to: GameStatus,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot go from {} to {}", self.from, self.to)
    }
}

impl std::error::Error for TransitionError {}

/// Holds the current status and enforces the transition table.
#[derive(Debug, Clone, Default)]
pub struct StatusMachine {
    current: GameStatus,
}

impl StatusMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> GameStatus {
        self.current
    }

    /// Move to `to`, returning the previous status.
    pub fn transition(&mut self, to: GameStatus) -> Result<GameStatus, TransitionError> {
        let from = self.current;
        if !from.can_transition_to(to) {
            return Err(TransitionError { from, to });
        }
        self.current = to;
        tracing::debug!(%from, %to, "Status transition");
        Ok(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameStatus::*;

    const ALL: [GameStatus; 5] = [Start, Countdown, Playing, Paused, GameOver];

    #[test]
    fn full_lifecycle() {
        let mut m = StatusMachine::new();
        for next in [Countdown, Playing, Paused, Playing, GameOver, Countdown, Playing, GameOver, Start] {
            m.transition(next).unwrap();
        }
        assert_eq!(m.current(), Start);
    }

    #[test]
    fn rejected_transition_leaves_state() {
        let mut m = StatusMachine::new();
        let err = m.transition(Playing).unwrap_err();
        assert_eq!(err, TransitionError { from: Start, to: Playing });
        assert_eq!(m.current(), Start);
        assert_eq!(err.to_string(), "cannot go from start to playing");
    }

    #[test]
    fn exactly_seven_edges() {
        let allowed = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .count();
        assert_eq!(allowed, 7);
        for s in ALL {
            assert!(!s.can_transition_to(s));
        }
    }
}
