use serde::{Deserialize, Serialize};

/// Game mode selected on the start screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Fixed clock; the session ends when time runs out.
    #[default]
    Arcade,
    /// No clock; population pressure costs lives.
    Survival,
    /// No clock and no loss condition.
    FreePlay,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arcade => "arcade",
            Self::Survival => "survival",
            Self::FreePlay => "freeplay",
        }
    }

    /// Whether the wall-clock countdown runs in this mode.
    pub fn is_timed(&self) -> bool {
        matches!(self, Self::Arcade)
    }

    /// Whether hit targets are immediately replaced.
    pub fn replaces_targets(&self) -> bool {
        !matches!(self, Self::Survival)
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arcade" => Ok(Self::Arcade),
            "survival" => Ok(Self::Survival),
            "freeplay" | "free_play" | "free-play" => Ok(Self::FreePlay),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_tags() {
        for mode in [GameMode::Arcade, GameMode::Survival, GameMode::FreePlay] {
            assert_eq!(mode.as_str().parse::<GameMode>(), Ok(mode));
        }
        assert_eq!("free-play".parse::<GameMode>(), Ok(GameMode::FreePlay));
        assert!("deathmatch".parse::<GameMode>().is_err());
    }

    #[test]
    fn only_arcade_is_timed() {
        assert!(GameMode::Arcade.is_timed());
        assert!(!GameMode::Survival.is_timed());
        assert!(!GameMode::FreePlay.is_timed());
    }
}
