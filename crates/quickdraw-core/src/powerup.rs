use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Trait for power-up kind enums. Durations are counted in simulation frames.
pub trait PowerUpKind: Clone + Copy + PartialEq + Serialize + DeserializeOwned {
    /// Number of frames the effect lasts once collected.
    fn duration_frames(&self) -> u32;
}

/// Active power-up effect, generic over the kind enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActivePowerUp<K: PowerUpKind> {
    pub kind: K,
    pub remaining: u32,
}

impl<K: PowerUpKind> ActivePowerUp<K> {
    pub fn new(kind: K) -> Self {
        Self {
            remaining: kind.duration_frames(),
            kind,
        }
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

/// The set of power-ups currently running. Collecting a kind that is already
/// active refreshes its duration instead of stacking a second copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActivePowerUps<K: PowerUpKind> {
    active: Vec<ActivePowerUp<K>>,
}

impl<K: PowerUpKind> Default for ActivePowerUps<K> {
    fn default() -> Self {
        Self { active: Vec::new() }
    }
}

impl<K: PowerUpKind> ActivePowerUps<K> {
    /// Start `kind`, or reset its remaining frames if already running.
    pub fn activate(&mut self, kind: K) {
        if let Some(existing) = self.active.iter_mut().find(|p| p.kind == kind) {
            existing.remaining = kind.duration_frames();
        } else {
            self.active.push(ActivePowerUp::new(kind));
        }
    }

    pub fn is_active(&self, kind: K) -> bool {
        self.active.iter().any(|p| p.kind == kind)
    }

    pub fn remaining(&self, kind: K) -> u32 {
        self.active
            .iter()
            .find(|p| p.kind == kind)
            .map_or(0, |p| p.remaining)
    }

    /// Decrement every counter by one frame and drop expired effects.
    pub fn tick(&mut self) {
        for pu in &mut self.active {
            pu.tick();
        }
        self.active.retain(|p| !p.is_expired());
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivePowerUp<K>> {
        self.active.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    enum TestKind {
        Short,
        Long,
    }

    impl PowerUpKind for TestKind {
        fn duration_frames(&self) -> u32 {
            match self {
                Self::Short => 2,
                Self::Long => 10,
            }
        }
    }

    #[test]
    fn short_expires_after_duration() {
        let mut set = ActivePowerUps::default();
        set.activate(TestKind::Short);
        set.tick();
        assert!(set.is_active(TestKind::Short));
        set.tick();
        assert!(!set.is_active(TestKind::Short));
        assert!(set.is_empty());
    }

    #[test]
    fn reactivation_refreshes_instead_of_stacking() {
        let mut set = ActivePowerUps::default();
        set.activate(TestKind::Long);
        for _ in 0..7 {
            set.tick();
        }
        assert_eq!(set.remaining(TestKind::Long), 3);
        set.activate(TestKind::Long);
        assert_eq!(set.remaining(TestKind::Long), 10);
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn inactive_kind_reports_zero() {
        let set: ActivePowerUps<TestKind> = ActivePowerUps::default();
        assert_eq!(set.remaining(TestKind::Short), 0);
    }
}
