use serde::{Deserialize, Serialize};

/// Number of landmarks in a full hand skeleton.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Wrist landmark index.
pub const WRIST: usize = 0;
/// Index finger PIP joint.
pub const INDEX_PIP: usize = 6;
/// Index finger tip.
pub const INDEX_TIP: usize = 8;

/// A single 3D landmark point. `x` and `y` are normalized to [0, 1];
/// `z` is relative depth and may fall outside that range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in normalized space.
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.z.is_finite()
            && (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
    }
}

/// One hand-pose sample delivered by the pose source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub landmarks: Vec<Landmark>,
}

/// Why a pose frame was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseRejection {
    TooFewLandmarks(usize),
    Malformed(usize),
}

impl std::fmt::Display for PoseRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewLandmarks(n) => {
                write!(f, "pose frame has {n} landmarks, need {HAND_LANDMARK_COUNT}")
            },
            Self::Malformed(idx) => write!(f, "landmark {idx} is non-finite or out of range"),
        }
    }
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// A hand with the index finger extended straight up, tip at
    /// `(tip_x, tip_y)` (clamped into the frame). Unused landmarks sit on
    /// the wrist.
    pub fn pointing(tip_x: f32, tip_y: f32) -> Self {
        let tip_x = tip_x.clamp(0.0, 1.0);
        let tip_y = tip_y.clamp(0.0, 1.0);
        let wrist = Landmark::new(tip_x, (tip_y + 0.3).min(1.0), 0.0);
        let mut landmarks = vec![wrist; HAND_LANDMARK_COUNT];
        landmarks[INDEX_PIP] = Landmark::new(tip_x, (tip_y + 0.1).min(1.0), 0.0);
        landmarks[INDEX_TIP] = Landmark::new(tip_x, tip_y, 0.0);
        Self { landmarks }
    }

    /// Check the landmarks the recognizer consumes. Only the wrist, index
    /// joint and index tip are inspected.
    pub fn validate(&self) -> Result<(), PoseRejection> {
        if self.landmarks.len() < HAND_LANDMARK_COUNT {
            return Err(PoseRejection::TooFewLandmarks(self.landmarks.len()));
        }
        for idx in [WRIST, INDEX_PIP, INDEX_TIP] {
            if !self.landmarks[idx].is_well_formed() {
                return Err(PoseRejection::Malformed(idx));
            }
        }
        Ok(())
    }

    pub fn wrist(&self) -> Option<&Landmark> {
        self.landmarks.get(WRIST)
    }

    pub fn index_pip(&self) -> Option<&Landmark> {
        self.landmarks.get(INDEX_PIP)
    }

    pub fn index_tip(&self) -> Option<&Landmark> {
        self.landmarks.get(INDEX_TIP)
    }
}
