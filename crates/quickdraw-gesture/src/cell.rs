use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::recognizer::GestureOutput;

/// Continuous part of the recognizer output. Always last-write-wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureSnapshot {
    pub aim_x: f32,
    pub aim_y: f32,
    pub hand_present: bool,
    pub confidence: f32,
    pub recoil: f32,
}

impl From<&GestureOutput> for GestureSnapshot {
    fn from(out: &GestureOutput) -> Self {
        Self {
            aim_x: out.aim_x,
            aim_y: out.aim_y,
            hand_present: out.hand_present,
            confidence: out.confidence,
            recoil: out.recoil,
        }
    }
}

/// What the frame loop sees when it reads the cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureRead {
    /// Latest published snapshot; `None` until the recognizer has run once.
    pub snapshot: Option<GestureSnapshot>,
    /// Fire-edges published since the previous read.
    pub fires: u32,
}

impl GestureRead {
    pub fn hand_present(&self) -> bool {
        self.snapshot.is_some_and(|s| s.hand_present)
    }
}

#[derive(Debug, Default)]
struct Slot {
    latest: Option<GestureSnapshot>,
    generation: u64,
    pending_fires: u32,
}

/// Hand-off point between the pose callback (writer) and the frame callback
/// (reader). Continuous values are overwritten by every publish; fire-edges
/// are latched until a read consumes them, so an edge produced between two
/// frames is delivered exactly once.
#[derive(Debug, Clone, Default)]
pub struct GestureCell {
    inner: Arc<Mutex<Slot>>,
}

impl GestureCell {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        // Slot holds plain data; a panic mid-update cannot leave it inconsistent
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish one recognizer output.
    pub fn publish(&self, output: &GestureOutput) {
        let mut slot = self.slot();
        slot.latest = Some(GestureSnapshot::from(output));
        slot.generation += 1;
        if output.fire {
            slot.pending_fires = slot.pending_fires.saturating_add(1);
        }
    }

    /// Read the latest snapshot and consume pending fire-edges.
    pub fn read(&self) -> GestureRead {
        let mut slot = self.slot();
        GestureRead {
            snapshot: slot.latest,
            fires: std::mem::take(&mut slot.pending_fires),
        }
    }

    /// Look at the latest snapshot without consuming anything.
    pub fn peek(&self) -> Option<GestureSnapshot> {
        self.slot().latest
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.slot().generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::GestureRecognizer;
    use quickdraw_core::pose::PoseFrame;

    fn output(fire: bool) -> GestureOutput {
        GestureOutput {
            aim_x: 0.25,
            aim_y: 0.75,
            fire,
            confidence: 1.0,
            recoil: 0.0,
            hand_present: true,
        }
    }

    #[test]
    fn empty_cell_reads_nothing() {
        let cell = GestureCell::new();
        let read = cell.read();
        assert!(read.snapshot.is_none());
        assert_eq!(read.fires, 0);
        assert_eq!(cell.generation(), 0);
        assert!(!read.hand_present());
    }

    #[test]
    fn fire_survives_later_publish_without_fire() {
        let cell = GestureCell::new();
        cell.publish(&output(true));
        cell.publish(&output(false));
        cell.publish(&output(false));

        let read = cell.read();
        assert_eq!(read.fires, 1);
        assert_eq!(cell.generation(), 3);

        let again = cell.read();
        assert_eq!(again.fires, 0);
        assert_eq!(again.snapshot, read.snapshot);
        assert_eq!(cell.generation(), 3);
    }

    #[test]
    fn last_write_wins_for_aim() {
        let cell = GestureCell::new();
        cell.publish(&output(false));
        let mut moved = output(false);
        moved.aim_x = 0.9;
        cell.publish(&moved);
        assert_eq!(cell.peek().map(|s| s.aim_x), Some(0.9));
    }

    #[test]
    fn clones_share_the_slot() {
        let writer = GestureCell::new();
        let reader = writer.clone();
        writer.publish(&output(true));
        assert_eq!(reader.read().fires, 1);
    }

    #[test]
    fn oversampled_recognizer_delivers_every_edge_once() {
        // Four pose samples per frame: the frame loop must still see exactly
        // the edges the recognizer emitted.
        let cell = GestureCell::new();
        let mut rec = GestureRecognizer::default();
        let mut emitted = 0;
        let mut delivered = 0;
        let mut y = 0.95;

        for _frame in 0..20 {
            for _ in 0..4 {
                y -= 0.04;
                if y < 0.05 {
                    y = 0.95;
                }
                let out = rec.update(Some(&PoseFrame::pointing(0.5, y)));
                emitted += out.fire as u32;
                cell.publish(&out);
            }
            delivered += cell.read().fires;
        }

        assert!(emitted > 0);
        assert_eq!(emitted, delivered);
    }
}
