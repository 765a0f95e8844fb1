use smallvec::SmallVec;

use crate::target::Target;

/// Indices of hit targets, in iteration order.
pub type Hits = SmallVec<[usize; 8]>;

/// Hit-test an aim point against the live targets. A target qualifies when
/// the aim is strictly inside `radius + blast`. Without a blast only the
/// first qualifying target is returned.
pub fn resolve_hits(x: f32, y: f32, blast: f32, targets: &[Target]) -> Hits {
    let mut hits = Hits::new();
    for (i, t) in targets.iter().enumerate() {
        if t.distance_to(x, y) < t.radius + blast {
            hits.push(i);
            if blast <= 0.0 {
                break;
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetKind;

    fn at(id: u64, x: f32, y: f32, r: f32) -> Target {
        Target::fixed(id, TargetKind::Normal, x, y, r)
    }

    #[test]
    fn centre_hit() {
        let targets = vec![at(0, 100.0, 100.0, 10.0), at(1, 400.0, 300.0, 30.0)];
        assert_eq!(resolve_hits(400.0, 300.0, 0.0, &targets).as_slice(), &[1]);
    }

    #[test]
    fn boundary_is_a_miss() {
        let targets = vec![at(0, 100.0, 100.0, 10.0)];
        assert!(resolve_hits(110.0, 100.0, 0.0, &targets).is_empty());
        assert_eq!(resolve_hits(109.9, 100.0, 0.0, &targets).len(), 1);
    }

    #[test]
    fn overlapping_targets_first_wins_without_blast() {
        let targets = vec![at(0, 100.0, 100.0, 30.0), at(1, 110.0, 100.0, 30.0)];
        assert_eq!(resolve_hits(105.0, 100.0, 0.0, &targets).as_slice(), &[0]);
    }

    #[test]
    fn blast_collects_everything_in_reach() {
        let targets = vec![
            at(0, 100.0, 100.0, 10.0),
            at(1, 160.0, 100.0, 10.0),
            at(2, 400.0, 400.0, 10.0),
        ];
        assert_eq!(resolve_hits(130.0, 100.0, 60.0, &targets).as_slice(), &[0, 1]);
    }

    #[test]
    fn empty_set_never_hits() {
        assert!(resolve_hits(0.0, 0.0, 60.0, &[]).is_empty());
    }
}
