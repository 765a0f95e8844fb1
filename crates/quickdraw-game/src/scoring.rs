/// Multiplier for the `combo`-th consecutive hit, capped at `cap`.
pub fn combo_multiplier(combo: u32, cap: u32) -> u32 {
    combo.clamp(1, cap.max(1))
}

/// Points for a scoring hit landed while `combo_before` hits were already chained.
pub fn hit_points(base: i32, combo_before: u32, cap: u32) -> i32 {
    base.saturating_mul(combo_multiplier(combo_before.saturating_add(1), cap) as i32)
}

/// Apply a signed delta to a score, flooring at zero.
pub fn apply_delta(score: u32, delta: i32) -> u32 {
    if delta >= 0 {
        score.saturating_add(delta as u32)
    } else {
        score.saturating_sub(delta.unsigned_abs())
    }
}

/// Whether reaching `combo` earns a streak banner.
pub fn is_streak(combo: u32, every: u32) -> bool {
    every > 0 && combo > 0 && combo % every == 0
}

/// Total for `k` consecutive base-`base` hits starting from a broken combo.
pub fn chain_total(base: i32, k: u32, cap: u32) -> u32 {
    (0..k).fold(0, |acc, i| apply_delta(acc, hit_points(base, i, cap)))
}
