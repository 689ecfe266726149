/// Points for an accepted pickup.
///
/// Scoring: value × points-per-unit, so bigger numbers are worth more.
pub fn pickup_score(value: u32, points_per_unit: i64) -> i64 {
    i64::from(value).saturating_mul(points_per_unit)
}

/// Bonus for winning a level: every life left is worth `life_bonus`.
pub fn level_bonus(lives_remaining: u8, life_bonus: i64) -> i64 {
    i64::from(lives_remaining).saturating_mul(life_bonus)
}
