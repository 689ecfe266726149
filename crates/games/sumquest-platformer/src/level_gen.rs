use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use sumquest_core::geometry::Vec2;

use crate::level::{
    CollectibleConfig, DEFAULT_LIVES, DEFAULT_PLAYER_SIZE, GeometryConfig, GeometryKind,
    LevelConfig,
};

/// World width of a generated level.
pub const WORLD_WIDTH: f32 = 1200.0;
/// Ground line of a generated level.
pub const FLOOR_Y: f32 = 560.0;
/// Numbers per generated level.
pub const SEQUENCE_LEN: u32 = 4;
/// Stair-step platforms per level (one more than the pickups).
const NUM_PLATFORMS: usize = 5;
const PLATFORM_W: f32 = 110.0;
const PLATFORM_H: f32 = 16.0;
const PICKUP_SIZE: f32 = 24.0;
const NUM_SPIKES: usize = 3;

/// Mix the level index into the seed so consecutive levels differ.
fn level_seed(index: usize, seed: u64) -> u64 {
    seed ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// The values level `index` asks for: 1..=4, then 5..=8, and so on.
pub fn level_sequence(index: usize) -> Vec<u32> {
    let base = u32::try_from(index)
        .unwrap_or(u32::MAX)
        .saturating_mul(SEQUENCE_LEN)
        .saturating_add(1);
    (0..SEQUENCE_LEN).map(|i| base.saturating_add(i)).collect()
}

/// Generate a deterministic level from its index and a seed.
///
/// Layout: a rising staircase of platforms with the numbered pickups on
/// top (in shuffled order), floor spikes between the steps, one spring pad
/// on the floor, and the goal at the far right.
pub fn generate_level(index: usize, seed: u64) -> LevelConfig {
    let mut rng = StdRng::seed_from_u64(level_seed(index, seed));
    let sequence = level_sequence(index);
    let target = sequence.iter().map(|&v| u64::from(v)).sum();

    let mut geometry = Vec::new();
    let mut platform_tops = Vec::with_capacity(NUM_PLATFORMS);
    for i in 0..NUM_PLATFORMS {
        let x = 140.0 + i as f32 * 190.0 + rng.random_range(-20.0f32..=20.0);
        let y = 470.0 - i as f32 * 45.0 + rng.random_range(-10.0f32..=10.0);
        geometry.push(GeometryConfig {
            kind: GeometryKind::Platform,
            x,
            y,
            w: PLATFORM_W,
            h: PLATFORM_H,
        });
        platform_tops.push(Vec2::new(x, y));
    }

    // Spring first among the floor pieces so the layout order is stable.
    geometry.push(GeometryConfig {
        kind: GeometryKind::Spring,
        x: 660.0 + rng.random_range(-10.0f32..=10.0),
        y: FLOOR_Y - 12.0,
        w: 48.0,
        h: 12.0,
    });

    for i in 0..NUM_SPIKES {
        geometry.push(GeometryConfig {
            kind: GeometryKind::Hazard,
            x: 300.0 + i as f32 * 240.0 + rng.random_range(-15.0f32..=15.0),
            y: FLOOR_Y - 14.0,
            w: 36.0,
            h: 14.0,
        });
    }

    geometry.push(GeometryConfig {
        kind: GeometryKind::Goal,
        x: WORLD_WIDTH - 70.0,
        y: FLOOR_Y - 64.0,
        w: 48.0,
        h: 64.0,
    });

    // Pick which platforms carry a number, then shuffle the numbers across them.
    let mut slots: Vec<usize> = (0..NUM_PLATFORMS).collect();
    slots.shuffle(&mut rng);
    slots.truncate(sequence.len());
    slots.sort_unstable();
    let mut values = sequence.clone();
    values.shuffle(&mut rng);

    let collectibles = slots
        .iter()
        .zip(values)
        .map(|(&slot, value)| {
            let top = platform_tops[slot];
            CollectibleConfig {
                value,
                x: top.x + PLATFORM_W / 2.0 - PICKUP_SIZE / 2.0,
                y: top.y - 40.0,
                w: PICKUP_SIZE,
                h: PICKUP_SIZE,
            }
        })
        .collect();

    LevelConfig {
        name: format!("Level {}", index + 1),
        target,
        sequence,
        lives: DEFAULT_LIVES,
        spawn: Vec2::new(40.0, FLOOR_Y - DEFAULT_PLAYER_SIZE.y),
        world_width: WORLD_WIDTH,
        floor_y: FLOOR_Y,
        player_size: DEFAULT_PLAYER_SIZE,
        geometry,
        collectibles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_follow_level_index() {
        assert_eq!(level_sequence(0), vec![1, 2, 3, 4]);
        assert_eq!(level_sequence(1), vec![5, 6, 7, 8]);
        assert_eq!(generate_level(0, 1).target, 10);
        assert_eq!(generate_level(1, 1).target, 26);
    }

    #[test]
    fn generation_reproducibility() {
        let a = generate_level(2, 12345);
        let b = generate_level(2, 12345);
        assert_eq!(a, b, "same index and seed must give the same level");

        let c = generate_level(2, 12346);
        assert_ne!(a.geometry, c.geometry, "different seeds should differ");
    }

    #[test]
    fn generated_level_builds() {
        let level = generate_level(0, 42).build().unwrap();
        assert_eq!(level.collectibles().len(), 4);
        assert_eq!(level.arena().surfaces.len(), NUM_PLATFORMS + 1);
        assert_eq!(level.arena().hazards.len(), NUM_SPIKES);
    }

    #[test]
    fn every_number_sits_on_a_platform() {
        let cfg = generate_level(3, 7);
        for c in &cfg.collectibles {
            let on_platform = cfg.geometry.iter().any(|g| {
                g.kind == GeometryKind::Platform
                    && c.x >= g.x
                    && c.x + c.w <= g.x + g.w
                    && (g.y - (c.y + c.h) - 16.0).abs() < 1e-3
            });
            assert!(on_platform, "pickup {} floats in the air", c.value);
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn generated_levels_always_validate(index in 0usize..50, seed in any::<u64>()) {
                let cfg = generate_level(index, seed);
                prop_assert!(cfg.build().is_ok());
            }
        }
    }
}
