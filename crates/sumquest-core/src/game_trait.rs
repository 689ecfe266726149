use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Core trait that every SumQuest arcade game driver implements.
///
/// The host owns scheduling and presentation; the game owns all mutable
/// simulation state for one attempt and is the only writer of it.
pub trait ArcadeGame: Send {
    /// Game metadata for the mini-game picker.
    fn metadata(&self) -> GameMetadata;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Idle → Running on the current level.
    fn start(&mut self) -> Vec<GameEvent>;

    /// Discard the attempt and start the current level again.
    fn restart(&mut self) -> Vec<GameEvent>;

    /// Any phase → Idle, dropping in-flight progress.
    fn reset(&mut self);

    /// Won → Running on the next level. Ignored in any other phase.
    fn advance_level(&mut self) -> Vec<GameEvent>;

    /// Advance exactly one fixed tick. Returns the events it produced.
    fn update(&mut self, dt: f32) -> Vec<GameEvent>;

    /// Buffer an encoded input intent for the next tick.
    fn apply_input(&mut self, input: &[u8]);

    /// Encode the read-only per-tick snapshot for the presentation layer.
    fn encode_snapshot(&self) -> Result<Vec<u8>, rmp_serde::encode::Error>;

    /// Called when the host wants gameplay frozen (tab hidden, modal open).
    fn pause(&mut self);

    /// Called when gameplay should resume after a pause.
    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Current phase of the level attempt.
    fn phase(&self) -> LevelPhase;
}

/// Game metadata for the mini-game picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub estimated_level_duration: Duration,
}

/// Phase of one level attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    #[default]
    Idle,
    Running,
    Won,
    Failed,
}

impl LevelPhase {
    /// Won and Failed only leave through an explicit command.
    pub fn is_terminal(self) -> bool {
        matches!(self, LevelPhase::Won | LevelPhase::Failed)
    }
}

/// Events emitted by a game driver. Audio, badges, and HUD react to these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: usize },
    ItemCollected { value: u32, total: u64 },
    ItemRejected { value: u32, expected: Option<u32> },
    ScoreUpdate { score: i64 },
    LifeLost { remaining: u8 },
    LevelWon { level: usize },
    AttemptFailed { level: usize },
}

/// Generates the `ArcadeGame` methods that are identical across drivers:
/// `encode_snapshot`, `pause`, `resume`, `is_paused`, `phase`.
///
/// Requires the implementing struct to have `paused: bool` and
/// `phase: LevelPhase` fields and an inherent `snapshot()` method whose
/// return type is serializable.
#[macro_export]
macro_rules! arcade_game_boilerplate {
    () => {
        fn encode_snapshot(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
            rmp_serde::to_vec(&self.snapshot())
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn phase(&self) -> $crate::game_trait::LevelPhase {
            self.phase
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(!LevelPhase::Idle.is_terminal());
        assert!(!LevelPhase::Running.is_terminal());
        assert!(LevelPhase::Won.is_terminal());
        assert!(LevelPhase::Failed.is_terminal());
    }

    #[test]
    fn default_phase_is_idle() {
        assert_eq!(LevelPhase::default(), LevelPhase::Idle);
    }
}
