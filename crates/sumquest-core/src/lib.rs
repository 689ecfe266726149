pub mod game_trait;
pub mod geometry;
pub mod input;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{ArcadeGame, GameEvent, LevelPhase};

    /// Run N fixed ticks, returning all accumulated events.
    pub fn run_game_ticks(game: &mut dyn ArcadeGame, n: usize, dt: f32) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt));
        }
        all_events
    }

    /// Assert that the game's encoded snapshot differs from `before`.
    pub fn assert_snapshot_changed(game: &dyn ArcadeGame, before: &[u8]) {
        let after = game.encode_snapshot().expect("snapshot must encode");
        assert_ne!(
            before,
            &after[..],
            "Snapshot should have changed after operation"
        );
    }

    // ================================================================
    // Driver Contract Tests
    // ================================================================
    // Every ArcadeGame implementation must pass these. Game crates call
    // them from their own #[cfg(test)] modules with a fresh driver.

    /// start() must move an idle driver to Running and announce the level.
    pub fn contract_start_enters_running(game: &mut dyn ArcadeGame) {
        assert_eq!(game.phase(), LevelPhase::Idle, "fresh driver must be Idle");
        let events = game.start();
        assert_eq!(game.phase(), LevelPhase::Running);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::LevelStarted { .. })),
            "start() must emit LevelStarted"
        );
    }

    /// update() while Idle must neither emit events nor change the snapshot.
    pub fn contract_idle_update_is_noop(game: &mut dyn ArcadeGame) {
        game.reset();
        let before = game.encode_snapshot().expect("snapshot must encode");
        let events = game.update(1.0 / game.tick_rate());
        assert!(events.is_empty(), "Idle update must not emit events");
        let after = game.encode_snapshot().expect("snapshot must encode");
        assert_eq!(before, after, "Idle update must not change state");
    }

    /// A running tick must advance the snapshot (tick counter at least).
    pub fn contract_update_advances_state(game: &mut dyn ArcadeGame) {
        game.reset();
        game.start();
        let before = game.encode_snapshot().expect("snapshot must encode");
        game.update(1.0 / game.tick_rate());
        assert_snapshot_changed(game, &before);
    }

    /// pause() must freeze updates, resume() must unfreeze them.
    pub fn contract_pause_stops_updates(game: &mut dyn ArcadeGame) {
        game.reset();
        game.start();
        game.pause();
        assert!(game.is_paused());
        let before = game.encode_snapshot().expect("snapshot must encode");
        game.update(1.0 / game.tick_rate());
        let during_pause = game.encode_snapshot().expect("snapshot must encode");
        assert_eq!(before, during_pause, "State must not change while paused");

        game.resume();
        game.update(1.0 / game.tick_rate());
        assert_snapshot_changed(game, &during_pause);
    }

    /// reset() must return to Idle from any phase.
    pub fn contract_reset_returns_to_idle(game: &mut dyn ArcadeGame) {
        game.start();
        game.update(1.0 / game.tick_rate());
        game.reset();
        assert_eq!(game.phase(), LevelPhase::Idle);
    }

    /// advance_level() outside Won must be ignored.
    pub fn contract_advance_requires_win(game: &mut dyn ArcadeGame) {
        game.reset();
        assert!(game.advance_level().is_empty());
        assert_eq!(game.phase(), LevelPhase::Idle);
        game.start();
        assert!(game.advance_level().is_empty());
        assert_eq!(game.phase(), LevelPhase::Running);
    }
}
