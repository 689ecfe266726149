use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use sumquest_core::game_trait::{ArcadeGame, GameEvent};
use sumquest_platformer::NumberRun;
use sumquest_platformer::error::LevelError;
use sumquest_platformer::level::load_catalog;
use sumquest_platformer::physics::NumberRunConfig;

/// Games the runner knows how to host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    #[default]
    NumberRun,
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameId::NumberRun => f.write_str("number-run"),
        }
    }
}

/// Commands sent from an input adapter or host UI to the tick loop.
#[derive(Debug)]
pub enum GameCommand {
    /// Encoded intent, forwarded to `ArcadeGame::apply_input`.
    Input(Vec<u8>),
    Start,
    Restart,
    Reset,
    NextLevel,
    Pause,
    Resume,
    Stop,
}

/// Messages from the tick loop to the presentation layer.
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    /// Encoded snapshot for one tick. `Bytes` so fan-out clones are cheap.
    Snapshot(Bytes),
    Event(GameEvent),
    /// The loop has exited.
    GameEnded,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no game registered for {0}")]
    UnknownGame(GameId),
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Configuration for one hosted game session.
#[derive(Debug, Clone, Default)]
pub struct GameSessionConfig {
    pub game_id: GameId,
    pub levels_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub tick_rate_hz: Option<f32>,
    pub autostart: bool,
}

type GameFactory = fn(&GameSessionConfig) -> Result<Box<dyn ArcadeGame>, SessionError>;

/// Registry mapping game IDs to factory functions.
pub struct GameRegistry {
    factories: HashMap<GameId, GameFactory>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.factories.insert(GameId::NumberRun, create_number_run);
        registry
    }

    pub fn create(&self, config: &GameSessionConfig) -> Result<Box<dyn ArcadeGame>, SessionError> {
        let factory = self
            .factories
            .get(&config.game_id)
            .ok_or(SessionError::UnknownGame(config.game_id))?;
        factory(config)
    }

    /// Return the number of registered game types.
    pub fn available_games(&self) -> usize {
        self.factories.len()
    }
}

fn create_number_run(session: &GameSessionConfig) -> Result<Box<dyn ArcadeGame>, SessionError> {
    let mut config = NumberRunConfig::load();
    if let Some(seed) = session.seed {
        config.seed = seed;
    }
    if let Some(rate) = session.tick_rate_hz {
        config.tick_rate_hz = rate;
    }
    config.validate()?;
    let game = match &session.levels_path {
        Some(path) => NumberRun::with_levels(load_catalog(path)?, config)?,
        None => NumberRun::generated(config)?,
    };
    Ok(Box::new(game))
}

/// Spawn a game tick loop as a tokio task.
/// Returns the command sender and broadcast receiver.
pub fn spawn_game_session(
    registry: &GameRegistry,
    config: GameSessionConfig,
) -> Result<
    (
        mpsc::UnboundedSender<GameCommand>,
        mpsc::UnboundedReceiver<GameBroadcast>,
        JoinHandle<()>,
    ),
    SessionError,
> {
    let mut game = registry.create(&config)?;
    tracing::info!(game = %config.game_id, "spawning game session");

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        run_game_tick_loop(&mut *game, config.autostart, cmd_rx, broadcast_tx).await;
    });

    Ok((cmd_tx, broadcast_rx, handle))
}

fn send_events(tx: &mpsc::UnboundedSender<GameBroadcast>, events: Vec<GameEvent>) {
    for event in events {
        let _ = tx.send(GameBroadcast::Event(event));
    }
}

/// One fixed tick per interval; commands are applied between ticks.
async fn run_game_tick_loop(
    game: &mut dyn ArcadeGame,
    autostart: bool,
    mut cmd_rx: mpsc::UnboundedReceiver<GameCommand>,
    broadcast_tx: mpsc::UnboundedSender<GameBroadcast>,
) {
    if autostart {
        send_events(&broadcast_tx, game.start());
    }

    let tick_rate = game.tick_rate();
    let dt = 1.0 / tick_rate;
    let mut interval = tokio::time::interval(Duration::from_secs_f32(dt));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = game.update(dt);
                send_events(&broadcast_tx, events);

                match game.encode_snapshot() {
                    Ok(data) => {
                        let _ = broadcast_tx.send(GameBroadcast::Snapshot(Bytes::from(data)));
                    },
                    Err(e) => tracing::error!(error = %e, "Failed to encode snapshot"),
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(GameCommand::Input(data)) => game.apply_input(&data),
                    Some(GameCommand::Start) => send_events(&broadcast_tx, game.start()),
                    Some(GameCommand::Restart) => send_events(&broadcast_tx, game.restart()),
                    Some(GameCommand::Reset) => game.reset(),
                    Some(GameCommand::NextLevel) => {
                        send_events(&broadcast_tx, game.advance_level());
                    },
                    Some(GameCommand::Pause) => game.pause(),
                    Some(GameCommand::Resume) => game.resume(),
                    Some(GameCommand::Stop) | None => break,
                }
            }
        }
    }

    tracing::info!("game session ended");
    let _ = broadcast_tx.send(GameBroadcast::GameEnded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumquest_core::game_trait::LevelPhase;
    use sumquest_platformer::Snapshot;

    fn session(autostart: bool) -> GameSessionConfig {
        GameSessionConfig {
            game_id: GameId::NumberRun,
            levels_path: None,
            seed: Some(3),
            tick_rate_hz: Some(120.0),
            autostart,
        }
    }

    async fn next_snapshot(rx: &mut mpsc::UnboundedReceiver<GameBroadcast>) -> Snapshot {
        loop {
            match rx.recv().await.expect("channel should stay open") {
                GameBroadcast::Snapshot(data) => {
                    return rmp_serde::from_slice(&data).expect("should decode");
                },
                GameBroadcast::Event(_) => continue,
                GameBroadcast::GameEnded => panic!("session ended early"),
            }
        }
    }

    #[test]
    fn registry_creates_number_run() {
        let registry = GameRegistry::new();
        assert_eq!(registry.available_games(), 1);
        let game = registry.create(&session(false)).expect("should create");
        assert_eq!(game.tick_rate(), 120.0);
        assert_eq!(game.phase(), LevelPhase::Idle);
    }

    #[test]
    fn missing_catalog_is_reported() {
        let registry = GameRegistry::new();
        let config = GameSessionConfig {
            levels_path: Some(PathBuf::from("no/such/levels.toml")),
            ..session(false)
        };
        assert!(matches!(
            registry.create(&config),
            Err(SessionError::Level(LevelError::Io { .. }))
        ));
    }

    #[tokio::test]
    async fn bad_tick_rate_override_is_rejected() {
        let registry = GameRegistry::new();
        for rate in [0.0, -60.0, f32::NAN] {
            let config = GameSessionConfig {
                tick_rate_hz: Some(rate),
                ..session(true)
            };
            assert!(
                matches!(
                    registry.create(&config),
                    Err(SessionError::Level(LevelError::InvalidPhysics(_)))
                ),
                "tick rate {rate} should be rejected"
            );
            assert!(spawn_game_session(&registry, config).is_err());
        }
    }

    #[tokio::test]
    async fn idle_session_waits_for_start() {
        let registry = GameRegistry::new();
        let (cmd_tx, mut rx, handle) =
            spawn_game_session(&registry, session(false)).expect("should spawn");

        let snap = next_snapshot(&mut rx).await;
        assert_eq!(snap.phase, LevelPhase::Idle);
        assert_eq!(snap.tick, 0);

        let _ = cmd_tx.send(GameCommand::Start);
        let mut started = false;
        while let Some(msg) = rx.recv().await {
            if let GameBroadcast::Event(GameEvent::LevelStarted { level: 0 }) = msg {
                started = true;
                break;
            }
        }
        assert!(started, "Start must announce the level");
        assert_eq!(next_snapshot(&mut rx).await.phase, LevelPhase::Running);

        let _ = cmd_tx.send(GameCommand::Stop);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn pause_freezes_tick_counter() {
        let registry = GameRegistry::new();
        let (cmd_tx, mut rx, handle) =
            spawn_game_session(&registry, session(true)).expect("should spawn");

        let mut previous = next_snapshot(&mut rx).await.tick;
        let _ = cmd_tx.send(GameCommand::Pause);
        // A tick or two may land before the command; wait for the counter to stall.
        let mut frozen = None;
        for _ in 0..10 {
            let tick = next_snapshot(&mut rx).await.tick;
            if tick == previous {
                frozen = Some(tick);
                break;
            }
            previous = tick;
        }
        let frozen = frozen.expect("tick counter should stop while paused");
        for _ in 0..3 {
            assert_eq!(next_snapshot(&mut rx).await.tick, frozen);
        }

        let _ = cmd_tx.send(GameCommand::Resume);
        let mut resumed = false;
        for _ in 0..10 {
            if next_snapshot(&mut rx).await.tick > frozen {
                resumed = true;
                break;
            }
        }
        assert!(resumed, "ticks must continue after Resume");

        let _ = cmd_tx.send(GameCommand::Stop);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn dropping_sender_ends_session() {
        let registry = GameRegistry::new();
        let (cmd_tx, mut rx, handle) =
            spawn_game_session(&registry, session(true)).expect("should spawn");
        drop(cmd_tx);

        let mut ended = false;
        while let Some(msg) = rx.recv().await {
            if matches!(msg, GameBroadcast::GameEnded) {
                ended = true;
                break;
            }
        }
        assert!(ended);
        handle.await.expect("loop should exit cleanly");
    }
}
