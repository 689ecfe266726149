//! Session smoke tests: drive a real tick loop through the command channel
//! and read back decoded snapshots.

use std::time::Duration;

use tokio::sync::mpsc;

use sumquest_core::game_trait::{GameEvent, LevelPhase};
use sumquest_platformer::Snapshot;
use sumquest_platformer::input::Intent;
use sumquest_runner::game_loop::{
    GameBroadcast, GameCommand, GameId, GameRegistry, GameSessionConfig, spawn_game_session,
};

const LEVELS: &str = r#"
[[levels]]
name = "Straight line"
target = 3
sequence = [1, 2]
lives = 2
spawn = { x = 40.0, y = 552.0 }
world_width = 800.0
floor_y = 600.0

[[levels.geometry]]
kind = "goal"
x = 400.0
y = 536.0
w = 48.0
h = 64.0

[[levels.collectibles]]
value = 1
x = 120.0
y = 560.0
w = 24.0
h = 24.0

[[levels.collectibles]]
value = 2
x = 220.0
y = 560.0
w = 24.0
h = 24.0
"#;

fn generated_session() -> GameSessionConfig {
    GameSessionConfig {
        game_id: GameId::NumberRun,
        levels_path: None,
        seed: Some(11),
        tick_rate_hz: Some(120.0),
        autostart: true,
    }
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<GameBroadcast>) -> GameBroadcast {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("should receive within timeout")
        .expect("channel should not be closed")
}

async fn next_snapshot(rx: &mut mpsc::UnboundedReceiver<GameBroadcast>) -> Snapshot {
    loop {
        if let GameBroadcast::Snapshot(data) = recv(rx).await {
            return rmp_serde::from_slice(&data).expect("should decode");
        }
    }
}

async fn stop_and_expect_end(
    cmd_tx: &mpsc::UnboundedSender<GameCommand>,
    rx: &mut mpsc::UnboundedReceiver<GameBroadcast>,
) {
    let _ = cmd_tx.send(GameCommand::Stop);
    loop {
        if matches!(recv(rx).await, GameBroadcast::GameEnded) {
            return;
        }
    }
}

#[tokio::test]
async fn session_streams_snapshots_until_stopped() {
    let registry = GameRegistry::new();
    let (cmd_tx, mut rx, handle) =
        spawn_game_session(&registry, generated_session()).expect("should spawn");

    match recv(&mut rx).await {
        GameBroadcast::Event(GameEvent::LevelStarted { level }) => assert_eq!(level, 0),
        other => panic!("first broadcast should be LevelStarted, got {other:?}"),
    }

    let first = next_snapshot(&mut rx).await;
    assert_eq!(first.phase, LevelPhase::Running);
    assert_eq!(first.target, 10);
    assert_eq!(first.next_expected, Some(1));
    assert_eq!(first.lives, 3);

    let second = next_snapshot(&mut rx).await;
    assert!(second.tick > first.tick, "one tick per snapshot");

    stop_and_expect_end(&cmd_tx, &mut rx).await;
    handle.await.expect("loop should exit cleanly");
}

#[tokio::test]
async fn input_moves_the_player() {
    let registry = GameRegistry::new();
    let (cmd_tx, mut rx, handle) =
        spawn_game_session(&registry, generated_session()).expect("should spawn");

    let start_x = next_snapshot(&mut rx).await.player.x;
    let right = Intent {
        move_right: true,
        ..Default::default()
    };
    let _ = cmd_tx.send(GameCommand::Input(rmp_serde::to_vec(&right).unwrap()));

    let mut moved = false;
    for _ in 0..30 {
        if next_snapshot(&mut rx).await.player.x > start_x {
            moved = true;
            break;
        }
    }
    assert!(moved, "held right intent should move the player");

    stop_and_expect_end(&cmd_tx, &mut rx).await;
    let _ = handle.await;
}

#[tokio::test]
async fn catalog_level_can_be_won_and_advanced() {
    let dir = std::env::temp_dir().join(format!("sumquest-smoke-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("levels.toml");
    std::fs::write(&path, LEVELS).unwrap();

    let registry = GameRegistry::new();
    let config = GameSessionConfig {
        levels_path: Some(path),
        ..generated_session()
    };
    let (cmd_tx, mut rx, handle) = spawn_game_session(&registry, config).expect("should spawn");

    let right = Intent {
        move_right: true,
        ..Default::default()
    };
    let _ = cmd_tx.send(GameCommand::Input(rmp_serde::to_vec(&right).unwrap()));

    // 2.5 px per tick at 120 Hz, about 130 ticks to the goal.
    let mut won = false;
    for _ in 0..600 {
        if let GameBroadcast::Event(GameEvent::LevelWon { level: 0 }) = recv(&mut rx).await {
            won = true;
            break;
        }
    }
    assert!(won, "walking right should collect 1, 2 and reach the goal");

    let _ = cmd_tx.send(GameCommand::NextLevel);
    let mut advanced = false;
    for _ in 0..600 {
        if let GameBroadcast::Event(GameEvent::LevelStarted { level: 1 }) = recv(&mut rx).await {
            advanced = true;
            break;
        }
    }
    assert!(advanced, "past the catalog a generated level starts");
    let snap = next_snapshot(&mut rx).await;
    assert_eq!(snap.level_index, 1);
    assert_eq!(snap.target, 26);

    stop_and_expect_end(&cmd_tx, &mut rx).await;
    let _ = handle.await;
    std::fs::remove_dir_all(&dir).ok();
}
