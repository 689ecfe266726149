use sumquest_platformer::Snapshot;
use sumquest_runner::config::RunnerConfig;
use sumquest_runner::game_loop::{GameBroadcast, GameRegistry, spawn_game_session};
use sumquest_runner::stdin::{phase_hint, run_stdin_adapter};

/// Log a HUD line once per this many snapshots.
const HUD_EVERY: u64 = 60;

#[tokio::main]
async fn main() {
    sumquest_runner::init_tracing();

    tracing::info!("SumQuest runner starting");
    let config = RunnerConfig::load();
    let registry = GameRegistry::new();

    let (cmd_tx, mut broadcast_rx, handle) =
        match spawn_game_session(&registry, config.session()) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to start game session: {e}");
                std::process::exit(1);
            },
        };

    tokio::spawn(run_stdin_adapter(cmd_tx));

    let mut snapshots: u64 = 0;
    let mut last_phase = None;
    while let Some(msg) = broadcast_rx.recv().await {
        match msg {
            GameBroadcast::Event(event) => tracing::info!(?event, "game event"),
            GameBroadcast::Snapshot(data) => {
                snapshots += 1;
                let snap = match rmp_serde::from_slice::<Snapshot>(&data) {
                    Ok(snap) => snap,
                    Err(e) => {
                        tracing::warn!("Failed to decode snapshot: {e}");
                        continue;
                    },
                };
                if last_phase != Some(snap.phase) {
                    last_phase = Some(snap.phase);
                    if let Some(hint) = phase_hint(snap.phase) {
                        tracing::info!("{hint}");
                    }
                }
                if snapshots % HUD_EVERY == 0 {
                    tracing::info!(
                        level = %snap.level_name,
                        phase = ?snap.phase,
                        lives = snap.lives,
                        score = snap.score,
                        total = snap.collected_total,
                        target = snap.target,
                        next = ?snap.next_expected,
                        x = snap.player.x,
                        y = snap.player.y,
                        "hud"
                    );
                }
            },
            GameBroadcast::GameEnded => break,
        }
    }

    let _ = handle.await;
    tracing::info!("SumQuest runner stopped");
}
