use serde::Deserialize;

use crate::game_loop::{GameId, GameSessionConfig};

/// Runner configuration, loaded from `sumquest.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub game: GameId,
    /// Level catalog file. Without one, every level is generated.
    pub levels_path: Option<String>,
    /// Seed for generated levels, overriding the game config.
    pub seed: Option<u64>,
    /// Tick rate override in Hz, e.g. for slow-motion debugging.
    pub tick_rate_hz: Option<f32>,
    /// Start the first level as soon as the session spawns.
    pub autostart: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            game: GameId::NumberRun,
            levels_path: None,
            seed: None,
            tick_rate_hz: None,
            autostart: true,
        }
    }
}

impl RunnerConfig {
    /// Load from `SUMQUEST_RUNNER_CONFIG` (or `sumquest.toml`), then apply
    /// environment overrides. Falls back to defaults on any read or parse
    /// failure.
    pub fn load() -> Self {
        let path = std::env::var("SUMQUEST_RUNNER_CONFIG")
            .unwrap_or_else(|_| "sumquest.toml".to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<RunnerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {path}");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    RunnerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {path} found, using defaults");
                RunnerConfig::default()
            },
        };

        // Environment variable overrides
        if let Ok(levels) = std::env::var("SUMQUEST_LEVELS")
            && !levels.is_empty()
        {
            config.levels_path = Some(levels);
        }
        if let Ok(seed) = std::env::var("SUMQUEST_SEED") {
            match seed.parse() {
                Ok(seed) => config.seed = Some(seed),
                Err(e) => tracing::warn!("Ignoring SUMQUEST_SEED={seed}: {e}"),
            }
        }

        config.sanitize();
        config
    }

    /// Drop override values that would stall or flood the tick loop.
    pub fn sanitize(&mut self) {
        if let Some(rate) = self.tick_rate_hz
            && !(rate.is_finite() && rate > 0.0 && rate <= 1000.0)
        {
            tracing::warn!(rate, "tick_rate_hz out of range (0, 1000], ignoring");
            self.tick_rate_hz = None;
        }
    }

    pub fn session(&self) -> GameSessionConfig {
        GameSessionConfig {
            game_id: self.game,
            levels_path: self.levels_path.clone().map(Into::into),
            seed: self.seed,
            tick_rate_hz: self.tick_rate_hz,
            autostart: self.autostart,
        }
    }
}
