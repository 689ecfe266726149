pub mod entities;
pub mod error;
pub mod input;
pub mod level;
pub mod level_gen;
pub mod physics;
pub mod scoring;
pub mod sequence;

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sumquest_core::arcade_game_boilerplate;
use sumquest_core::game_trait::{ArcadeGame, GameEvent, GameMetadata, LevelPhase};

use entities::{Collectible, PlayerBody};
use error::LevelError;
use input::{Intent, IntentBuffer};
use level::Level;
use level_gen::generate_level;
use physics::{Contact, NumberRunConfig, step};
use sequence::{Collection, SequenceValidator};

/// Read-only view of one tick, handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub level_index: usize,
    pub level_name: String,
    pub phase: LevelPhase,
    pub player: PlayerBody,
    /// Pickups still on the board.
    pub collectibles: Vec<Collectible>,
    pub lives: u8,
    pub score: i64,
    pub collected_total: u64,
    pub target: u64,
    pub next_expected: Option<u32>,
}

/// The "large numbers" platformer: collect the numbers in order, then
/// reach the goal.
pub struct NumberRun {
    config: NumberRunConfig,
    /// Hand-authored levels. Past the end, levels are generated from the seed.
    catalog: Vec<Level>,
    level_index: usize,
    level: Level,
    phase: LevelPhase,
    paused: bool,
    player: PlayerBody,
    collectibles: Vec<Collectible>,
    validator: SequenceValidator,
    lives: u8,
    score: i64,
    tick: u64,
    intents: IntentBuffer,
    /// Pickups overlapped last tick, so a rejection is reported once per touch.
    touching: HashSet<usize>,
}

impl NumberRun {
    /// A run over hand-authored levels.
    pub fn with_levels(levels: Vec<Level>, config: NumberRunConfig) -> Result<Self, LevelError> {
        let Some(first) = levels.first().cloned() else {
            return Err(LevelError::EmptyCatalog);
        };
        Self::from_parts(levels, first, config)
    }

    /// A run made only of generated levels.
    pub fn generated(config: NumberRunConfig) -> Result<Self, LevelError> {
        let first = generate_level(0, config.seed).build()?;
        Self::from_parts(Vec::new(), first, config)
    }

    fn from_parts(
        catalog: Vec<Level>,
        level: Level,
        config: NumberRunConfig,
    ) -> Result<Self, LevelError> {
        config.validate()?;
        let mut run = Self {
            config,
            catalog,
            level_index: 0,
            player: PlayerBody::at_spawn(level.arena().spawn, level.player_size()),
            collectibles: Vec::new(),
            validator: SequenceValidator::new(Vec::new()),
            lives: 0,
            level,
            phase: LevelPhase::Idle,
            paused: false,
            score: 0,
            tick: 0,
            intents: IntentBuffer::default(),
            touching: HashSet::new(),
        };
        run.reset_attempt();
        Ok(run)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            level_index: self.level_index,
            level_name: self.level.name().to_string(),
            phase: self.phase,
            player: self.player,
            collectibles: self
                .collectibles
                .iter()
                .filter(|c| !c.collected)
                .copied()
                .collect(),
            lives: self.lives,
            score: self.score,
            collected_total: self.validator.total(),
            target: self.level.target(),
            next_expected: self.validator.expected(),
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Queue an intent for the next tick.
    pub fn push_intent(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Put everything for the current level back to its initial state.
    fn reset_attempt(&mut self) {
        self.player = PlayerBody::at_spawn(self.level.arena().spawn, self.level.player_size());
        self.collectibles = self.level.collectibles().to_vec();
        if self.validator.sequence() == self.level.sequence() {
            self.validator.reset();
        } else {
            self.validator = SequenceValidator::new(self.level.sequence().to_vec());
        }
        self.lives = self.level.lives();
        self.score = 0;
        self.tick = 0;
        self.intents.clear();
        self.touching.clear();
    }

    fn begin(&mut self) -> Vec<GameEvent> {
        self.reset_attempt();
        self.phase = LevelPhase::Running;
        tracing::info!(
            level = self.level_index,
            level_name = self.level.name(),
            target = self.level.target(),
            "level started"
        );
        vec![GameEvent::LevelStarted {
            level: self.level_index,
        }]
    }

    fn level_for(&self, index: usize) -> Result<Level, LevelError> {
        match self.catalog.get(index) {
            Some(level) => Ok(level.clone()),
            None => generate_level(index, self.config.seed).build(),
        }
    }

    fn lose_life(&mut self, events: &mut Vec<GameEvent>) {
        self.lives = self.lives.saturating_sub(1);
        self.touching.clear();
        events.push(GameEvent::LifeLost {
            remaining: self.lives,
        });
        if self.lives == 0 {
            self.phase = LevelPhase::Failed;
            tracing::info!(level = self.level_index, "attempt failed");
            events.push(GameEvent::AttemptFailed {
                level: self.level_index,
            });
        }
    }

    fn collect_touched(&mut self, touched: &[(usize, u32)], events: &mut Vec<GameEvent>) {
        let mut now_touching = HashSet::with_capacity(touched.len());
        for &(index, value) in touched {
            match self.validator.attempt_collect(value) {
                Collection::Accepted { value, remaining } => {
                    if let Some(c) = self.collectibles.get_mut(index) {
                        c.collected = true;
                    }
                    self.score = self
                        .score
                        .saturating_add(scoring::pickup_score(value, self.config.points_per_unit));
                    tracing::debug!(value, remaining, "collectible accepted");
                    events.push(GameEvent::ItemCollected {
                        value,
                        total: self.validator.total(),
                    });
                    events.push(GameEvent::ScoreUpdate { score: self.score });
                },
                Collection::Rejected { expected } => {
                    now_touching.insert(index);
                    if !self.touching.contains(&index) {
                        tracing::debug!(value, ?expected, "collectible out of order");
                        events.push(GameEvent::ItemRejected { value, expected });
                    }
                },
            }
        }
        self.touching = now_touching;
    }

    fn win(&mut self, events: &mut Vec<GameEvent>) {
        self.phase = LevelPhase::Won;
        self.score = self.score.saturating_add(scoring::level_bonus(
            self.lives,
            self.config.life_bonus,
        ));
        tracing::info!(
            level = self.level_index,
            score = self.score,
            lives = self.lives,
            "level won"
        );
        events.push(GameEvent::ScoreUpdate { score: self.score });
        events.push(GameEvent::LevelWon {
            level: self.level_index,
        });
    }
}

impl ArcadeGame for NumberRun {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Number Run".to_string(),
            description: "Collect the numbers in order, then reach the flag!".to_string(),
            estimated_level_duration: Duration::from_secs(60),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn start(&mut self) -> Vec<GameEvent> {
        if self.phase != LevelPhase::Idle {
            return Vec::new();
        }
        self.begin()
    }

    fn restart(&mut self) -> Vec<GameEvent> {
        self.reset();
        self.begin()
    }

    fn reset(&mut self) {
        self.reset_attempt();
        self.phase = LevelPhase::Idle;
    }

    fn advance_level(&mut self) -> Vec<GameEvent> {
        if self.phase != LevelPhase::Won {
            return Vec::new();
        }
        let next = self.level_index + 1;
        match self.level_for(next) {
            Ok(level) => {
                self.level = level;
                self.level_index = next;
                self.begin()
            },
            Err(e) => {
                tracing::error!(level = next, "failed to prepare next level: {e}");
                Vec::new()
            },
        }
    }

    fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.paused || self.phase != LevelPhase::Running {
            return Vec::new();
        }
        self.tick += 1;
        let intent = self.intents.take();
        let outcome = step(
            &self.player,
            self.level.arena(),
            &self.collectibles,
            intent,
            &self.config.physics,
            dt,
        );
        self.player = outcome.player;

        let mut events = Vec::new();
        if outcome.hit_hazard() {
            self.lose_life(&mut events);
            return events;
        }

        let touched: Vec<(usize, u32)> = outcome
            .contacts
            .iter()
            .filter_map(|c| match *c {
                Contact::TouchedCollectible { index, value } => Some((index, value)),
                _ => None,
            })
            .collect();
        self.collect_touched(&touched, &mut events);

        // Pickups first, so the last number and the goal can land on the same tick.
        if outcome.reached_goal() && self.validator.is_complete() {
            self.win(&mut events);
        }

        events
    }

    fn apply_input(&mut self, input: &[u8]) {
        match rmp_serde::from_slice::<Intent>(input) {
            Ok(intent) => self.intents.push(intent),
            Err(e) => tracing::warn!("dropping undecodable input: {e}"),
        }
    }

    arcade_game_boilerplate!();
}
