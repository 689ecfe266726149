use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sumquest_core::geometry::{Aabb, Vec2};

use crate::entities::{Collectible, Goal, Hazard, Platform, SpringPad, Surface};
use crate::error::LevelError;

/// Lives per attempt when the level file does not say otherwise.
pub const DEFAULT_LIVES: u8 = 3;
/// Player AABB size when the level file does not say otherwise.
pub const DEFAULT_PLAYER_SIZE: Vec2 = Vec2::new(32.0, 48.0);

/// Kind of a static rectangle in a level file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Platform,
    Spring,
    Hazard,
    Goal,
}

/// One static rectangle. Hit-box padding is part of the rectangle itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub kind: GeometryKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl GeometryConfig {
    pub fn rect(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectibleConfig {
    pub value: u32,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Level description as written in a TOML level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    pub target: u64,
    /// Values in the order they must be collected.
    pub sequence: Vec<u32>,
    #[serde(default = "default_lives")]
    pub lives: u8,
    pub spawn: Vec2,
    pub world_width: f32,
    /// y of the ground plane; nothing falls below it.
    pub floor_y: f32,
    #[serde(default = "default_player_size")]
    pub player_size: Vec2,
    /// Platforms and springs are landed on in the order listed here.
    #[serde(default)]
    pub geometry: Vec<GeometryConfig>,
    pub collectibles: Vec<CollectibleConfig>,
}

fn default_lives() -> u8 {
    DEFAULT_LIVES
}

fn default_player_size() -> Vec2 {
    DEFAULT_PLAYER_SIZE
}

/// A file holding several levels as `[[levels]]` tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelCatalog {
    pub levels: Vec<LevelConfig>,
}

/// Static geometry the simulation step collides against.
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    pub surfaces: Vec<Surface>,
    pub hazards: Vec<Hazard>,
    pub goal: Goal,
    pub spawn: Vec2,
    pub world_width: f32,
    pub floor_y: f32,
}

/// A validated level. Only `LevelConfig::build` creates one.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    name: String,
    target: u64,
    sequence: Vec<u32>,
    lives: u8,
    player_size: Vec2,
    arena: Arena,
    collectibles: Vec<Collectible>,
}

impl Level {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn sequence(&self) -> &[u32] {
        &self.sequence
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn player_size(&self) -> Vec2 {
        self.player_size
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Fresh, uncollected pickups for a new attempt.
    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }
}

impl LevelConfig {
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, LevelError> {
        toml::from_str(content).map_err(|source| LevelError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Read and validate a single level file.
    pub fn load(path: impl AsRef<Path>) -> Result<Level, LevelError> {
        let path = path.as_ref();
        let content = read_file(path)?;
        Self::from_toml_str(&content, &path.display().to_string())?.build()
    }

    /// Validate the description and produce a playable level.
    pub fn build(&self) -> Result<Level, LevelError> {
        let level = self.name.clone();

        if self.sequence.is_empty() {
            return Err(LevelError::EmptySequence { level });
        }
        let sum: u64 = self.sequence.iter().map(|&v| u64::from(v)).sum();
        if sum != self.target {
            return Err(LevelError::TargetMismatch {
                level,
                target: self.target,
                sum,
            });
        }
        if self.lives == 0 {
            return Err(LevelError::NoLives { level });
        }
        self.check_world()?;

        let mut surfaces = Vec::new();
        let mut hazards = Vec::new();
        let mut goals = Vec::new();
        for g in &self.geometry {
            let rect = g.rect();
            let entity = match g.kind {
                GeometryKind::Platform => "platform",
                GeometryKind::Spring => "spring",
                GeometryKind::Hazard => "hazard",
                GeometryKind::Goal => "goal",
            };
            self.check_rect(entity, rect)?;
            match g.kind {
                GeometryKind::Platform => surfaces.push(Surface::Platform(Platform { rect })),
                GeometryKind::Spring => surfaces.push(Surface::Spring(SpringPad { rect })),
                GeometryKind::Hazard => hazards.push(Hazard { rect }),
                GeometryKind::Goal => goals.push(Goal { rect }),
            }
        }
        let goal = match goals.as_slice() {
            [goal] => *goal,
            _ => {
                return Err(LevelError::GoalCount {
                    level,
                    found: goals.len(),
                });
            },
        };

        let mut collectibles = Vec::with_capacity(self.collectibles.len());
        for c in &self.collectibles {
            let rect = Aabb::new(c.x, c.y, c.w, c.h);
            self.check_rect("collectible", rect)?;
            collectibles.push(Collectible::new(c.value, rect));
        }
        self.check_sequence_is_collectible(&collectibles)?;

        let spawn_box = Aabb::new(
            self.spawn.x,
            self.spawn.y,
            self.player_size.x,
            self.player_size.y,
        );
        if hazards.iter().any(|h| h.rect.overlaps(&spawn_box)) {
            return Err(LevelError::InvalidSpawn {
                level,
                reason: "spawn overlaps a hazard".to_string(),
            });
        }

        Ok(Level {
            name: self.name.clone(),
            target: self.target,
            sequence: self.sequence.clone(),
            lives: self.lives,
            player_size: self.player_size,
            arena: Arena {
                surfaces,
                hazards,
                goal,
                spawn: self.spawn,
                world_width: self.world_width,
                floor_y: self.floor_y,
            },
            collectibles,
        })
    }

    fn check_world(&self) -> Result<(), LevelError> {
        let invalid_world = |reason: String| LevelError::InvalidWorld {
            level: self.name.clone(),
            reason,
        };
        if !(self.world_width.is_finite() && self.world_width > 0.0) {
            return Err(invalid_world(format!(
                "world_width must be positive, got {}",
                self.world_width
            )));
        }
        if !(self.floor_y.is_finite() && self.floor_y > 0.0) {
            return Err(invalid_world(format!(
                "floor_y must be positive, got {}",
                self.floor_y
            )));
        }
        let size = self.player_size;
        if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(invalid_world(format!("player size {size:?} is invalid")));
        }
        if size.x > self.world_width || size.y > self.floor_y {
            return Err(invalid_world("player does not fit in the world".to_string()));
        }

        let spawn = self.spawn;
        let max_x = self.world_width - size.x;
        let max_y = self.floor_y - size.y;
        if !spawn.is_finite() || spawn.x < 0.0 || spawn.x > max_x || spawn.y > max_y {
            return Err(LevelError::InvalidSpawn {
                level: self.name.clone(),
                reason: format!("{:?} is outside the world", self.spawn),
            });
        }
        Ok(())
    }

    fn check_rect(&self, entity: &'static str, rect: Aabb) -> Result<(), LevelError> {
        if rect.is_finite() && !rect.is_degenerate() {
            Ok(())
        } else {
            Err(LevelError::InvalidRect {
                level: self.name.clone(),
                entity,
                rect,
            })
        }
    }

    /// Every value in the sequence needs its own pickup, or the level can
    /// never be completed.
    fn check_sequence_is_collectible(&self, collectibles: &[Collectible]) -> Result<(), LevelError> {
        let mut available: HashMap<u32, usize> = HashMap::new();
        for c in collectibles {
            *available.entry(c.value).or_insert(0) += 1;
        }
        let mut needed: HashMap<u32, usize> = HashMap::new();
        for &v in &self.sequence {
            *needed.entry(v).or_insert(0) += 1;
        }
        let mut shortfalls: Vec<(u32, usize, usize)> = needed
            .into_iter()
            .map(|(value, n)| (value, n, available.get(&value).copied().unwrap_or(0)))
            .filter(|&(_, n, found)| found < n)
            .collect();
        shortfalls.sort_unstable();
        match shortfalls.first() {
            Some(&(value, needed, found)) => Err(LevelError::MissingCollectible {
                level: self.name.clone(),
                value,
                needed,
                found,
            }),
            None => Ok(()),
        }
    }
}

/// Read and validate every level in a catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Level>, LevelError> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let catalog: LevelCatalog = toml::from_str(&content).map_err(|source| LevelError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    let levels = catalog
        .levels
        .iter()
        .map(LevelConfig::build)
        .collect::<Result<Vec<_>, _>>()?;
    if levels.is_empty() {
        return Err(LevelError::EmptyCatalog);
    }
    tracing::info!(path = %path.display(), count = levels.len(), "loaded level catalog");
    Ok(levels)
}

fn read_file(path: &Path) -> Result<String, LevelError> {
    std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })
}
