use serde::{Deserialize, Serialize};

use sumquest_core::geometry::finite_or;

use crate::entities::{Collectible, Facing, PlayerBody, Surface};
use crate::error::LevelError;
use crate::input::Intent;
use crate::level::Arena;

/// Gravity acceleration (units/s^2, downward is +y).
pub const GRAVITY: f32 = 1800.0;
/// Horizontal move speed (units/s).
pub const MOVE_SPEED: f32 = 300.0;
/// Vertical velocity set by a jump (negative is up).
pub const JUMP_IMPULSE: f32 = -650.0;
/// Vertical velocity set by landing on a spring pad.
pub const SPRING_IMPULSE: f32 = -1000.0;
/// Maximum fall speed.
pub const TERMINAL_VELOCITY: f32 = 900.0;
/// How far the feet may already be below a surface top and still land on it.
pub const LAND_TOLERANCE: f32 = 4.0;
/// Fixed simulation rate.
pub const TICK_RATE_HZ: f32 = 60.0;

/// Configurable physics parameters, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub move_speed: f32,
    pub jump_impulse: f32,
    pub spring_impulse: f32,
    pub terminal_velocity: f32,
    pub land_tolerance: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            move_speed: MOVE_SPEED,
            jump_impulse: JUMP_IMPULSE,
            spring_impulse: SPRING_IMPULSE,
            terminal_velocity: TERMINAL_VELOCITY,
            land_tolerance: LAND_TOLERANCE,
        }
    }
}

impl PhysicsConfig {
    /// Reject values that would make the step unstable.
    pub fn validate(&self) -> Result<(), LevelError> {
        let fields = [
            ("gravity", self.gravity),
            ("move_speed", self.move_speed),
            ("jump_impulse", self.jump_impulse),
            ("spring_impulse", self.spring_impulse),
            ("terminal_velocity", self.terminal_velocity),
            ("land_tolerance", self.land_tolerance),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LevelError::InvalidPhysics(format!(
                "{name} must be finite, got {value}"
            )));
        }
        if self.gravity <= 0.0 || self.terminal_velocity <= 0.0 {
            return Err(LevelError::InvalidPhysics(
                "gravity and terminal_velocity must be positive (downward)".to_string(),
            ));
        }
        if self.jump_impulse >= 0.0 || self.spring_impulse >= 0.0 {
            return Err(LevelError::InvalidPhysics(
                "jump_impulse and spring_impulse must be negative (upward)".to_string(),
            ));
        }
        if self.move_speed < 0.0 || self.land_tolerance < 0.0 {
            return Err(LevelError::InvalidPhysics(
                "move_speed and land_tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberRunConfig {
    pub physics: PhysicsConfig,
    pub tick_rate_hz: f32,
    /// Score per unit of collectible value.
    pub points_per_unit: i64,
    /// Score per life left when a level is won.
    pub life_bonus: i64,
    /// Seed for levels generated past the end of the catalog.
    pub seed: u64,
}

impl Default for NumberRunConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            tick_rate_hz: TICK_RATE_HZ,
            points_per_unit: 10,
            life_bonus: 50,
            seed: 42,
        }
    }
}

impl NumberRunConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is
    /// missing, unparseable, or fails validation.
    pub fn load() -> Self {
        let path = std::env::var("SUMQUEST_GAME_CONFIG")
            .unwrap_or_else(|_| "config/number_run.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to load {path}: {e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LevelError> {
        let cfg: Self = toml::from_str(content).map_err(|source| LevelError::Parse {
            path: "<game config>".to_string(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Physics plus the tick rate, which must give a finite positive `dt`.
    pub fn validate(&self) -> Result<(), LevelError> {
        self.physics.validate()?;
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(LevelError::InvalidPhysics(format!(
                "tick_rate_hz must be positive, got {}",
                self.tick_rate_hz
            )));
        }
        Ok(())
    }
}

/// Contact produced by one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Contact {
    LandedOnPlatform { index: usize },
    BouncedOnSpring { index: usize },
    LandedOnFloor,
    HitHazard { index: usize },
    ReachedGoal,
    TouchedCollectible { index: usize, value: u32 },
}

/// Next player state plus everything it touched this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub player: PlayerBody,
    pub contacts: Vec<Contact>,
}

impl StepOutcome {
    pub fn hit_hazard(&self) -> bool {
        self.contacts
            .iter()
            .any(|c| matches!(c, Contact::HitHazard { .. }))
    }

    pub fn reached_goal(&self) -> bool {
        self.contacts.contains(&Contact::ReachedGoal)
    }
}

/// Advance the player by exactly one fixed tick.
///
/// Pure: reads the current body, static geometry, the uncollected pickups,
/// and the tick's intent. Lives, scoring, and the pickup order are the
/// driver's business.
pub fn step(
    current: &PlayerBody,
    arena: &Arena,
    collectibles: &[Collectible],
    intent: Intent,
    physics: &PhysicsConfig,
    dt: f32,
) -> StepOutcome {
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
    let mut p = sanitize(*current, arena);
    let mut contacts = Vec::new();

    let axis = intent.axis();
    if axis < 0.0 {
        p.facing = Facing::Left;
    } else if axis > 0.0 {
        p.facing = Facing::Right;
    }

    if intent.jump_pressed && p.is_on_ground && !p.is_jumping {
        p.vy = physics.jump_impulse;
        p.is_jumping = true;
        p.is_on_ground = false;
    }

    // Gravity
    if !p.is_on_ground {
        p.vy = (p.vy + physics.gravity * dt).min(physics.terminal_velocity);
    }

    // Integrate
    let prev_bottom = p.bottom();
    p.vx = axis * physics.move_speed;
    p.x += p.vx * dt;
    p.y += p.vy * dt;
    p.is_on_ground = false;

    // Level bounds
    p.x = p.x.clamp(0.0, (arena.world_width - p.width).max(0.0));

    let landed = resolve_landing(&mut p, prev_bottom, arena, physics, &mut contacts);

    // World floor
    if !landed && p.bottom() >= arena.floor_y {
        p.y = arena.floor_y - p.height;
        p.vy = 0.0;
        p.is_jumping = false;
        p.is_on_ground = true;
        contacts.push(Contact::LandedOnFloor);
    }

    let body = p.aabb();
    if let Some(index) = arena.hazards.iter().position(|h| h.rect.overlaps(&body)) {
        tracing::debug!(index, x = p.x, y = p.y, "player hit hazard");
        p.respawn(arena.spawn);
        contacts.push(Contact::HitHazard { index });
        return StepOutcome {
            player: p,
            contacts,
        };
    }

    if arena.goal.rect.overlaps(&body) {
        contacts.push(Contact::ReachedGoal);
    }

    for (index, c) in collectibles.iter().enumerate() {
        if !c.collected && c.rect.overlaps(&body) {
            contacts.push(Contact::TouchedCollectible {
                index,
                value: c.value,
            });
        }
    }

    StepOutcome {
        player: p,
        contacts,
    }
}

/// Land on the first surface (declared order) the feet crossed this tick.
fn resolve_landing(
    p: &mut PlayerBody,
    prev_bottom: f32,
    arena: &Arena,
    physics: &PhysicsConfig,
    contacts: &mut Vec<Contact>,
) -> bool {
    if p.vy < 0.0 {
        return false;
    }
    let body = p.aabb();
    let hit = arena.surfaces.iter().enumerate().find(|(_, s)| {
        let top = s.rect().top();
        body.overlaps_horizontally(s.rect())
            && prev_bottom <= top + physics.land_tolerance
            && p.bottom() >= top
    });
    let Some((index, surface)) = hit else {
        return false;
    };

    p.y = surface.rect().top() - p.height;
    p.is_on_ground = true;
    match surface {
        Surface::Platform(_) => {
            p.vy = 0.0;
            p.is_jumping = false;
            contacts.push(Contact::LandedOnPlatform { index });
        },
        Surface::Spring(_) => {
            p.vy = physics.spring_impulse;
            p.is_jumping = true;
            contacts.push(Contact::BouncedOnSpring { index });
        },
    }
    true
}

/// Clamp malformed numbers instead of letting them poison later ticks.
fn sanitize(mut p: PlayerBody, arena: &Arena) -> PlayerBody {
    if !(p.x.is_finite() && p.y.is_finite()) {
        tracing::warn!("non-finite player position, respawning");
        p.respawn(arena.spawn);
    }
    p.vx = finite_or(p.vx, 0.0);
    p.vy = finite_or(p.vy, 0.0);
    p
}
