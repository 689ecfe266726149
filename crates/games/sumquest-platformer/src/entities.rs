use serde::{Deserialize, Serialize};

use sumquest_core::geometry::{Aabb, Vec2};

/// Horizontal facing, kept for sprite flipping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The player body. Position is the top-left corner of its AABB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub facing: Facing,
    pub is_jumping: bool,
    pub is_on_ground: bool,
}

impl PlayerBody {
    /// A body at rest on the spawn point.
    pub fn at_spawn(spawn: Vec2, size: Vec2) -> Self {
        Self {
            x: spawn.x,
            y: spawn.y,
            vx: 0.0,
            vy: 0.0,
            width: size.x,
            height: size.y,
            facing: Facing::Right,
            is_jumping: false,
            is_on_ground: true,
        }
    }

    pub fn respawn(&mut self, spawn: Vec2) {
        self.x = spawn.x;
        self.y = spawn.y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.is_jumping = false;
        self.is_on_ground = true;
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Solid surface the player can stand on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Aabb,
}

/// Surface that launches the player upward on landing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringPad {
    pub rect: Aabb,
}

/// Anything the player can land on, in level-declared order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Surface {
    Platform(Platform),
    Spring(SpringPad),
}

impl Surface {
    pub fn rect(&self) -> &Aabb {
        match self {
            Surface::Platform(p) => &p.rect,
            Surface::Spring(s) => &s.rect,
        }
    }
}

/// Touching one costs a life and sends the player back to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub rect: Aabb,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub rect: Aabb,
}

/// A numbered pickup. Its value is its identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub value: u32,
    pub rect: Aabb,
    pub collected: bool,
}

impl Collectible {
    pub fn new(value: u32, rect: Aabb) -> Self {
        Self {
            value,
            rect,
            collected: false,
        }
    }
}
