use serde::{Deserialize, Serialize};

use sumquest_core::input::{InputState, TAP};

const LEFT_KEYS: &[&str] = &["ArrowLeft", "KeyA"];
const RIGHT_KEYS: &[&str] = &["ArrowRight", "KeyD"];
const JUMP_KEYS: &[&str] = &["Space", "ArrowUp", "KeyW", TAP];

/// Discrete per-tick intent produced by an input adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub move_left: bool,
    pub move_right: bool,
    /// Edge-triggered: acted on once, only when the player can jump.
    pub jump_pressed: bool,
}

impl Intent {
    /// Horizontal axis in {-1, 0, 1}. Opposite keys cancel out.
    pub fn axis(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Intents arriving between ticks, consumed atomically at the next tick.
///
/// Movement is last-writer-wins. A jump press is latched so that a press
/// and release landing between two ticks is not lost.
#[derive(Debug, Default)]
pub struct IntentBuffer {
    pending: Option<Intent>,
}

impl IntentBuffer {
    pub fn push(&mut self, intent: Intent) {
        match &mut self.pending {
            Some(existing) => {
                existing.move_left = intent.move_left;
                existing.move_right = intent.move_right;
                if intent.jump_pressed {
                    existing.jump_pressed = true;
                }
            },
            None => self.pending = Some(intent),
        }
    }

    /// Take the intent for this tick. Held movement carries over, the jump
    /// edge does not.
    pub fn take(&mut self) -> Intent {
        let intent = self.pending.unwrap_or_default();
        self.pending = Some(Intent {
            jump_pressed: false,
            ..intent
        });
        intent
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// Keyboard/tap adapter: arrows or A/D to move, Space/Up/W or a tap to jump.
pub fn intent_from_keys(input: &InputState) -> Intent {
    Intent {
        move_left: input.any_down(LEFT_KEYS),
        move_right: input.any_down(RIGHT_KEYS),
        jump_pressed: input.any_just_pressed(JUMP_KEYS),
    }
}
