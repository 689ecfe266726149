use std::collections::HashSet;

/// Pseudo key code recorded for a touch/tap on the play area.
pub const TAP: &str = "Tap";

/// Raw keyboard/tap state, fed from device events between ticks.
///
/// Game-specific adapters read this once per tick and turn it into
/// discrete intents.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_down: HashSet<String>,
    /// Keys pressed since the last `end_tick` (cleared each tick).
    keys_just_pressed: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key down event. Auto-repeat does not re-trigger a press.
    pub fn on_key_down(&mut self, code: impl Into<String>) {
        let code = code.into();
        if self.keys_down.insert(code.clone()) {
            self.keys_just_pressed.insert(code);
        }
    }

    pub fn on_key_up(&mut self, code: &str) {
        self.keys_down.remove(code);
    }

    /// A tap is a press with no hold.
    pub fn on_tap(&mut self) {
        self.keys_just_pressed.insert(TAP.to_string());
    }

    /// Drop every held key, e.g. when the page loses focus.
    pub fn release_all(&mut self) {
        self.keys_down.clear();
    }

    pub fn is_key_down(&self, code: &str) -> bool {
        self.keys_down.contains(code)
    }

    pub fn is_key_just_pressed(&self, code: &str) -> bool {
        self.keys_just_pressed.contains(code)
    }

    pub fn any_down(&self, codes: &[&str]) -> bool {
        codes.iter().any(|c| self.is_key_down(c))
    }

    pub fn any_just_pressed(&self, codes: &[&str]) -> bool {
        codes.iter().any(|c| self.is_key_just_pressed(c))
    }

    /// Clear per-tick state. Call after the tick has sampled the input.
    pub fn end_tick(&mut self) {
        self.keys_just_pressed.clear();
    }
}
