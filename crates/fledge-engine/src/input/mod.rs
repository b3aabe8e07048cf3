//! Polled input state, sampled once per frame boundary.
//!
//! The windowing layer feeds raw key/mouse transitions in; game code asks
//! "is this key down" / "was it just pressed". `step()` rolls the frame
//! boundary, turning this frame's state into the previous one.

use glam::Vec2;

/// The keys the engine cares about. Deliberately small; the windowing
/// layer maps its own scancodes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Space,
    Enter,
    Escape,
}

impl Key {
    const COUNT: usize = 11;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    const COUNT: usize = 3;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone)]
pub struct Input {
    keys: [bool; Key::COUNT],
    keys_previous: [bool; Key::COUNT],
    buttons: [bool; MouseButton::COUNT],
    buttons_previous: [bool; MouseButton::COUNT],
    mouse: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self {
            keys: [false; Key::COUNT],
            keys_previous: [false; Key::COUNT],
            buttons: [false; MouseButton::COUNT],
            buttons_previous: [false; MouseButton::COUNT],
            mouse: Vec2::ZERO,
        }
    }

    // -- feeding, called by the windowing layer --

    pub fn key_down(&mut self, key: Key) {
        self.keys[key.index()] = true;
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys[key.index()] = false;
    }

    pub fn mouse_move(&mut self, position: Vec2) {
        self.mouse = position;
    }

    pub fn mouse_button(&mut self, button: MouseButton, down: bool) {
        self.buttons[button.index()] = down;
    }

    /// Roll the frame boundary. Call once per frame, after events are
    /// applied and before the world update.
    pub fn step(&mut self) {
        self.keys_previous = self.keys;
        self.buttons_previous = self.buttons;
    }

    // -- queries, called by game code --

    pub fn down(&self, key: Key) -> bool {
        self.keys[key.index()]
    }

    /// True only on the first frame a key is held.
    pub fn pressed(&self, key: Key) -> bool {
        self.keys[key.index()] && !self.keys_previous[key.index()]
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse
    }

    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button.index()] && !self.buttons_previous[button.index()]
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_fires_once_per_press() {
        let mut input = Input::new();
        input.key_down(Key::Space);
        assert!(input.pressed(Key::Space));
        assert!(input.down(Key::Space));

        input.step();
        assert!(!input.pressed(Key::Space));
        assert!(input.down(Key::Space));

        input.key_up(Key::Space);
        input.step();
        input.key_down(Key::Space);
        assert!(input.pressed(Key::Space));
    }

    #[test]
    fn mouse_state_tracks_position_and_buttons() {
        let mut input = Input::new();
        input.mouse_move(Vec2::new(12.0, 34.0));
        input.mouse_button(MouseButton::Left, true);

        assert_eq!(input.mouse_position(), Vec2::new(12.0, 34.0));
        assert!(input.mouse_pressed(MouseButton::Left));
        input.step();
        assert!(input.mouse_down(MouseButton::Left));
        assert!(!input.mouse_pressed(MouseButton::Left));
    }
}
