use glam::{DVec2, DVec3};

use crate::{Key, WindowProvider};

/// Movement intent read from the keyboard this tick.
///
/// `x` is right (D - A), `y` is forward (W - S), `z` is up (Space - ShiftLeft).
/// Each axis is -1, 0 or 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Keyboard {
    pub movement: DVec3,
}

impl Keyboard {
    pub fn movement_from(window: &impl WindowProvider) -> DVec3 {
        let axis = |positive: Key, negative: Key| {
            f64::from(u8::from(window.is_key_pressed(positive)))
                - f64::from(u8::from(window.is_key_pressed(negative)))
        };
        DVec3::new(
            axis(Key::D, Key::A),
            axis(Key::W, Key::S),
            axis(Key::Space, Key::ShiftLeft),
        )
    }
}

/// Pointer state. `delta` is the motion since the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mouse {
    pub position: DVec2,
    pub delta: DVec2,
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

/// Set when the engine should stop after the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WantsQuit(pub bool);
