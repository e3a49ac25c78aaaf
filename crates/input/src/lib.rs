//! Window/input provider contract and the components it feeds.
//!
//! # Invariants
//! - The window is polled exactly once per tick, before anything reads input.
//! - Systems never see raw platform events, only [`Keyboard`], [`Mouse`] and
//!   [`WantsQuit`] components.

mod components;
mod scripted;
mod system;
mod window;

pub use components::{Keyboard, Mouse, WantsQuit};
pub use scripted::{InputFrame, ScriptedWindow};
pub use system::InputSystem;
pub use window::{Key, MouseButton, WindowProvider};

pub fn crate_info() -> &'static str {
    "voxelspace-input v0.1.0"
}
