//! Engine kernel: configuration, the clock and player systems, and the tick
//! loop that runs every system in a fixed order.
//!
//! # Invariants
//! - Systems run once per tick, in the order they were added.
//! - The first system error aborts the tick and is returned to the caller.
//! - The loop stops after the first tick in which any `WantsQuit` is set.

mod components;
mod config;
mod engine;
mod error;
mod player;
mod time;

pub use components::{Player, Time};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, RunReport};
pub use error::EngineError;
pub use player::{PITCH_LIMIT, PlayerSystem};
pub use time::{TimeSource, TimeSystem};
pub use voxelspace_input::WantsQuit;

pub fn crate_info() -> &'static str {
    "voxelspace-kernel v0.1.0"
}
