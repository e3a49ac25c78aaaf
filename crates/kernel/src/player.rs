use std::f64::consts::{PI, TAU};

use glam::{DQuat, DVec3, EulerRot};
use voxelspace_ecs::{System, SystemError, World};
use voxelspace_input::{Keyboard, Mouse};

use crate::{Player, Time};

/// Pitch stays strictly inside straight up and straight down.
pub const PITCH_LIMIT: f64 = PI / 2.01;

/// Moves and turns every [`Player`] from the input entity's keyboard, mouse
/// and clock.
///
/// Lateral movement follows the facing direction (pitch included); vertical
/// movement is always along +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSystem {
    /// Units per second.
    pub speed: f64,
    /// Radians per pixel.
    pub sensitivity: f64,
}

impl Default for PlayerSystem {
    fn default() -> Self {
        Self {
            speed: 10.0,
            sensitivity: 0.01,
        }
    }
}

impl PlayerSystem {
    pub fn new(speed: f64, sensitivity: f64) -> Self {
        Self { speed, sensitivity }
    }

    /// Apply one tick of input to `player`. Movement uses the orientation the
    /// player had at the start of the tick.
    pub fn step(&self, player: &mut Player, time: &Time, mouse: &Mouse, keyboard: &Keyboard) {
        let rotation = facing(player.orientation);
        let lateral = rotation * DVec3::new(keyboard.movement.x, keyboard.movement.y, 0.0);
        let movement = lateral + DVec3::new(0.0, 0.0, keyboard.movement.z);
        player.position += movement * time.delta_seconds() * self.speed;

        let pitch = (player.orientation.x - mouse.delta.y * self.sensitivity)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let yaw = (player.orientation.z - mouse.delta.x * self.sensitivity).rem_euclid(TAU);
        player.orientation = DVec3::new(pitch, 0.0, yaw);
    }
}

/// Yaw about Z, then pitch about the turned X axis.
fn facing(orientation: DVec3) -> DQuat {
    DQuat::from_euler(EulerRot::ZXY, orientation.z, orientation.x, orientation.y)
}

impl System for PlayerSystem {
    fn name(&self) -> &'static str {
        "player"
    }

    fn run(&mut self, world: &mut World) -> Result<(), SystemError> {
        let inputs: Vec<_> = world
            .view::<(Time, Mouse, Keyboard)>()
            .map(|entity| {
                (
                    *world.get::<Time>(entity),
                    *world.get::<Mouse>(entity),
                    *world.get::<Keyboard>(entity),
                )
            })
            .collect();
        let players: Vec<_> = world.view::<(Player,)>().collect();

        for (time, mouse, keyboard) in &inputs {
            for &entity in &players {
                self.step(world.get_mut::<Player>(entity), time, mouse, keyboard);
            }
        }
        Ok(())
    }
}
