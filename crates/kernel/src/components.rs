use glam::DVec3;

/// Clock state in microseconds. `delta_us` is the time since the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Time {
    pub elapsed_us: u64,
    pub delta_us: u64,
}

impl Time {
    pub fn delta_seconds(&self) -> f64 {
        self.delta_us as f64 * 1e-6
    }
}

/// Camera-style player. `orientation` holds euler angles in radians:
/// `x` is pitch, `z` is yaw about the up axis, `y` stays zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Player {
    pub position: DVec3,
    pub orientation: DVec3,
}

impl Player {
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            orientation: DVec3::ZERO,
        }
    }
}
