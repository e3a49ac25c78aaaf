use std::time::Instant;

use voxelspace_ecs::{System, SystemError, World};

use crate::Time;

/// Where the clock reads time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    WallClock,
    /// Advance by exactly `step_us` every tick.
    FixedStep { step_us: u64 },
}

impl TimeSource {
    pub fn from_step(step_us: Option<u64>) -> Self {
        match step_us {
            Some(step_us) => Self::FixedStep { step_us },
            None => Self::WallClock,
        }
    }
}

/// Writes every [`Time`] component. Runs first in the tick.
///
/// The wall clock starts at the first tick, so that tick reports a zero delta.
#[derive(Debug)]
pub struct TimeSystem {
    source: TimeSource,
    started: Option<Instant>,
    elapsed_us: u64,
}

impl TimeSystem {
    pub fn new(source: TimeSource) -> Self {
        Self {
            source,
            started: None,
            elapsed_us: 0,
        }
    }

    pub fn source(&self) -> TimeSource {
        self.source
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    fn advance(&mut self) -> Time {
        let now_us = match self.source {
            TimeSource::FixedStep { step_us } => self.elapsed_us.saturating_add(step_us),
            TimeSource::WallClock => {
                let started = *self.started.get_or_insert_with(Instant::now);
                u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
            }
        };
        let delta_us = now_us.saturating_sub(self.elapsed_us);
        self.elapsed_us = now_us;
        Time {
            elapsed_us: now_us,
            delta_us,
        }
    }
}

impl System for TimeSystem {
    fn name(&self) -> &'static str {
        "time"
    }

    fn run(&mut self, world: &mut World) -> Result<(), SystemError> {
        let time = self.advance();
        let clocks: Vec<_> = world.view::<(Time,)>().collect();
        for entity in clocks {
            *world.get_mut::<Time>(entity) = time;
        }
        tracing::trace!(elapsed_us = time.elapsed_us, delta_us = time.delta_us, "clock advanced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_advances_exactly() {
        let mut world = World::new();
        let clock = world.add_entity();
        world.add(clock, Time::default());
        let mut system = TimeSystem::new(TimeSource::FixedStep { step_us: 16_000 });
        for _ in 0..3 {
            system.run(&mut world).unwrap();
        }
        assert_eq!(
            *world.get::<Time>(clock),
            Time {
                elapsed_us: 48_000,
                delta_us: 16_000
            }
        );
    }

    #[test]
    fn wall_clock_is_monotonic() {
        let mut world = World::new();
        let clock = world.add_entity();
        world.add(clock, Time::default());
        let mut system = TimeSystem::new(TimeSource::WallClock);
        system.run(&mut world).unwrap();
        let first = *world.get::<Time>(clock);
        std::thread::sleep(std::time::Duration::from_millis(2));
        system.run(&mut world).unwrap();
        let second = *world.get::<Time>(clock);
        assert!(second.elapsed_us >= first.elapsed_us + 2_000);
        assert_eq!(second.delta_us, second.elapsed_us - first.elapsed_us);
    }

    #[test]
    fn source_from_optional_step() {
        assert_eq!(TimeSource::from_step(None), TimeSource::WallClock);
        assert_eq!(
            TimeSource::from_step(Some(5)),
            TimeSource::FixedStep { step_us: 5 }
        );
    }

    #[test]
    fn delta_seconds() {
        let time = Time {
            elapsed_us: 0,
            delta_us: 250_000,
        };
        assert_eq!(time.delta_seconds(), 0.25);
    }
}
