use std::fmt;

use glam::DVec3;
use serde::Serialize;
use voxelspace_ecs::{Entity, System, World};
use voxelspace_input::{InputSystem, Keyboard, Mouse, ScriptedWindow, WantsQuit, WindowProvider};
use voxelspace_mesh::{Mesh, MeshingSystem};
use voxelspace_render::{FrameStats, GpuMesh, HeadlessBackend, RenderBackend, RenderSystem};
use voxelspace_voxel::{VoxelMap, fill_heightfield};

use crate::{EngineConfig, EngineError, Player, PlayerSystem, Time, TimeSource, TimeSystem};

/// Where a new player stands before any input arrives.
const PLAYER_SPAWN: DVec3 = DVec3::new(0.0, 0.0, 8.0);

/// Outcome of [`Engine::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub ticks: u64,
    pub vertices: usize,
    pub indices: usize,
    pub frames_drawn: u64,
    pub frames_skipped: u64,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks: {}, vertices: {}, indices: {}, frames drawn: {}, frames skipped: {}",
            self.ticks, self.vertices, self.indices, self.frames_drawn, self.frames_skipped
        )
    }
}

/// Owns the world and runs its systems in a fixed order, one pass per tick.
pub struct Engine {
    world: World,
    systems: Vec<Box<dyn System>>,
    config: EngineConfig,
    ticks: u64,
    clock: Entity,
    player: Entity,
    map: Entity,
}

impl Engine {
    /// Validate `config`, spawn the clock, player and terrain entities, and
    /// register no systems.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut world = World::new();

        let clock = world.add_entity();
        world.add(clock, Time::default());
        world.add(clock, WantsQuit(false));
        world.add(clock, Keyboard::default());
        world.add(clock, Mouse::default());
        world.add(clock, FrameStats::default());

        let player = world.add_entity();
        world.add(player, Player::at(PLAYER_SPAWN));

        let mut map = VoxelMap::with_min_node_size(config.chunk_size, config.chunk_min_node_size)?;
        let placed = fill_heightfield(&mut map, &config.terrain)?;
        let map_entity = world.add_entity();
        world.add(map_entity, map);
        world.add(map_entity, Mesh::new());
        world.add(map_entity, GpuMesh::new());

        tracing::info!(
            chunk_size = config.chunk_size,
            voxels = placed,
            "engine created"
        );
        Ok(Self {
            world,
            systems: Vec::new(),
            config,
            ticks: 0,
            clock,
            player,
            map: map_entity,
        })
    }

    /// Full pipeline on a window that never closes by itself and the
    /// in-memory backend. Bound the run with `max_ticks`.
    pub fn headless(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_collaborators(config, ScriptedWindow::endless([]), HeadlessBackend::new())
    }

    /// Full pipeline: time, input, player, meshing, render. The built-in
    /// shaders are loaded into `backend` here.
    pub fn with_collaborators<W, B>(config: EngineConfig, window: W, backend: B) -> Result<Self, EngineError>
    where
        W: WindowProvider + 'static,
        B: RenderBackend + 'static,
    {
        let mut engine = Self::new(config)?;
        let time = TimeSource::from_step(engine.config.fixed_timestep_us);
        let player = PlayerSystem::new(engine.config.player_speed, engine.config.mouse_sensitivity);
        engine.add_system(TimeSystem::new(time));
        engine.add_system(InputSystem::new(window));
        engine.add_system(player);
        engine.add_system(MeshingSystem::new());
        engine.add_system(RenderSystem::new(backend)?);
        Ok(engine)
    }

    /// Append a system after every system already registered.
    pub fn add_system(&mut self, system: impl System + 'static) {
        tracing::debug!(system = system.name(), position = self.systems.len(), "system added");
        self.systems.push(Box::new(system));
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn clock_entity(&self) -> Entity {
        self.clock
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn map_entity(&self) -> Entity {
        self.map
    }

    pub fn player(&self) -> &Player {
        self.world.get::<Player>(self.player)
    }

    pub fn map(&self) -> &VoxelMap {
        self.world.get::<VoxelMap>(self.map)
    }

    pub fn mesh(&self) -> &Mesh {
        self.world.get::<Mesh>(self.map)
    }

    /// Run every system once, in order. Stops at the first failing system.
    pub fn tick(&mut self) -> Result<(), EngineError> {
        let _span = tracing::info_span!("engine_tick", tick = self.ticks).entered();
        for system in &mut self.systems {
            if let Err(err) = system.run(&mut self.world) {
                tracing::error!(%err, "tick aborted");
                return Err(err.into());
            }
        }
        self.ticks += 1;
        Ok(())
    }

    /// `true` until some entity's [`WantsQuit`] is set.
    pub fn should_run(&self) -> bool {
        self.world.all::<WantsQuit>(|_, quit| !quit.0)
    }

    /// Tick until something asks to quit or `max_ticks` is reached.
    pub fn run(&mut self) -> Result<RunReport, EngineError> {
        let max_ticks = self.config.max_ticks;
        tracing::info!(?max_ticks, systems = ?self.system_names(), "engine running");
        while self.should_run() && max_ticks.is_none_or(|max| self.ticks < max) {
            self.tick()?;
        }
        let report = self.report();
        tracing::info!(%report, "engine stopped");
        Ok(report)
    }

    pub fn report(&self) -> RunReport {
        let mesh = self.mesh();
        let stats = self
            .world
            .try_get::<FrameStats>(self.clock)
            .copied()
            .unwrap_or_default();
        RunReport {
            ticks: self.ticks,
            vertices: mesh.vertices.len(),
            indices: mesh.indices.len(),
            frames_drawn: stats.drawn,
            frames_skipped: stats.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use voxelspace_ecs::SystemError;
    use voxelspace_input::{InputFrame, Key};
    use voxelspace_voxel::TerrainConfig;

    use super::*;

    fn small_config() -> EngineConfig {
        EngineConfig {
            chunk_size: 8,
            fixed_timestep_us: Some(100_000),
            terrain: TerrainConfig {
                extent: 4,
                ..TerrainConfig::default()
            },
            ..EngineConfig::default()
        }
    }

    struct Recorder {
        name: &'static str,
    }

    impl System for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn run(&mut self, world: &mut World) -> Result<(), SystemError> {
            let logs: Vec<_> = world.view::<(Vec<&'static str>,)>().collect();
            for entity in logs {
                world.get_mut::<Vec<&'static str>>(entity).push(self.name);
            }
            Ok(())
        }
    }

    struct Failing;

    impl System for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn run(&mut self, _world: &mut World) -> Result<(), SystemError> {
            Err(SystemError::new("failing", "boom"))
        }
    }

    #[test]
    fn new_spawns_clock_player_and_terrain() {
        let engine = Engine::new(small_config()).unwrap();
        let world = engine.world();
        assert_eq!(world.entity_count(), 3);
        assert!(world.has::<Time>(engine.clock_entity()));
        assert!(world.has::<WantsQuit>(engine.clock_entity()));
        assert!(world.has::<Mouse>(engine.clock_entity()));
        assert_eq!(engine.player().position, PLAYER_SPAWN);
        assert_eq!(engine.map().voxel_count(), 16);
        assert!(engine.mesh().is_empty());
        assert!(engine.system_names().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            chunk_size: 12,
            ..EngineConfig::default()
        };
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn systems_run_in_insertion_order() {
        let mut engine = Engine::new(small_config()).unwrap();
        let log = engine.world_mut().add_entity();
        engine.world_mut().add(log, Vec::<&'static str>::new());
        engine.add_system(Recorder { name: "first" });
        engine.add_system(Recorder { name: "second" });
        engine.tick().unwrap();
        engine.tick().unwrap();
        assert_eq!(
            engine.world().get::<Vec<&'static str>>(log),
            &vec!["first", "second", "first", "second"]
        );
        assert_eq!(engine.ticks(), 2);
    }

    #[test]
    fn failing_system_aborts_the_tick() {
        let mut engine = Engine::new(small_config()).unwrap();
        let log = engine.world_mut().add_entity();
        engine.world_mut().add(log, Vec::<&'static str>::new());
        engine.add_system(Failing);
        engine.add_system(Recorder { name: "after" });
        let err = engine.tick().unwrap_err();
        assert!(matches!(err, EngineError::System(_)));
        assert!(engine.world().get::<Vec<&'static str>>(log).is_empty());
        assert_eq!(engine.ticks(), 0);
    }

    #[test]
    fn headless_pipeline_order() {
        let engine = Engine::headless(small_config()).unwrap();
        assert_eq!(
            engine.system_names(),
            vec!["time", "input", "player", "meshing", "render"]
        );
    }

    #[test]
    fn run_stops_at_max_ticks() {
        let config = EngineConfig {
            max_ticks: Some(5),
            ..small_config()
        };
        let mut engine = Engine::headless(config).unwrap();
        let report = engine.run().unwrap();
        assert_eq!(report.ticks, 5);
        assert_eq!(report.frames_drawn, 5);
        assert_eq!(report.frames_skipped, 0);
        assert!(report.vertices > 0);
        assert_eq!(report.indices % 3, 0);
        assert_eq!(*engine.world().get::<Time>(engine.clock_entity()), Time {
            elapsed_us: 500_000,
            delta_us: 100_000,
        });
    }

    #[test]
    fn run_stops_when_window_closes() {
        let window = ScriptedWindow::new(vec![InputFrame::keys(&[Key::W]); 3]);
        let mut engine =
            Engine::with_collaborators(small_config(), window, HeadlessBackend::new()).unwrap();
        let report = engine.run().unwrap();
        // Three scripted frames, then the tick whose poll finds the script empty.
        assert_eq!(report.ticks, 4);
        assert!(!engine.should_run());
        // The last frame stays held on the closing tick: 4 ticks * 0.1 s * 10 units/s.
        let moved = engine.player().position - PLAYER_SPAWN;
        assert!(moved.abs_diff_eq(DVec3::new(0.0, 4.0, 0.0), 1e-9));
    }

    #[test]
    fn report_displays_every_counter() {
        let text = RunReport {
            ticks: 2,
            vertices: 24,
            indices: 36,
            frames_drawn: 1,
            frames_skipped: 1,
        }
        .to_string();
        assert!(text.contains("ticks: 2"));
        assert!(text.contains("frames skipped: 1"));
    }
}
