use std::fmt;

use glam::IVec3;
use serde::Serialize;
use voxelspace_common::BoundingBox;
use voxelspace_kernel::Engine;
use voxelspace_mesh::Mesh;
use voxelspace_voxel::VoxelMap;

/// Read-only queries against a [`VoxelMap`].
pub struct MapInspector;

impl MapInspector {
    pub fn summary(map: &VoxelMap) -> MapSummary {
        let mut summary = MapSummary {
            chunk_size: map.chunk_size(),
            chunks: map.chunk_count(),
            ..MapSummary::default()
        };
        for chunk in map.chunks() {
            for leaf in chunk.iter() {
                summary.voxels += 1;
                if leaf.value.is_block() {
                    summary.blocks += 1;
                } else {
                    summary.density_voxels += 1;
                }
            }
        }
        summary
    }

    /// Voxel stored at `pos`, with the chunk that owns it.
    pub fn inspect_voxel(map: &VoxelMap, pos: IVec3) -> Option<VoxelInfo> {
        map.try_get_voxel(pos).map(|voxel| VoxelInfo {
            position: pos.to_array(),
            chunk: map.world_to_chunk(pos).to_array(),
            is_block: voxel.is_block(),
            density: voxel.density,
            color: voxel.color,
        })
    }

    /// Every chunk in ascending coordinate order.
    pub fn list_chunks(map: &VoxelMap) -> Vec<ChunkInfo> {
        map.sorted_chunks()
            .into_iter()
            .map(|chunk| ChunkInfo {
                coord: chunk.coord().to_array(),
                voxels: chunk.len(),
                bounds: chunk.octree().max_bounds(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MapSummary {
    pub chunk_size: i32,
    pub chunks: usize,
    pub voxels: usize,
    pub blocks: usize,
    pub density_voxels: usize,
}

impl fmt::Display for MapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Map: chunk_size={} chunks={} voxels={} blocks={} density={}",
            self.chunk_size, self.chunks, self.voxels, self.blocks, self.density_voxels
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoxelInfo {
    pub position: [i32; 3],
    pub chunk: [i32; 3],
    pub is_block: bool,
    pub density: u8,
    pub color: [u8; 4],
}

impl fmt::Display for VoxelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.position;
        let [cx, cy, cz] = self.chunk;
        let kind = if self.is_block { "block" } else { "density" };
        write!(
            f,
            "Voxel ({x}, {y}, {z}) in chunk ({cx}, {cy}, {cz}): {kind} density={} color={:?}",
            self.density, self.color
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkInfo {
    pub coord: [i32; 3],
    pub voxels: usize,
    /// Current extent of the chunk's octree root.
    pub bounds: BoundingBox,
}

impl fmt::Display for ChunkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.coord;
        write!(f, "Chunk ({x}, {y}, {z}) voxels={}", self.voxels)
    }
}

pub struct MeshInspector;

impl MeshInspector {
    pub fn summary(mesh: &Mesh) -> MeshSummary {
        MeshSummary {
            vertices: mesh.vertices.len(),
            indices: mesh.indices.len(),
            triangles: mesh.triangle_count(),
            vertex_bytes: mesh.vertex_bytes().len(),
            index_bytes: mesh.index_bytes().len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MeshSummary {
    pub vertices: usize,
    pub indices: usize,
    pub triangles: usize,
    pub vertex_bytes: usize,
    pub index_bytes: usize,
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mesh: vertices={} indices={} triangles={} bytes={}",
            self.vertices,
            self.indices,
            self.triangles,
            self.vertex_bytes + self.index_bytes
        )
    }
}

pub struct EngineInspector;

impl EngineInspector {
    pub fn summary(engine: &Engine) -> EngineSummary {
        let player = engine.player();
        EngineSummary {
            ticks: engine.ticks(),
            entities: engine.world().entity_count(),
            systems: engine.system_names(),
            player_position: player.position.to_array(),
            player_orientation: player.orientation.to_array(),
            map: MapInspector::summary(engine.map()),
            mesh: MeshInspector::summary(engine.mesh()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSummary {
    pub ticks: u64,
    pub entities: usize,
    pub systems: Vec<&'static str>,
    pub player_position: [f64; 3],
    pub player_orientation: [f64; 3],
    pub map: MapSummary,
    pub mesh: MeshSummary,
}

impl fmt::Display for EngineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.player_position;
        writeln!(
            f,
            "Engine: ticks={} entities={} systems=[{}]",
            self.ticks,
            self.entities,
            self.systems.join(", ")
        )?;
        writeln!(f, "Player: pos=({x:.2}, {y:.2}, {z:.2})")?;
        writeln!(f, "{}", self.map)?;
        write!(f, "{}", self.mesh)
    }
}
