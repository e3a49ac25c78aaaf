use glam::IVec3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OctreeError {
    #[error("octree did not reach {position} after {attempts} growth steps")]
    GrowthLimitExceeded { position: IVec3, attempts: u32 },
    #[error("growing the octree toward {position} would overflow i32 geometry")]
    SizeOverflow { position: IVec3 },
}
