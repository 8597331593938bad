use tessera_chunk::ChunkCoord;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TaskMode {
    /// Generate to decorated, then mesh.
    Load,
    /// Mesh a decorated chunk, resuming a persisted pass when there is one.
    Mesh,
    /// Generate to decorated; optionally mesh another chunk afterwards.
    Generate { then_mesh: Option<ChunkCoord> },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChunkTask {
    pub coord: ChunkCoord,
    pub mode: TaskMode,
}

impl ChunkTask {
    pub fn load(coord: ChunkCoord) -> Self {
        Self {
            coord,
            mode: TaskMode::Load,
        }
    }

    pub fn mesh(coord: ChunkCoord) -> Self {
        Self {
            coord,
            mode: TaskMode::Mesh,
        }
    }

    pub fn generate(coord: ChunkCoord, then_mesh: Option<ChunkCoord>) -> Self {
        Self {
            coord,
            mode: TaskMode::Generate { then_mesh },
        }
    }
}
