/// Chunk lifecycle. Values only increase while a slot keeps its coordinate;
/// they return to `Free` only on eviction.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ChunkState {
    Free = 0,
    Allocated = 1,
    Shaping = 2,
    Shaped = 3,
    Surfacing = 4,
    Surfaced = 5,
    Decorating = 6,
    Decorated = 7,
}

impl ChunkState {
    #[inline]
    pub fn from_u8(v: u8) -> ChunkState {
        match v {
            1 => ChunkState::Allocated,
            2 => ChunkState::Shaping,
            3 => ChunkState::Shaped,
            4 => ChunkState::Surfacing,
            5 => ChunkState::Surfaced,
            6 => ChunkState::Decorating,
            7 => ChunkState::Decorated,
            _ => ChunkState::Free,
        }
    }

    /// A stage body is running on some thread.
    #[inline]
    pub fn in_progress(self) -> bool {
        matches!(
            self,
            ChunkState::Shaping | ChunkState::Surfacing | ChunkState::Decorating
        )
    }

    /// The stage that moves a chunk out of this completed state.
    #[inline]
    pub fn next_stage(self) -> Option<Stage> {
        match self {
            ChunkState::Allocated => Some(Stage::Shape),
            ChunkState::Shaped => Some(Stage::Surface),
            ChunkState::Surfaced => Some(Stage::Decorate),
            _ => None,
        }
    }
}

/// One generation stage.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Stage {
    Shape,
    Surface,
    Decorate,
}

impl Stage {
    /// Completed state the chunk must be in before the stage starts.
    #[inline]
    pub fn from_state(self) -> ChunkState {
        match self {
            Stage::Shape => ChunkState::Allocated,
            Stage::Surface => ChunkState::Shaped,
            Stage::Decorate => ChunkState::Surfaced,
        }
    }

    /// Marker held while the stage body runs.
    #[inline]
    pub fn running(self) -> ChunkState {
        match self {
            Stage::Shape => ChunkState::Shaping,
            Stage::Surface => ChunkState::Surfacing,
            Stage::Decorate => ChunkState::Decorating,
        }
    }

    #[inline]
    pub fn done(self) -> ChunkState {
        match self {
            Stage::Shape => ChunkState::Shaped,
            Stage::Surface => ChunkState::Surfaced,
            Stage::Decorate => ChunkState::Decorated,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Shape => "shape",
            Stage::Surface => "surface",
            Stage::Decorate => "decorate",
        }
    }
}
