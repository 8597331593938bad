//! Worker orchestration: the bounded task queue, the worker pool, the chunk
//! task pipeline and the world facade.
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod handoff;
mod pipeline;
pub mod pool;
pub mod queue;
pub mod task;

pub use config::{RuntimeConfig, load_runtime_config_from_path};
pub use context::WorldContext;
pub use error::RuntimeError;
pub use handoff::{HandoffItem, MeshUpload};
pub use pool::WorkerPool;
pub use queue::{SendError, TryRecvError, TrySendError, WorkQueue};
pub use task::{ChunkTask, TaskMode};
