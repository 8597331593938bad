use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime is shutting down")]
    ShutdownInProgress,
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to load texture atlas: {0}")]
    Atlas(String),
}
