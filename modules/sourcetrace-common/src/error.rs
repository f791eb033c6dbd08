use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceTraceError {
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Branch timed out after {0} seconds")]
    BranchTimeout(u64),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
