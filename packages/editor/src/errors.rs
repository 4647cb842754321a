//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Transaction was built against version {base}, session is at {current}")]
    StaleTransaction { base: u64, current: u64 },

    #[error("Selection {anchor}..{head} is outside the document (size {size})")]
    InvalidSelection { anchor: usize, head: usize, size: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
