use std::path::PathBuf;

use contractiq_api::ApiError;
use contractiq_core::ContractId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobStartError {
    #[error("analysis is already running for contract {0}")]
    AlreadyProcessing(ContractId),

    #[error("failed to start analysis for contract {id}: {source}")]
    Remote {
        id: ContractId,
        #[source]
        source: ApiError,
    },
}

/// A failed status fetch while polling. Transient failures are logged and
/// retried on the next tick; any other failure ends the poll.
#[derive(Debug, Error)]
#[error("status poll {attempt} for contract {id} failed: {source}")]
pub struct PollFetchError {
    pub id: ContractId,
    pub attempt: u32,
    #[source]
    pub source: ApiError,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("chat request failed: {0}")]
    Remote(#[from] ApiError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidSelection {
    #[error("select two contracts to compare")]
    Missing,

    #[error("cannot compare contract {0} with itself")]
    SameContract(ContractId),
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error(transparent)]
    InvalidSelection(#[from] InvalidSelection),

    #[error("comparison failed: {0}")]
    Remote(ApiError),
}

#[derive(Debug, Error)]
#[error("failed to delete contract {id}: {source}")]
pub struct DeleteError {
    pub id: ContractId,
    #[source]
    pub source: ApiError,
}

#[derive(Debug, Error)]
#[error("clause rewrite failed: {0}")]
pub struct RewriteError(#[from] pub ApiError);

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type {0:?}: expected .pdf or .docx")]
    UnsupportedType(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("upload failed: {0}")]
    Remote(#[from] ApiError),
}
