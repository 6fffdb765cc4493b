//! Backend boundary: the request/response operations the client consumes.
//!
//! Everything behind this trait (extraction, risk scoring, retrieval, storage)
//! is the analysis service's business. Views hold an `Arc<dyn Backend>` so tests
//! can substitute a scripted backend for [`HttpBackend`].

mod error;
pub use error::ApiError;

mod wire;
pub use wire::{CorpusAnswer, DocumentAnswer, JobAck, UploadReceipt};

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpBackend;

use async_trait::async_trait;
use contractiq_core::{Analytics, ComparisonResult, Contract, ContractId, RewriteResult};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Upload a document; returns the created contract.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<Contract, ApiError>;

    /// Start an analysis job for a contract.
    async fn start_analysis(&self, id: ContractId) -> Result<JobAck, ApiError>;

    async fn get_contract(&self, id: ContractId) -> Result<Contract, ApiError>;

    async fn list_contracts(&self) -> Result<Vec<Contract>, ApiError>;

    async fn delete_contract(&self, id: ContractId) -> Result<(), ApiError>;

    /// Ask a question scoped to one contract.
    async fn ask_document(&self, id: ContractId, question: &str)
    -> Result<DocumentAnswer, ApiError>;

    /// Ask a question across every contract in the corpus.
    async fn ask_corpus(&self, question: &str) -> Result<CorpusAnswer, ApiError>;

    async fn compare(&self, a: ContractId, b: ContractId) -> Result<ComparisonResult, ApiError>;

    async fn rewrite_clause(
        &self,
        clause_text: &str,
        instruction: &str,
    ) -> Result<RewriteResult, ApiError>;

    async fn analytics(&self) -> Result<Analytics, ApiError>;
}
