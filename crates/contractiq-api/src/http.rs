//! HTTP client for the contract-analysis API.

use std::time::Duration;

use async_trait::async_trait;
use contractiq_core::{Analytics, ComparisonResult, Contract, ContractId, RewriteResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{ApiError, Backend, CorpusAnswer, DocumentAnswer, JobAck, UploadReceipt};

/// Default base URL of a locally running analysis API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// HTTP client for the analysis service's `/api/v1` endpoints.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Serialize)]
struct CompareRequest {
    contract_id_1: ContractId,
    contract_id_2: ContractId,
}

#[derive(Serialize)]
struct RewriteRequest<'a> {
    clause_text: &'a str,
    instruction: &'a str,
}

impl HttpBackend {
    /// Create a client for the given API base URL.
    ///
    /// `base_url` should be like `http://localhost:8000/api/v1`; a trailing
    /// slash is trimmed.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client whose requests time out after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let resp = self.client.get(&url).send().await?;
        Self::read_json(resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let resp = self.client.post(&url).json(body).send().await?;
        Self::read_json(resp).await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<Contract, ApiError> {
        let url = self.url("/upload");
        info!(url = %url, filename, size = bytes.len(), "uploading contract");
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self.client.post(&url).multipart(form).send().await?;
        let receipt: UploadReceipt = Self::read_json(resp).await?;
        info!(id = %receipt.id, "upload accepted");
        self.get_contract(receipt.id).await
    }

    async fn start_analysis(&self, id: ContractId) -> Result<JobAck, ApiError> {
        info!(%id, "starting analysis");
        self.post_json(&format!("/analyze/{id}"), &serde_json::json!({}))
            .await
    }

    async fn get_contract(&self, id: ContractId) -> Result<Contract, ApiError> {
        // The API answers a missing id with `null` rather than a 404.
        let contract: Option<Contract> = self.get_json(&format!("/contracts/{id}")).await?;
        contract
            .map(Contract::normalized)
            .ok_or(ApiError::NotFound(id))
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, ApiError> {
        let contracts: Vec<Contract> = self.get_json("/contracts").await?;
        info!(count = contracts.len(), "listed contracts");
        Ok(contracts.into_iter().map(Contract::normalized).collect())
    }

    async fn delete_contract(&self, id: ContractId) -> Result<(), ApiError> {
        let url = self.url(&format!("/contracts/{id}"));
        info!(url = %url, "deleting contract");
        let resp = self.client.delete(&url).send().await?;
        let _ack: JobAck = Self::read_json(resp).await?;
        Ok(())
    }

    async fn ask_document(
        &self,
        id: ContractId,
        question: &str,
    ) -> Result<DocumentAnswer, ApiError> {
        self.post_json(&format!("/ask/{id}"), &AskRequest { question })
            .await
    }

    async fn ask_corpus(&self, question: &str) -> Result<CorpusAnswer, ApiError> {
        self.post_json("/ask/global", &AskRequest { question }).await
    }

    async fn compare(&self, a: ContractId, b: ContractId) -> Result<ComparisonResult, ApiError> {
        info!(%a, %b, "comparing contracts");
        self.post_json(
            "/compare",
            &CompareRequest {
                contract_id_1: a,
                contract_id_2: b,
            },
        )
        .await
    }

    async fn rewrite_clause(
        &self,
        clause_text: &str,
        instruction: &str,
    ) -> Result<RewriteResult, ApiError> {
        self.post_json(
            "/rewrite",
            &RewriteRequest {
                clause_text,
                instruction,
            },
        )
        .await
    }

    async fn analytics(&self) -> Result<Analytics, ApiError> {
        self.get_json("/analytics/stats").await
    }
}
