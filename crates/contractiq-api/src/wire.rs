//! Response bodies that only exist at the transport boundary.

use contractiq_core::{ContractId, ContractStatus, CorpusCitation, DocumentCitation};
use serde::{Deserialize, Deserializer, Serialize};

/// Response to `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: ContractId,
    #[serde(default)]
    pub status: Option<ContractStatus>,
}

/// Response to `POST /analyze/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobAck {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub citations: Vec<DocumentCitation>,
    #[serde(default)]
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub citations: Vec<CorpusCitation>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
