//! Document upload from the local filesystem.

use std::path::Path;

use contractiq_api::Backend;
use contractiq_core::Contract;
use tracing::info;

use crate::error::UploadError;

pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "docx"];

fn accepted(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ACCEPTED_EXTENSIONS.iter().any(|a| e.eq_ignore_ascii_case(a)))
}

/// Read `path` and upload it. Unsupported types are rejected before the file
/// is read.
pub async fn upload_file(backend: &dyn Backend, path: &Path) -> Result<Contract, UploadError> {
    if !accepted(path) {
        return Err(UploadError::UnsupportedType(path.to_path_buf()));
    }
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| UploadError::UnsupportedType(path.to_path_buf()))?;
    let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let size = bytes.len();
    let contract = backend.upload(&filename, bytes).await?;
    info!(contract_id = %contract.id, filename = %contract.filename, bytes = size, "document uploaded");
    Ok(contract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use contractiq_core::ContractStatus;

    #[tokio::test]
    async fn uploads_pdf_as_uploaded_contract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MSA_2024.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let backend = ScriptedBackend::new();
        let contract = upload_file(&backend, &path).await.unwrap();
        assert_eq!(contract.filename, "MSA_2024.pdf");
        assert_eq!(contract.status, ContractStatus::Uploaded);
        assert!(!contract.has_enrichment());
    }

    #[tokio::test]
    async fn rejects_other_types_without_reading() {
        let backend = ScriptedBackend::new();
        let err = upload_file(&backend, Path::new("/nonexistent/notes.txt")).await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType(_)));
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let backend = ScriptedBackend::new();
        let err = upload_file(&backend, Path::new("/nonexistent/Lease.DOCX")).await.unwrap_err();
        assert!(matches!(err, UploadError::Io { .. }));
    }
}
