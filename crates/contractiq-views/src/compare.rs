//! Side-by-side comparison of two contracts.

use std::sync::Arc;

use contractiq_api::{ApiError, Backend};
use contractiq_core::{ComparisonResult, Contract, ContractId};
use tracing::info;

use crate::error::{CompareError, InvalidSelection};

const UNKNOWN_NAME: &str = "Unknown";

/// Key differences as a four-column table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTable {
    pub headers: [String; 4],
    pub rows: Vec<[String; 4]>,
}

pub struct ComparisonView {
    backend: Arc<dyn Backend>,
    contracts: Vec<Contract>,
    pair: Option<(ContractId, ContractId)>,
    result: Option<ComparisonResult>,
}

impl ComparisonView {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            contracts: Vec::new(),
            pair: None,
            result: None,
        }
    }

    /// Fetch the contracts available for selection.
    pub async fn load_contracts(&mut self) -> Result<(), ApiError> {
        self.contracts = self.backend.list_contracts().await?;
        Ok(())
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref()
    }

    /// Compare the selected pair. Missing or identical selections are
    /// rejected before any request is sent. A new request discards the
    /// previous result first, so a failure never leaves a stale one behind.
    pub async fn compare(
        &mut self,
        a: Option<ContractId>,
        b: Option<ContractId>,
    ) -> Result<&ComparisonResult, CompareError> {
        let (Some(a), Some(b)) = (a, b) else {
            return Err(InvalidSelection::Missing.into());
        };
        if a == b {
            return Err(InvalidSelection::SameContract(a).into());
        }

        self.result = None;
        self.pair = None;
        let result = self.backend.compare(a, b).await.map_err(CompareError::Remote)?;
        info!(contract_a = %a, contract_b = %b, differences = result.key_differences.len(), "contracts compared");
        self.pair = Some((a, b));
        Ok(&*self.result.insert(result))
    }

    fn name_of(&self, id: ContractId) -> &str {
        self.contracts
            .iter()
            .find(|c| c.id == id)
            .map_or(UNKNOWN_NAME, |c| c.filename.as_str())
    }

    /// Table of the current result; headers name the compared contracts.
    pub fn table(&self) -> Option<ComparisonTable> {
        let result = self.result.as_ref()?;
        let (a, b) = self.pair?;
        let headers = [
            "Category".to_string(),
            self.name_of(a).to_string(),
            self.name_of(b).to_string(),
            "AI Assessment".to_string(),
        ];
        let rows = result
            .key_differences
            .iter()
            .map(|d| {
                [
                    d.category.clone(),
                    d.contract_a_point.clone(),
                    d.contract_b_point.clone(),
                    d.assessment.clone(),
                ]
            })
            .collect();
        Some(ComparisonTable { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBackend, analyzed};
    use contractiq_core::KeyDifference;

    fn difference(category: &str) -> KeyDifference {
        KeyDifference {
            category: category.into(),
            contract_a_point: "30 days".into(),
            contract_b_point: "90 days".into(),
            assessment: "B is stricter".into(),
        }
    }

    fn backend() -> Arc<ScriptedBackend> {
        let backend = ScriptedBackend::with_contracts([analyzed(3, "MSA_A.pdf"), analyzed(7, "MSA_B.pdf")]);
        *backend.comparison.lock().unwrap() = ComparisonResult {
            overview_diff: "B imposes longer notice periods.".into(),
            recommendation: "Prefer A.".into(),
            key_differences: vec![difference("Termination"), difference("Payment")],
        };
        Arc::new(backend)
    }

    #[tokio::test]
    async fn same_contract_is_rejected_without_request() {
        let backend = backend();
        let mut view = ComparisonView::new(backend.clone());
        let err = view.compare(Some(ContractId(3)), Some(ContractId(3))).await.unwrap_err();
        assert!(matches!(
            err,
            CompareError::InvalidSelection(InvalidSelection::SameContract(ContractId(3)))
        ));
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn missing_selection_is_rejected() {
        let backend = backend();
        let mut view = ComparisonView::new(backend.clone());
        let err = view.compare(Some(ContractId(3)), None).await.unwrap_err();
        assert!(matches!(err, CompareError::InvalidSelection(InvalidSelection::Missing)));
        assert_eq!(backend.calls("compare"), 0);
    }

    #[tokio::test]
    async fn table_has_one_row_per_difference() {
        let backend = backend();
        let mut view = ComparisonView::new(backend.clone());
        view.load_contracts().await.unwrap();
        let result = view.compare(Some(ContractId(3)), Some(ContractId(7))).await.unwrap();
        assert_eq!(result.recommendation, "Prefer A.");

        let table = view.table().unwrap();
        assert_eq!(table.headers, ["Category", "MSA_A.pdf", "MSA_B.pdf", "AI Assessment"].map(String::from));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "Termination");
    }

    #[tokio::test]
    async fn unknown_names_fall_back() {
        let backend = backend();
        let mut view = ComparisonView::new(backend.clone());
        view.compare(Some(ContractId(3)), Some(ContractId(7))).await.unwrap();
        let table = view.table().unwrap();
        assert_eq!(table.headers[1], "Unknown");
    }

    #[tokio::test]
    async fn failure_clears_previous_result() {
        let backend = backend();
        let mut view = ComparisonView::new(backend.clone());
        view.compare(Some(ContractId(3)), Some(ContractId(7))).await.unwrap();
        assert!(view.result().is_some());

        backend.fail("compare");
        let err = view.compare(Some(ContractId(7)), Some(ContractId(3))).await.unwrap_err();
        assert!(matches!(err, CompareError::Remote(_)));
        assert!(view.result().is_none());
        assert!(view.table().is_none());
    }
}
