//! Portfolio dashboard: the contract list, server-side counters, a local
//! search filter, and deletion.

use std::sync::Arc;

use contractiq_api::{ApiError, Backend};
use contractiq_core::{Analytics, Contract, ContractId, filter_contracts};
use tracing::{info, warn};

use crate::error::DeleteError;
use crate::notify::{NoticeLevel, Notifications};

pub struct DashboardAggregator {
    backend: Arc<dyn Backend>,
    contracts: Vec<Contract>,
    analytics: Analytics,
    term: String,
    notices: Notifications,
    stale: bool,
}

impl DashboardAggregator {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            contracts: Vec::new(),
            analytics: Analytics::default(),
            term: String::new(),
            notices: Notifications::new(),
            stale: false,
        }
    }

    /// Fetch the list and the counters together. Either failing leaves both
    /// as they were.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let (contracts, analytics) =
            futures::try_join!(self.backend.list_contracts(), self.backend.analytics())?;
        self.contracts = contracts.into_iter().map(Contract::normalized).collect();
        self.analytics = analytics;
        self.stale = false;
        info!(contracts = self.contracts.len(), "dashboard refreshed");
        Ok(())
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn analytics(&self) -> Analytics {
        self.analytics
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Set the search term and return the matching contracts. Local only.
    pub fn search(&mut self, term: &str) -> Vec<&Contract> {
        self.term = term.to_string();
        self.visible()
    }

    /// Contracts matching the current term, in fetched order.
    pub fn visible(&self) -> Vec<&Contract> {
        filter_contracts(&self.contracts, &self.term)
    }

    /// The list no longer reflects the backend: a refetch after a
    /// successful delete failed. Cleared by the next successful refresh.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn notices(&self) -> &Notifications {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notifications {
        &mut self.notices
    }

    /// Delete a contract, then refetch. A failed delete leaves the list
    /// untouched. A failed refetch after a successful delete keeps the old
    /// list, marks it stale and raises a notice.
    pub async fn delete(&mut self, id: ContractId) -> Result<(), DeleteError> {
        self.backend
            .delete_contract(id)
            .await
            .map_err(|source| DeleteError { id, source })?;
        info!(contract_id = %id, "contract deleted");

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "refresh after delete failed");
            self.stale = true;
            self.notices.push(
                NoticeLevel::Warning,
                format!("Contract {id} was deleted, but the list could not be refreshed: {e}"),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBackend, analyzed, contract};
    use contractiq_core::ContractStatus;

    fn portfolio() -> Arc<ScriptedBackend> {
        let backend = ScriptedBackend::with_contracts([
            analyzed(1, "Acme_MSA.pdf"),
            contract(2, "Beta_NDA.docx", ContractStatus::Processing),
            analyzed(3, "acme_sow.pdf"),
        ]);
        *backend.analytics.lock().unwrap() = Analytics {
            total_contracts: 3,
            analyzed_contracts: 2,
            high_risks: 2,
            expiring_soon: 0,
        };
        Arc::new(backend)
    }

    #[tokio::test]
    async fn refresh_loads_list_and_counters() {
        let backend = portfolio();
        let mut dash = DashboardAggregator::new(backend.clone());
        dash.refresh().await.unwrap();
        assert_eq!(dash.contracts().len(), 3);
        assert_eq!(dash.analytics().analyzed_contracts, 2);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_state() {
        let backend = portfolio();
        let mut dash = DashboardAggregator::new(backend.clone());
        dash.refresh().await.unwrap();
        backend.fail("analytics");
        backend.insert(analyzed(4, "Gamma.pdf"));
        assert!(dash.refresh().await.is_err());
        assert_eq!(dash.contracts().len(), 3);
    }

    #[tokio::test]
    async fn search_is_local_and_case_insensitive() {
        let backend = portfolio();
        let mut dash = DashboardAggregator::new(backend.clone());
        dash.refresh().await.unwrap();
        let calls = backend.total_calls();

        let names: Vec<&str> = dash.search("ACME").iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec!["Acme_MSA.pdf", "acme_sow.pdf"]);
        assert_eq!(dash.search("processing").len(), 1);
        assert_eq!(dash.search("").len(), 3);
        assert_eq!(backend.total_calls(), calls);
    }

    #[tokio::test]
    async fn delete_refetches_list() {
        let backend = portfolio();
        let mut dash = DashboardAggregator::new(backend.clone());
        dash.refresh().await.unwrap();
        dash.delete(ContractId(2)).await.unwrap();
        assert!(dash.contracts().iter().all(|c| c.id != ContractId(2)));
        assert_eq!(backend.calls("list_contracts"), 2);
        assert!(dash.notices().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_leaves_list_untouched() {
        let backend = portfolio();
        let mut dash = DashboardAggregator::new(backend.clone());
        dash.refresh().await.unwrap();
        backend.fail("delete_contract");
        let err = dash.delete(ContractId(1)).await.unwrap_err();
        assert_eq!(err.id, ContractId(1));
        assert_eq!(dash.contracts().len(), 3);
        assert_eq!(backend.calls("list_contracts"), 1);
    }

    #[tokio::test]
    async fn failed_refetch_after_delete_raises_notice() {
        let backend = portfolio();
        let mut dash = DashboardAggregator::new(backend.clone());
        dash.refresh().await.unwrap();
        backend.fail("list_contracts");
        dash.delete(ContractId(3)).await.unwrap();
        assert_eq!(dash.contracts().len(), 3);
        assert!(dash.is_stale());
        assert_eq!(dash.notices().len(), 1);
        let notice = dash.notices().iter().next().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);

        backend.recover("list_contracts");
        dash.refresh().await.unwrap();
        assert_eq!(dash.contracts().len(), 2);
        assert!(!dash.is_stale());
    }

    #[tokio::test]
    async fn search_term_applies_to_refetched_list() {
        let backend = portfolio();
        let mut dash = DashboardAggregator::new(backend.clone());
        dash.refresh().await.unwrap();
        assert_eq!(dash.search("acme").len(), 2);

        dash.delete(ContractId(1)).await.unwrap();
        let names: Vec<&str> = dash.visible().iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec!["acme_sow.pdf"]);

        backend.insert(analyzed(5, "ACME_Renewal.pdf"));
        dash.refresh().await.unwrap();
        let names: Vec<&str> = dash.visible().iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec!["acme_sow.pdf", "ACME_Renewal.pdf"]);
        assert_eq!(dash.term(), "acme");
    }
}
