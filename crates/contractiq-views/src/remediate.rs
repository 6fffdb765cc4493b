//! Suggested rewrites for risky clauses.

use std::sync::Arc;

use contractiq_api::Backend;
use contractiq_core::{Contract, RewriteResult, Risk};
use tracing::info;

use crate::error::RewriteError;

/// Instruction sent with the clause text.
pub fn remediation_instruction(risk: &Risk) -> String {
    format!(
        "Rewrite the clause related to {} to mitigate this risk: {}. Reasoning: {}. Make it favorable to us.",
        risk.clause_category,
        risk.risk_level.label(),
        risk.reasoning
    )
}

/// Holds the latest proposed rewrite. Each request replaces it wholesale.
pub struct Remediation {
    backend: Arc<dyn Backend>,
    result: Option<RewriteResult>,
}

impl Remediation {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            result: None,
        }
    }

    pub fn result(&self) -> Option<&RewriteResult> {
        self.result.as_ref()
    }

    /// Request a rewrite for `risk`. The extracted clause of the same
    /// category is sent when the contract has one; otherwise the risk's
    /// reasoning stands in for the clause text.
    pub async fn remediate(&mut self, contract: &Contract, risk: &Risk) -> Result<&RewriteResult, RewriteError> {
        self.result = None;
        let clause_text = contract
            .clause_for(&risk.clause_category)
            .map_or(risk.reasoning.as_str(), |c| c.text.as_str());
        let instruction = remediation_instruction(risk);
        let result = self.backend.rewrite_clause(clause_text, &instruction).await?;
        info!(contract_id = %contract.id, category = %risk.clause_category, "rewrite proposed");
        Ok(&*self.result.insert(result))
    }
}
