//! Results of one-shot backend actions: comparisons, rewrites, counters.

use serde::{Deserialize, Serialize};

/// Structured diff between two analyzed contracts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(default)]
    pub overview_diff: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub key_differences: Vec<KeyDifference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyDifference {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub contract_a_point: String,
    #[serde(default)]
    pub contract_b_point: String,
    #[serde(default)]
    pub assessment: String,
}

/// A proposed clause revision and the reason for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewriteResult {
    #[serde(default)]
    pub rewritten_text: String,
    #[serde(default)]
    pub explanation: String,
}

/// Dashboard counters computed server-side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    #[serde(default, alias = "total")]
    pub total_contracts: u64,
    #[serde(default, alias = "analyzed")]
    pub analyzed_contracts: u64,
    #[serde(default)]
    pub high_risks: u64,
    #[serde(default)]
    pub expiring_soon: u64,
}
