//! Contract records and the analysis status state machine.
//!
//! A contract moves `uploaded → processing → {analyzed, failed}`. Both terminal
//! states re-enter `processing` when the analysis is re-run. Enrichment
//! (lifecycle dates, alerts, extracted metadata) is only meaningful once a
//! contract is `analyzed`; [`Contract::normalized`] enforces that.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Backend-assigned contract identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub u64);

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContractId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ContractId)
    }
}

impl From<u64> for ContractId {
    fn from(id: u64) -> Self {
        ContractId(id)
    }
}

/// Analysis status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Uploaded,
    Processing,
    Analyzed,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid status transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: ContractStatus,
    pub to: ContractStatus,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Analyzed => "analyzed",
            Self::Failed => "failed",
        }
    }

    /// `analyzed` and `failed` see no further automatic transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Analyzed | Self::Failed)
    }

    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (self, next),
            (Uploaded, Processing)
                | (Analyzed, Processing)
                | (Failed, Processing)
                | (Processing, Analyzed)
                | (Processing, Failed)
        )
    }

    /// Move to `next`, rejecting edges the state machine does not have.
    pub fn transition(self, next: ContractStatus) -> Result<ContractStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk severity. Parsed case-insensitively; unrecognised levels map to
/// `Low`, which is what the analysis backend does when it stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "medium" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Upper-case label used in report headers, e.g. `HIGH`.
    pub fn label(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    /// High and critical risks, flagged in terminal output.
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(RiskLevel::parse_lossy).unwrap_or(RiskLevel::Low))
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(default)]
    pub clause_category: String,
    #[serde(default = "default_risk_level")]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub reasoning: String,
}

fn default_risk_level() -> RiskLevel {
    RiskLevel::Low
}

/// Structured output of the analysis pipeline, stored server-side as
/// `metadata_json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub extracted_clauses: Vec<Clause>,
    #[serde(default)]
    pub risks: Vec<Risk>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: String,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default = "default_alert_status")]
    pub status: String,
}

fn default_alert_status() -> String {
    "pending".to_string()
}

/// A contract as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub filename: String,
    #[serde(default)]
    pub upload_date: Option<NaiveDateTime>,
    pub status: ContractStatus,
    /// Top-level summary column; the metadata summary takes precedence.
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, rename = "metadata_json")]
    pub metadata: Option<AnalysisMetadata>,
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub renewal_terms: Option<String>,
    #[serde(default)]
    pub notice_period_days: Option<u32>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl Contract {
    /// A freshly uploaded contract with no analysis.
    pub fn new(id: ContractId, filename: impl Into<String>) -> Self {
        Self {
            id,
            filename: filename.into(),
            upload_date: None,
            status: ContractStatus::Uploaded,
            summary: None,
            metadata: None,
            start_date: None,
            end_date: None,
            renewal_terms: None,
            notice_period_days: None,
            alerts: Vec::new(),
        }
    }

    /// Enforce the enrichment invariant: enrichment is present iff the
    /// contract is analyzed.
    ///
    /// Non-analyzed contracts lose all enrichment; analyzed contracts always
    /// carry metadata (empty if the backend sent none), with the top-level
    /// summary folded in when the metadata lacks one.
    pub fn normalized(mut self) -> Self {
        if self.status == ContractStatus::Analyzed {
            let fallback = self.summary.clone();
            let metadata = self.metadata.get_or_insert_with(AnalysisMetadata::default);
            if metadata.summary.is_none() {
                metadata.summary = fallback;
            }
        } else {
            self.clear_enrichment();
        }
        self
    }

    pub fn has_enrichment(&self) -> bool {
        self.metadata.is_some()
            || self.summary.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.renewal_terms.is_some()
            || self.notice_period_days.is_some()
            || !self.alerts.is_empty()
    }

    fn clear_enrichment(&mut self) {
        self.summary = None;
        self.metadata = None;
        self.start_date = None;
        self.end_date = None;
        self.renewal_terms = None;
        self.notice_period_days = None;
        self.alerts.clear();
    }

    /// Local transition into `processing` after a job was accepted.
    pub fn begin_analysis(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.transition(ContractStatus::Processing)?;
        self.clear_enrichment();
        Ok(())
    }

    /// Replace this copy with a failed, unenriched one.
    pub fn mark_failed(&mut self) {
        self.status = ContractStatus::Failed;
        self.clear_enrichment();
    }

    pub fn summary_text(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.summary.as_deref())
            .or(self.summary.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn risks(&self) -> &[Risk] {
        self.metadata.as_ref().map(|m| m.risks.as_slice()).unwrap_or(&[])
    }

    pub fn clauses(&self) -> &[Clause] {
        self.metadata
            .as_ref()
            .map(|m| m.extracted_clauses.as_slice())
            .unwrap_or(&[])
    }

    /// First extracted clause whose category matches, ignoring case.
    pub fn clause_for(&self, category: &str) -> Option<&Clause> {
        self.clauses()
            .iter()
            .find(|c| c.category.eq_ignore_ascii_case(category))
    }
}
