//! Scripted in-memory backend for view tests.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use contractiq_api::{ApiError, Backend, CorpusAnswer, DocumentAnswer, JobAck};
use contractiq_core::{
    AnalysisMetadata, Analytics, ComparisonResult, Contract, ContractId, ContractStatus,
    RewriteResult, Risk, RiskLevel,
};

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    contracts: Mutex<BTreeMap<ContractId, Contract>>,
    /// Responses for `get_contract`, consumed front to back before falling
    /// back to the stored copy.
    gets: Mutex<VecDeque<Result<Contract, ApiError>>>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    pub document_answer: Mutex<DocumentAnswer>,
    pub corpus_answer: Mutex<CorpusAnswer>,
    pub comparison: Mutex<ComparisonResult>,
    pub rewrite: Mutex<RewriteResult>,
    pub last_rewrite: Mutex<Option<(String, String)>>,
    pub analytics: Mutex<Analytics>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contracts(contracts: impl IntoIterator<Item = Contract>) -> Self {
        let backend = Self::new();
        for c in contracts {
            backend.insert(c);
        }
        backend
    }

    pub fn insert(&self, contract: Contract) {
        self.contracts.lock().unwrap().insert(contract.id, contract);
    }

    pub fn stored(&self, id: ContractId) -> Option<Contract> {
        self.contracts.lock().unwrap().get(&id).cloned()
    }

    pub fn script_get(&self, response: Result<Contract, ApiError>) {
        self.gets.lock().unwrap().push_back(response);
    }

    /// Make `op` fail with a 500 until [`Self::recover`] is called.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn record(&self, op: &'static str) -> Result<(), ApiError> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Server {
                status: 500,
                body: format!("{op} failed"),
            });
        }
        Ok(())
    }
}

pub(crate) fn contract(id: u64, filename: &str, status: ContractStatus) -> Contract {
    let mut c = Contract::new(ContractId(id), filename);
    c.status = status;
    c
}

pub(crate) fn analyzed(id: u64, filename: &str) -> Contract {
    let mut c = contract(id, filename, ContractStatus::Analyzed);
    c.metadata = Some(AnalysisMetadata {
        summary: Some("Master services agreement.".into()),
        extracted_clauses: vec![],
        risks: vec![Risk {
            clause_category: "Liability".into(),
            risk_level: RiskLevel::High,
            reasoning: "Liability is uncapped.".into(),
        }],
    });
    c
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn upload(&self, filename: &str, _bytes: Vec<u8>) -> Result<Contract, ApiError> {
        self.record("upload")?;
        let mut contracts = self.contracts.lock().unwrap();
        let id = ContractId(contracts.keys().last().map_or(1, |id| id.0 + 1));
        let contract = Contract::new(id, filename);
        contracts.insert(id, contract.clone());
        Ok(contract)
    }

    async fn start_analysis(&self, id: ContractId) -> Result<JobAck, ApiError> {
        self.record("start_analysis")?;
        let mut contracts = self.contracts.lock().unwrap();
        let contract = contracts.get_mut(&id).ok_or(ApiError::NotFound(id))?;
        contract.status = ContractStatus::Processing;
        Ok(JobAck {
            message: Some("Analysis started".into()),
        })
    }

    async fn get_contract(&self, id: ContractId) -> Result<Contract, ApiError> {
        self.record("get_contract")?;
        if let Some(scripted) = self.gets.lock().unwrap().pop_front() {
            return scripted;
        }
        self.stored(id).ok_or(ApiError::NotFound(id))
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, ApiError> {
        self.record("list_contracts")?;
        Ok(self.contracts.lock().unwrap().values().cloned().collect())
    }

    async fn delete_contract(&self, id: ContractId) -> Result<(), ApiError> {
        self.record("delete_contract")?;
        self.contracts
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(ApiError::NotFound(id))
    }

    async fn ask_document(&self, _id: ContractId, _question: &str) -> Result<DocumentAnswer, ApiError> {
        self.record("ask_document")?;
        Ok(self.document_answer.lock().unwrap().clone())
    }

    async fn ask_corpus(&self, _question: &str) -> Result<CorpusAnswer, ApiError> {
        self.record("ask_corpus")?;
        Ok(self.corpus_answer.lock().unwrap().clone())
    }

    async fn compare(&self, _a: ContractId, _b: ContractId) -> Result<ComparisonResult, ApiError> {
        self.record("compare")?;
        Ok(self.comparison.lock().unwrap().clone())
    }

    async fn rewrite_clause(&self, clause_text: &str, instruction: &str) -> Result<RewriteResult, ApiError> {
        self.record("rewrite_clause")?;
        *self.last_rewrite.lock().unwrap() = Some((clause_text.to_string(), instruction.to_string()));
        Ok(self.rewrite.lock().unwrap().clone())
    }

    async fn analytics(&self) -> Result<Analytics, ApiError> {
        self.record("analytics")?;
        Ok(*self.analytics.lock().unwrap())
    }
}
