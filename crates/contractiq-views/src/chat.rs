//! Question-and-answer sessions, scoped to one contract or to the whole
//! corpus.
//!
//! Every accepted question adds exactly two messages to the history: the
//! user's question, then either the answer or a scope-specific apology.
//! Remote failures never escape as errors; the apology is the reply.

use std::sync::Arc;

use async_trait::async_trait;
use contractiq_api::{ApiError, Backend};
use contractiq_core::{ChatHistory, ChatMessage, Citation, ContractId};
use tracing::{info, warn};

use crate::error::ChatError;

const DOCUMENT_GREETING: &str =
    "Hello! I am your contract assistant. Ask me anything about this document.";
const DOCUMENT_APOLOGY: &str = "Sorry, I encountered an error analyzing that question.";
const CORPUS_GREETING: &str = "Hello! I'm your Vault Assistant. Ask me anything across **all your contracts** (e.g., 'Do any contracts expire in 2025?', 'Show me all high-risk liability clauses').";
const CORPUS_APOLOGY: &str = "Sorry, I encountered an error searching the Vault.";

/// An answer with its citations in backend order.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Where questions are routed and how the assistant introduces itself.
#[async_trait]
pub trait ChatScope: Send + Sync {
    fn greeting(&self) -> &'static str;

    fn apology(&self) -> &'static str;

    async fn ask(&self, backend: &dyn Backend, question: &str) -> Result<Answer, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentScope {
    pub contract_id: ContractId,
}

#[async_trait]
impl ChatScope for DocumentScope {
    fn greeting(&self) -> &'static str {
        DOCUMENT_GREETING
    }

    fn apology(&self) -> &'static str {
        DOCUMENT_APOLOGY
    }

    async fn ask(&self, backend: &dyn Backend, question: &str) -> Result<Answer, ApiError> {
        let reply = backend.ask_document(self.contract_id, question).await?;
        Ok(Answer {
            text: reply.answer,
            citations: reply.citations.into_iter().map(Citation::from).collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusScope;

#[async_trait]
impl ChatScope for CorpusScope {
    fn greeting(&self) -> &'static str {
        CORPUS_GREETING
    }

    fn apology(&self) -> &'static str {
        CORPUS_APOLOGY
    }

    async fn ask(&self, backend: &dyn Backend, question: &str) -> Result<Answer, ApiError> {
        let reply = backend.ask_corpus(question).await?;
        Ok(Answer {
            text: reply.answer,
            citations: reply.citations.into_iter().map(Citation::from).collect(),
        })
    }
}

/// Result of one accepted question. The history has grown by two either way.
#[derive(Debug)]
pub enum TurnOutcome {
    Answered,
    Failed(ChatError),
}

pub struct ChatSession<S: ChatScope> {
    backend: Arc<dyn Backend>,
    scope: S,
    history: ChatHistory,
}

pub type DocumentChat = ChatSession<DocumentScope>;
pub type CorpusChat = ChatSession<CorpusScope>;

impl DocumentChat {
    pub fn for_contract(backend: Arc<dyn Backend>, contract_id: ContractId) -> Self {
        Self::new(backend, DocumentScope { contract_id })
    }
}

impl CorpusChat {
    pub fn corpus(backend: Arc<dyn Backend>) -> Self {
        Self::new(backend, CorpusScope)
    }
}

impl<S: ChatScope> ChatSession<S> {
    /// A session whose history opens with the scope's greeting.
    pub fn new(backend: Arc<dyn Backend>, scope: S) -> Self {
        let mut history = ChatHistory::new();
        history.push(ChatMessage::assistant(scope.greeting(), Vec::new()));
        Self {
            backend,
            scope,
            history,
        }
    }

    pub fn scope(&self) -> &S {
        &self.scope
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Ask a question. Blank questions are rejected without touching the
    /// history or the backend.
    pub async fn send(&mut self, question: &str) -> Result<TurnOutcome, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }
        self.history.push(ChatMessage::user(question));

        match self.scope.ask(self.backend.as_ref(), question).await {
            Ok(answer) => {
                info!(citations = answer.citations.len(), "question answered");
                self.history
                    .push(ChatMessage::assistant(answer.text, answer.citations));
                Ok(TurnOutcome::Answered)
            }
            Err(e) => {
                warn!(error = %e, "question failed");
                self.history
                    .push(ChatMessage::assistant(self.scope.apology(), Vec::new()));
                Ok(TurnOutcome::Failed(ChatError::Remote(e)))
            }
        }
    }
}
