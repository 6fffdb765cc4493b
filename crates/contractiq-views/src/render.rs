//! Display model for chat messages and their supporting evidence.

use contractiq_core::{ChatHistory, ChatMessage, Citation, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationView {
    pub excerpt: String,
    pub label: String,
    pub note: Option<String>,
}

impl From<&Citation> for CitationView {
    fn from(c: &Citation) -> Self {
        Self {
            excerpt: c.excerpt().to_string(),
            label: c.label().to_string(),
            note: c.explanation().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub role: Role,
    pub content: String,
    /// `None` when the message cites nothing; no empty evidence section.
    pub evidence: Option<Vec<CitationView>>,
}

/// Citations are rendered one per entry, in order, duplicates kept.
pub fn render_message(message: &ChatMessage) -> MessageView {
    let evidence = (!message.citations.is_empty())
        .then(|| message.citations.iter().map(CitationView::from).collect());
    MessageView {
        role: message.role,
        content: message.content.clone(),
        evidence,
    }
}

pub fn render_history(history: &ChatHistory) -> Vec<MessageView> {
    history.iter().map(render_message).collect()
}
