//! Citations grounding an assistant answer in source text.
//!
//! The backend returns two wire shapes: document-scoped answers cite clause
//! text with a clause type, corpus-scoped answers cite the source file. Both
//! are folded into one tagged [`Citation`] that exposes an excerpt and a label.

use serde::{Deserialize, Serialize};

const UNKNOWN_SOURCE: &str = "Unknown File";
const UNTYPED_CLAUSE: &str = "Clause";
const SOURCE_LABEL: &str = "Source";

/// Wire shape of a citation from the per-document ask endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentCitation {
    #[serde(default)]
    pub clause_text: String,
    #[serde(default)]
    pub clause_type: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Wire shape of a citation from the corpus-wide ask endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusCitation {
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Citation {
    Document {
        clause_text: String,
        clause_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
    },
    Corpus {
        source: Option<String>,
    },
}

impl Citation {
    /// The quoted text or origin shown as the body of the citation.
    pub fn excerpt(&self) -> &str {
        match self {
            Self::Document { clause_text, .. } => clause_text,
            Self::Corpus { source } => source
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(UNKNOWN_SOURCE),
        }
    }

    /// Short tag shown next to the excerpt.
    pub fn label(&self) -> &str {
        match self {
            Self::Document { clause_type, .. } if !clause_type.trim().is_empty() => clause_type,
            Self::Document { .. } => UNTYPED_CLAUSE,
            Self::Corpus { .. } => SOURCE_LABEL,
        }
    }

    pub fn explanation(&self) -> Option<&str> {
        match self {
            Self::Document { explanation, .. } => explanation.as_deref(),
            Self::Corpus { .. } => None,
        }
    }
}

impl From<DocumentCitation> for Citation {
    fn from(c: DocumentCitation) -> Self {
        Citation::Document {
            clause_text: c.clause_text,
            clause_type: c.clause_type,
            explanation: c.explanation,
        }
    }
}

impl From<CorpusCitation> for Citation {
    fn from(c: CorpusCitation) -> Self {
        Citation::Corpus { source: c.source }
    }
}
