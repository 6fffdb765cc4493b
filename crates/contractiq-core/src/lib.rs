pub mod chat;
pub mod citation;
pub mod comparison;
pub mod contract;
pub mod search;

pub use chat::{ChatHistory, ChatMessage, Role};
pub use citation::{Citation, CorpusCitation, DocumentCitation};
pub use comparison::{Analytics, ComparisonResult, KeyDifference, RewriteResult};
pub use contract::{
    Alert, AnalysisMetadata, Clause, Contract, ContractId, ContractStatus, Risk, RiskLevel,
    TransitionError,
};
pub use search::{filter_contracts, matches_term};
