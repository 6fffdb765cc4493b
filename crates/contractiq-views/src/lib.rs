//! Client-side orchestration over the analysis backend.
//!
//! Each view owns private state and talks to the backend through an
//! `Arc<dyn Backend>`. Only [`job`] runs background work, and that work is
//! owned by a handle that stops it when dropped.

mod error;
pub use error::{
    ChatError, CompareError, DeleteError, InvalidSelection, JobStartError, PollFetchError,
    RewriteError, UploadError,
};

pub mod chat;
pub mod compare;
pub mod dashboard;
pub mod job;
pub mod notify;
pub mod remediate;
pub mod render;
pub mod upload;

#[cfg(test)]
mod testing;

pub use chat::{Answer, ChatScope, ChatSession, CorpusChat, CorpusScope, DocumentChat, DocumentScope, TurnOutcome};
pub use compare::{ComparisonTable, ComparisonView};
pub use dashboard::DashboardAggregator;
pub use job::{AnalysisJobController, PollCanceller, PollHandle, PollOptions, PollOutcome};
pub use notify::{Notice, NoticeLevel, Notifications};
pub use remediate::{Remediation, remediation_instruction};
pub use render::{CitationView, MessageView, render_history, render_message};
pub use upload::upload_file;
