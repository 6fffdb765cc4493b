//! Report layout: greedy word wrap, fixed-size pagination, export backends.

mod error;
pub use error::ReportError;

pub mod export;
pub mod layout;
pub mod report;
pub mod wrap;

pub use export::{ExportBackend, JsonExporter, TextExporter, export_report};
pub use layout::{Block, Page, PageGeometry, Paginator, TextRun, TextStyle};
pub use report::{Report, ReportLayout, build_report, report_filename};
pub use wrap::wrap_text;
