//! Export backends turning laid-out pages into bytes on disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::ReportError;
use crate::report::{Report, report_filename};

/// Renders a laid-out report into a file format.
pub trait ExportBackend {
    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, report: &Report) -> Result<Vec<u8>, ReportError>;
}

/// Plain text: one run per line, indented by its x offset, pages separated by
/// a form feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExporter;

impl ExportBackend for TextExporter {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>, ReportError> {
        let g = &report.geometry;
        let total = report.pages.len();
        let mut out = String::new();
        for (i, page) in report.pages.iter().enumerate() {
            if i > 0 {
                out.push('\u{c}');
                out.push('\n');
            }
            for run in &page.runs {
                let indent = ((run.x - g.left_margin).max(0.0) / g.char_width).round() as usize;
                out.push_str(&" ".repeat(indent));
                out.push_str(&run.text);
                out.push('\n');
            }
            out.push_str(&format!("\n[page {} of {}]\n", page.number, total));
        }
        Ok(out.into_bytes())
    }
}

/// The full layout as JSON, for renderers that draw the runs themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    pub pretty: bool,
}

impl ExportBackend for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>, ReportError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(report)?
        } else {
            serde_json::to_vec(report)?
        };
        Ok(bytes)
    }
}

/// Render `report` with `backend` and write it into `dir`. Returns the path
/// written.
pub fn export_report(
    report: &Report,
    backend: &dyn ExportBackend,
    dir: &Path,
) -> Result<PathBuf, ReportError> {
    let bytes = backend.render(report)?;
    let path = dir.join(report_filename(&report.source_filename, backend.extension()));
    std::fs::write(&path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), pages = report.pages.len(), "report exported");
    Ok(path)
}
