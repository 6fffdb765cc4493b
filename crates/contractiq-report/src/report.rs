//! The exported analysis report: title block, executive summary, and one
//! entry per risk, laid out by [`Paginator`].

use chrono::NaiveDate;
use contractiq_core::Contract;
use serde::Serialize;

use crate::layout::{Block, Page, PageGeometry, Paginator, TextStyle};

pub const REPORT_TITLE: &str = "Contract Intelligence Report";
const NO_SUMMARY: &str = "No summary available.";
const NO_RISKS: &str = "No risks detected.";

/// Section widths and spacing for the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportLayout {
    pub geometry: PageGeometry,
    pub summary_width: f32,
    pub risk_indent: f32,
    pub risk_width: f32,
    pub section_gap: f32,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            summary_width: 170.0,
            risk_indent: 25.0,
            risk_width: 160.0,
            section_gap: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub source_filename: String,
    pub generated_on: NaiveDate,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

/// Exported file name: `<contract filename>_report.<ext>`.
pub fn report_filename(contract_filename: &str, ext: &str) -> String {
    format!("{contract_filename}_report.{ext}")
}

/// Blocks of the report in reading order.
pub fn report_blocks(contract: &Contract, generated_on: NaiveDate, layout: &ReportLayout) -> Vec<Block> {
    let g = &layout.geometry;
    let mut blocks = Vec::with_capacity(contract.risks().len() + 3);

    blocks.push(
        Block::new(
            format!(
                "Filename: {}\nAnalysis Date: {}",
                contract.filename,
                generated_on.format("%Y-%m-%d")
            ),
            g,
        )
        .with_header(REPORT_TITLE, TextStyle::Title)
        .body_style(TextStyle::Subtitle)
        .at(g.left_margin, layout.summary_width)
        .gap(layout.section_gap),
    );

    blocks.push(
        Block::new(contract.summary_text().unwrap_or(NO_SUMMARY), g)
            .with_header("Executive Summary", TextStyle::Heading)
            .at(g.left_margin, layout.summary_width)
            .gap(layout.section_gap),
    );

    blocks.push(
        Block::new("", g)
            .with_header("Risk Analysis", TextStyle::Heading)
            .keep_with_next(),
    );

    if contract.risks().is_empty() {
        blocks.push(Block::new(NO_RISKS, g).at(layout.risk_indent, layout.risk_width));
    }
    for risk in contract.risks() {
        blocks.push(
            Block::new(risk.reasoning.as_str(), g)
                .with_header(
                    format!("[{}] {}", risk.risk_level.label(), risk.clause_category),
                    TextStyle::BlockHeader,
                )
                .at(layout.risk_indent, layout.risk_width),
        );
    }

    blocks
}

/// Lay out the full report for `contract`.
pub fn build_report(contract: &Contract, generated_on: NaiveDate, layout: &ReportLayout) -> Report {
    let blocks = report_blocks(contract, generated_on, layout);
    let pages = Paginator::new(layout.geometry).paginate(&blocks);
    tracing::info!(
        filename = %contract.filename,
        risks = contract.risks().len(),
        pages = pages.len(),
        "report laid out"
    );
    Report {
        title: REPORT_TITLE.to_string(),
        source_filename: contract.filename.clone(),
        generated_on,
        geometry: layout.geometry,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contractiq_core::{AnalysisMetadata, ContractId, ContractStatus, Risk, RiskLevel};

    fn analyzed(risks: Vec<Risk>) -> Contract {
        let mut contract = Contract::new(ContractId(7), "MSA_2024.pdf");
        contract.status = ContractStatus::Analyzed;
        contract.metadata = Some(AnalysisMetadata {
            summary: Some("Three-year services agreement with auto-renewal.".into()),
            extracted_clauses: vec![],
            risks,
        });
        contract
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn filename_convention() {
        assert_eq!(report_filename("MSA_2024.pdf", "txt"), "MSA_2024.pdf_report.txt");
    }

    #[test]
    fn report_sections_in_order() {
        let contract = analyzed(vec![Risk {
            clause_category: "Liability".into(),
            risk_level: RiskLevel::High,
            reasoning: "Liability is uncapped for both parties.".into(),
        }]);
        let report = build_report(&contract, date(), &ReportLayout::default());
        let texts: Vec<&str> = report.pages.iter().flat_map(|p| p.texts()).collect();
        assert_eq!(
            texts,
            vec![
                "Contract Intelligence Report",
                "Filename: MSA_2024.pdf",
                "Analysis Date: 2026-10-19",
                "Executive Summary",
                "Three-year services agreement with auto-renewal.",
                "Risk Analysis",
                "[HIGH] Liability",
                "Liability is uncapped for both parties.",
            ]
        );
        let risk_body = &report.pages[0].runs[7];
        assert_eq!(risk_body.x, 25.0);
    }

    #[test]
    fn missing_summary_and_risks_have_placeholders() {
        let contract = Contract::new(ContractId(1), "draft.docx");
        let report = build_report(&contract, date(), &ReportLayout::default());
        let texts: Vec<&str> = report.pages.iter().flat_map(|p| p.texts()).collect();
        assert!(texts.contains(&"No summary available."));
        assert!(texts.contains(&"No risks detected."));
    }

    #[test]
    fn long_risk_category_stays_within_risk_width() {
        let category = "Limitation of liability, indemnification, and consequential damages carve-outs for data breaches";
        let contract = analyzed(vec![Risk {
            clause_category: category.into(),
            risk_level: RiskLevel::Critical,
            reasoning: "Carve-outs swallow the cap.".into(),
        }]);
        let layout = ReportLayout::default();
        let report = build_report(&contract, date(), &layout);
        let columns = layout.geometry.columns(layout.risk_width);
        let headers: Vec<&str> = report.pages[0]
            .runs
            .iter()
            .filter(|r| r.style == TextStyle::BlockHeader)
            .map(|r| r.text.as_str())
            .collect();
        assert!(headers.len() > 1);
        assert!(headers.iter().all(|h| h.chars().count() <= columns));
        assert_eq!(headers.join(" "), format!("[CRITICAL] {category}"));
    }

    #[test]
    fn many_risks_span_pages_in_order() {
        let risks: Vec<Risk> = (0..60)
            .map(|i| Risk {
                clause_category: format!("Clause {i}"),
                risk_level: RiskLevel::Medium,
                reasoning: "The clause shifts cost to the customer without a corresponding right to audit or terminate.".into(),
            })
            .collect();
        let report = build_report(&analyzed(risks), date(), &ReportLayout::default());
        assert!(report.pages.len() > 1);
        let headers: Vec<&str> = report
            .pages
            .iter()
            .flat_map(|p| p.runs.iter())
            .filter(|r| r.style == TextStyle::BlockHeader)
            .map(|r| r.text.as_str())
            .collect();
        let expected: Vec<String> = (0..60).map(|i| format!("[MEDIUM] Clause {i}")).collect();
        assert_eq!(headers, expected);
    }
}
