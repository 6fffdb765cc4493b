//! Terminal rendering for contracts, answers, and comparisons.

use chrono::NaiveDateTime;
use contractiq_core::{Analytics, ComparisonResult, Contract, RewriteResult, Risk, RiskLevel, Role};
use contractiq_report::wrap_text;
use contractiq_views::{ComparisonTable, MessageView, Notifications};

const TEXT_WIDTH: usize = 88;
const TABLE_WIDTHS: [usize; 4] = [18, 26, 26, 26];

// ── Dashboard ──

pub fn print_dashboard(analytics: &Analytics, contracts: &[&Contract], term: &str) {
    println!("=== Portfolio ===");
    println!("  {:<26} {}", "total_contracts", analytics.total_contracts);
    println!("  {:<26} {}", "analyzed_contracts", analytics.analyzed_contracts);
    println!("  {:<26} {}", "high_risks", analytics.high_risks);
    println!("  {:<26} {}", "expiring_soon", analytics.expiring_soon);
    println!();

    if !term.is_empty() {
        println!("Matching {term:?}: {}", contracts.len());
    }
    if contracts.is_empty() {
        println!("  (no contracts)");
        return;
    }
    println!("  {:>6}  {:<12} {:<16} {}", "id", "status", "uploaded", "filename");
    for c in contracts {
        println!(
            "  {:>6}  {:<12} {:<16} {}",
            c.id.to_string(),
            c.status.as_str(),
            fmt_datetime(c.upload_date),
            c.filename
        );
    }
}

// ── Contract card ──

pub fn print_contract_card(contract: &Contract) {
    println!("=== {} ===", contract.filename);
    println!();

    println!("Identity");
    println!("  {:<26} {}", "id", contract.id);
    println!("  {:<26} {}", "status", contract.status);
    if contract.upload_date.is_some() {
        println!("  {:<26} {}", "upload_date", fmt_datetime(contract.upload_date));
    }

    let has_lifecycle = contract.start_date.is_some()
        || contract.end_date.is_some()
        || contract.renewal_terms.is_some()
        || contract.notice_period_days.is_some();
    if has_lifecycle {
        println!("Lifecycle");
        if contract.start_date.is_some() {
            println!("  {:<26} {}", "start_date", fmt_datetime(contract.start_date));
        }
        if contract.end_date.is_some() {
            println!("  {:<26} {}", "end_date", fmt_datetime(contract.end_date));
        }
        if let Some(terms) = &contract.renewal_terms {
            println!("  {:<26} {}", "renewal_terms", terms);
        }
        if let Some(days) = contract.notice_period_days {
            println!("  {:<26} {} days", "notice_period", days);
        }
    }

    if !contract.alerts.is_empty() {
        println!("Alerts");
        for alert in &contract.alerts {
            println!(
                "  {:<26} {} ({})",
                alert.alert_type,
                fmt_datetime(alert.due_date),
                alert.status
            );
        }
    }

    if let Some(summary) = contract.summary_text() {
        println!("Summary");
        print_wrapped(summary, 2, TEXT_WIDTH);
    }

    let clauses = contract.clauses();
    if !clauses.is_empty() {
        println!("Clauses");
        for clause in clauses {
            println!("  {:<26} {}", clause.category, preview(&clause.text, 60));
        }
    }

    let risks = contract.risks();
    if !risks.is_empty() {
        println!("Risks");
        for (i, risk) in risks.iter().enumerate() {
            println!(
                "{} {:>2}. [{}] {}",
                risk_marker(risk.risk_level),
                i + 1,
                risk.risk_level.label(),
                risk.clause_category
            );
            print_wrapped(&risk.reasoning, 6, TEXT_WIDTH - 4);
        }
    }
}

// ── Chat ──

pub fn print_message(message: &MessageView) {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    println!("{speaker}:");
    print_wrapped(&message.content, 2, TEXT_WIDTH);
    if let Some(evidence) = &message.evidence {
        println!("  Evidence");
        for cite in evidence {
            println!("    [{}] {}", cite.label, preview(&cite.excerpt, TEXT_WIDTH - 8));
            if let Some(note) = &cite.note {
                print_wrapped(note, 6, TEXT_WIDTH - 6);
            }
        }
    }
    println!();
}

// ── Comparison ──

pub fn print_comparison(result: &ComparisonResult, table: &ComparisonTable) {
    println!("=== Comparison ===");
    if !result.overview_diff.is_empty() {
        println!("Overview");
        print_wrapped(&result.overview_diff, 2, TEXT_WIDTH);
    }
    if !result.recommendation.is_empty() {
        println!("Recommendation");
        print_wrapped(&result.recommendation, 2, TEXT_WIDTH);
    }
    println!();
    print_row(&table.headers);
    println!(
        "  {}",
        TABLE_WIDTHS.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join(" ")
    );
    for row in &table.rows {
        print_row(row);
    }
}

fn print_row(cells: &[String; 4]) {
    let wrapped: Vec<Vec<String>> = cells
        .iter()
        .zip(TABLE_WIDTHS)
        .map(|(cell, width)| wrap_text(cell, width))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(0).max(1);
    for line in 0..height {
        let parts: Vec<String> = wrapped
            .iter()
            .zip(TABLE_WIDTHS)
            .map(|(lines, width)| {
                let text = lines.get(line).map(String::as_str).unwrap_or("");
                format!("{text:<width$}")
            })
            .collect();
        println!("  {}", parts.join(" ").trim_end());
    }
}

// ── Remediation ──

pub fn print_rewrite(risk: &Risk, result: &RewriteResult) {
    println!("=== [{}] {} ===", risk.risk_level.label(), risk.clause_category);
    println!("Proposed clause");
    print_wrapped(&result.rewritten_text, 2, TEXT_WIDTH);
    if !result.explanation.is_empty() {
        println!("Why");
        print_wrapped(&result.explanation, 2, TEXT_WIDTH);
    }
}

pub fn print_notices(notices: &Notifications) {
    for notice in notices.iter() {
        eprintln!("{:?}: {}", notice.level, notice.message);
    }
}

// ── Helpers ──

fn print_wrapped(text: &str, indent: usize, width: usize) {
    let pad = " ".repeat(indent);
    for line in wrap_text(text, width) {
        println!("{pad}{line}");
    }
}

fn risk_marker(level: RiskLevel) -> &'static str {
    if level.is_severe() { " !" } else { "  " }
}

fn fmt_datetime(value: Option<NaiveDateTime>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// First line of `text`, cut to `max` characters.
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() <= max {
        return line.to_string();
    }
    let cut: String = line.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
