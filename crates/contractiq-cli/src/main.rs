//! ContractIQ command-line client.
//!
//! Usage:
//!     contractiq --api-url http://localhost:8000/api/v1 list --search acme

mod display;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use contractiq_api::http::DEFAULT_BASE_URL;
use contractiq_api::{Backend, HttpBackend};
use contractiq_core::{Contract, ContractId, ContractStatus};
use contractiq_report::{ExportBackend, JsonExporter, ReportLayout, TextExporter, build_report, export_report};
use contractiq_views::{
    AnalysisJobController, ChatScope, ChatSession, ComparisonView, CorpusChat, DashboardAggregator,
    DocumentChat, PollOptions, PollOutcome, Remediation, TurnOutcome, render_message, upload_file,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "contractiq", version, about = "Contract intelligence client")]
struct Cli {
    /// Base URL of the analysis API
    #[arg(long, env = "CONTRACTIQ_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_url: String,

    /// Delay between analysis status checks
    #[arg(long, env = "CONTRACTIQ_POLL_INTERVAL_MS", default_value_t = 2000, global = true)]
    poll_interval_ms: u64,

    /// Status checks before giving up (0 = until settled)
    #[arg(long, env = "CONTRACTIQ_MAX_POLL_ATTEMPTS", default_value_t = 150, global = true)]
    max_poll_attempts: u32,

    /// Per-request timeout
    #[arg(long, env = "CONTRACTIQ_TIMEOUT_SECS", default_value_t = 60, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Portfolio counters and the contract list
    List {
        /// Filter by filename or status
        #[arg(long)]
        search: Option<String>,
    },
    /// Full card for one contract
    Show { id: ContractId },
    /// Upload a .pdf or .docx document
    Upload { path: PathBuf },
    /// Run analysis and wait for it to settle
    Analyze { id: ContractId },
    /// Ask one question about a contract
    Ask { id: ContractId, question: String },
    /// Ask one question across all contracts
    AskAll { question: String },
    /// Interactive chat on stdin
    Chat {
        /// Scope the session to one contract instead of the whole vault
        #[arg(long)]
        contract: Option<ContractId>,
    },
    /// Compare two contracts side by side
    Compare { a: ContractId, b: ContractId },
    /// Delete a contract
    Delete { id: ContractId },
    /// Propose a rewrite for one of a contract's risks
    Remediate {
        id: ContractId,
        /// Risk number as listed by `show`
        risk: usize,
    },
    /// Export the analysis report
    Export {
        id: ContractId,
        #[arg(long, value_enum, default_value_t = ExportFormat::Txt)]
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Txt,
    Json,
}

impl Cli {
    fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: (self.max_poll_attempts > 0).then_some(self.max_poll_attempts),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let backend: Arc<dyn Backend> = Arc::new(
        HttpBackend::with_timeout(cli.api_url.as_str(), Duration::from_secs(cli.timeout_secs))
            .context("failed to build HTTP client")?,
    );
    tracing::debug!(api_url = %cli.api_url, "contractiq v{}", env!("CARGO_PKG_VERSION"));
    let options = cli.poll_options();

    match cli.command {
        Command::List { search } => cmd_list(backend, search.as_deref().unwrap_or("")).await,
        Command::Show { id } => cmd_show(backend.as_ref(), id).await,
        Command::Upload { path } => cmd_upload(backend.as_ref(), &path).await,
        Command::Analyze { id } => cmd_analyze(backend, id, options).await,
        Command::Ask { id, question } => {
            cmd_ask(DocumentChat::for_contract(backend, id), &question).await
        }
        Command::AskAll { question } => cmd_ask(CorpusChat::corpus(backend), &question).await,
        Command::Chat { contract: Some(id) } => run_chat(DocumentChat::for_contract(backend, id)).await,
        Command::Chat { contract: None } => run_chat(CorpusChat::corpus(backend)).await,
        Command::Compare { a, b } => cmd_compare(backend, a, b).await,
        Command::Delete { id } => cmd_delete(backend, id).await,
        Command::Remediate { id, risk } => cmd_remediate(backend, id, risk).await,
        Command::Export {
            id,
            format,
            out_dir,
        } => cmd_export(backend.as_ref(), id, format, &out_dir).await,
    }
}

async fn cmd_list(backend: Arc<dyn Backend>, term: &str) -> anyhow::Result<()> {
    let mut dashboard = DashboardAggregator::new(backend);
    dashboard.refresh().await.context("failed to load dashboard")?;
    let analytics = dashboard.analytics();
    let visible = dashboard.search(term);
    display::print_dashboard(&analytics, &visible, term);
    Ok(())
}

async fn cmd_show(backend: &dyn Backend, id: ContractId) -> anyhow::Result<()> {
    let contract = backend
        .get_contract(id)
        .await
        .with_context(|| format!("failed to load contract {id}"))?;
    display::print_contract_card(&contract);
    Ok(())
}

async fn cmd_upload(backend: &dyn Backend, path: &Path) -> anyhow::Result<()> {
    let contract = upload_file(backend, path).await?;
    println!(
        "Uploaded {} as contract {} ({})",
        contract.filename, contract.id, contract.status
    );
    println!("{}", upload_hint(&contract));
    Ok(())
}

/// Next step after an upload. The backend usually starts analysis on its own.
fn upload_hint(contract: &Contract) -> String {
    match contract.status {
        ContractStatus::Processing => format!(
            "Analysis is running; run `contractiq analyze {}` to wait for it.",
            contract.id
        ),
        _ => format!("Run `contractiq analyze {}` to start analysis.", contract.id),
    }
}

async fn cmd_analyze(backend: Arc<dyn Backend>, id: ContractId, options: PollOptions) -> anyhow::Result<()> {
    let mut job = AnalysisJobController::load(backend, id)
        .await
        .with_context(|| format!("failed to load contract {id}"))?;
    let verb = if job.start_or_follow().await? {
        "Analyzing"
    } else {
        "Following running analysis of"
    };
    println!(
        "{verb} {} (checking every {} ms, Ctrl-C to stop waiting)...",
        job.contract().filename,
        options.interval.as_millis()
    );

    let canceller = job.start_polling(options);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });
    let outcome = job.wait_for_terminal().await;
    interrupt.abort();

    match outcome {
        PollOutcome::Analyzed => {
            display::print_contract_card(job.contract());
            Ok(())
        }
        PollOutcome::Failed => bail!("analysis of {} failed", job.contract().filename),
        PollOutcome::Cancelled { attempts } => {
            println!("Stopped waiting after {attempts} checks; the analysis continues on the server.");
            Ok(())
        }
        PollOutcome::Exhausted { attempts } => {
            bail!("analysis did not settle after {attempts} checks; try `contractiq show {id}` later")
        }
        PollOutcome::Error(err) => Err(anyhow::Error::from(err).context("status polling stopped")),
        PollOutcome::Idle => Ok(()),
    }
}

async fn cmd_ask<S: ChatScope>(mut session: ChatSession<S>, question: &str) -> anyhow::Result<()> {
    let outcome = session.send(question).await?;
    if let Some(reply) = session.history().last() {
        display::print_message(&render_message(reply));
    }
    match outcome {
        TurnOutcome::Answered => Ok(()),
        TurnOutcome::Failed(e) => Err(e.into()),
    }
}

async fn run_chat<S: ChatScope>(mut session: ChatSession<S>) -> anyhow::Result<()> {
    for message in session.history().iter() {
        display::print_message(&render_message(message));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        if let TurnOutcome::Failed(e) = session.send(question).await? {
            tracing::warn!(error = %e, "chat turn failed");
        }
        if let Some(reply) = session.history().last() {
            display::print_message(&render_message(reply));
        }
    }
    Ok(())
}

async fn cmd_compare(backend: Arc<dyn Backend>, a: ContractId, b: ContractId) -> anyhow::Result<()> {
    let mut view = ComparisonView::new(backend);
    if let Err(e) = view.load_contracts().await {
        tracing::warn!(error = %e, "contract names unavailable");
    }
    let result = view.compare(Some(a), Some(b)).await?.clone();
    if let Some(table) = view.table() {
        display::print_comparison(&result, &table);
    }
    Ok(())
}

async fn cmd_delete(backend: Arc<dyn Backend>, id: ContractId) -> anyhow::Result<()> {
    let mut dashboard = DashboardAggregator::new(backend);
    dashboard.delete(id).await?;
    println!("Deleted contract {id}");
    display::print_notices(dashboard.notices());
    Ok(())
}

async fn cmd_remediate(backend: Arc<dyn Backend>, id: ContractId, number: usize) -> anyhow::Result<()> {
    let contract = backend
        .get_contract(id)
        .await
        .with_context(|| format!("failed to load contract {id}"))?;
    let risk = number
        .checked_sub(1)
        .and_then(|i| contract.risks().get(i))
        .with_context(|| format!("contract {id} has no risk #{number}"))?;

    let mut remediation = Remediation::new(backend);
    let result = remediation.remediate(&contract, risk).await?;
    display::print_rewrite(risk, result);
    Ok(())
}

async fn cmd_export(
    backend: &dyn Backend,
    id: ContractId,
    format: ExportFormat,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let contract = backend
        .get_contract(id)
        .await
        .with_context(|| format!("failed to load contract {id}"))?;
    if contract.status != ContractStatus::Analyzed {
        bail!("contract {id} is {}; only analyzed contracts can be exported", contract.status);
    }

    let report = build_report(&contract, chrono::Local::now().date_naive(), &ReportLayout::default());
    let exporter: &dyn ExportBackend = match format {
        ExportFormat::Txt => &TextExporter,
        ExportFormat::Json => &JsonExporter { pretty: true },
    };
    let path = export_report(&report, exporter, out_dir)
        .with_context(|| format!("failed to write report to {}", out_dir.display()))?;
    println!("Wrote {} ({} pages)", path.display(), report.pages.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["contractiq", "list"]).unwrap();
        assert_eq!(cli.poll_interval_ms, 2000);
        assert_eq!(cli.max_poll_attempts, 150);
        assert_eq!(cli.poll_options().max_attempts, Some(150));
        assert!(matches!(cli.command, Command::List { search: None }));
    }

    #[test]
    fn upload_hint_follows_returned_status() {
        let mut contract = Contract::new(ContractId(12), "MSA.pdf");
        contract.status = ContractStatus::Processing;
        assert_eq!(
            upload_hint(&contract),
            "Analysis is running; run `contractiq analyze 12` to wait for it."
        );
        contract.status = ContractStatus::Uploaded;
        assert_eq!(upload_hint(&contract), "Run `contractiq analyze 12` to start analysis.");
    }

    #[test]
    fn zero_attempts_means_unbounded() {
        let cli = Cli::try_parse_from(["contractiq", "--max-poll-attempts", "0", "analyze", "4"]).unwrap();
        assert_eq!(cli.poll_options().max_attempts, None);
        assert!(matches!(cli.command, Command::Analyze { id: ContractId(4) }));
    }

    #[test]
    fn export_flags() {
        let cli = Cli::try_parse_from(["contractiq", "export", "7", "--format", "json", "--out-dir", "/tmp"]).unwrap();
        match cli.command {
            Command::Export { id, format, out_dir } => {
                assert_eq!(id, ContractId(7));
                assert!(matches!(format, ExportFormat::Json));
                assert_eq!(out_dir, PathBuf::from("/tmp"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn chat_scope_flag() {
        let cli = Cli::try_parse_from(["contractiq", "chat", "--contract", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Chat { contract: Some(ContractId(3)) }));
    }
}
