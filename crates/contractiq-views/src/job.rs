//! Analysis job lifecycle for one contract: start the remote job, then poll
//! its status on a fixed interval until it settles.
//!
//! Polling runs on a spawned task owned by a [`PollHandle`]. The task stops
//! on its own once the contract is `analyzed` or `failed`, when the attempt
//! budget runs out, on a fetch error that retrying cannot fix, or as soon as
//! the handle is cancelled or dropped. No status fetch is issued after any of
//! those. Transient fetch errors count as attempts and are retried.

use std::sync::Arc;
use std::time::Duration;

use contractiq_api::{ApiError, Backend};
use contractiq_core::{Contract, ContractId, ContractStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::{JobStartError, PollFetchError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// `None` polls until a terminal status or cancellation.
    pub max_attempts: Option<u32>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
        }
    }
}

/// How a polling run ended.
#[derive(Debug)]
pub enum PollOutcome {
    Analyzed,
    Failed,
    Cancelled { attempts: u32 },
    Exhausted { attempts: u32 },
    /// A status fetch failed in a way retrying will not fix.
    Error(PollFetchError),
    /// No poll was running.
    Idle,
}

/// What the poll task hands back when it stops.
#[derive(Debug)]
enum PollEnd {
    Terminal(Contract),
    Cancelled { attempts: u32 },
    Exhausted { attempts: u32 },
    Error(PollFetchError),
}

/// Stops a running poll from anywhere. Cloneable, so a signal handler can hold
/// one while the owner awaits the outcome.
#[derive(Debug, Clone)]
pub struct PollCanceller {
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl PollCanceller {
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Owns one polling task. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct PollHandle {
    canceller: PollCanceller,
    task: Option<JoinHandle<PollEnd>>,
}

impl PollHandle {
    fn spawn(backend: Arc<dyn Backend>, id: ContractId, options: PollOptions) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(poll_status(backend, id, options, shutdown_rx));
        Self {
            canceller: PollCanceller {
                shutdown_tx: Arc::new(shutdown_tx),
            },
            task: Some(task),
        }
    }

    pub fn canceller(&self) -> PollCanceller {
        self.canceller.clone()
    }

    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|t| t.is_finished())
    }

    async fn join(mut self) -> Option<PollEnd> {
        let task = self.task.take()?;
        match task.await {
            Ok(end) => Some(end),
            Err(e) => {
                error!(error = %e, "poll task did not complete");
                None
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.canceller.cancel();
    }
}

async fn poll_status(
    backend: Arc<dyn Backend>,
    id: ContractId,
    options: PollOptions,
    mut shutdown_rx: watch::Receiver<bool>,
) -> PollEnd {
    // First fetch one interval after start; the job was only just accepted.
    let mut ticker = tokio::time::interval_at(Instant::now() + options.interval, options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempts = 0u32;

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                info!(contract_id = %id, attempts, "status polling cancelled");
                return PollEnd::Cancelled { attempts };
            }
            _ = ticker.tick() => {
                attempts += 1;
                match backend.get_contract(id).await {
                    Ok(contract) if contract.status.is_terminal() => {
                        info!(contract_id = %id, status = %contract.status, attempts, "analysis settled");
                        return PollEnd::Terminal(contract);
                    }
                    Ok(contract) => {
                        debug!(contract_id = %id, status = %contract.status, attempts, "analysis still running");
                    }
                    Err(source) if source.is_transient() => {
                        let err = PollFetchError { id, attempt: attempts, source };
                        warn!(error = %err, "retrying on next tick");
                    }
                    Err(source) => {
                        let err = PollFetchError { id, attempt: attempts, source };
                        error!(error = %err, "status polling stopped");
                        return PollEnd::Error(err);
                    }
                }
                if let Some(max) = options.max_attempts
                    && attempts >= max
                {
                    warn!(contract_id = %id, attempts, "giving up on status polling");
                    return PollEnd::Exhausted { attempts };
                }
            }
        }
    }
}

/// Per-contract view of an analysis job.
pub struct AnalysisJobController {
    backend: Arc<dyn Backend>,
    contract: Contract,
    poll: Option<PollHandle>,
}

impl AnalysisJobController {
    pub fn new(backend: Arc<dyn Backend>, contract: Contract) -> Self {
        Self {
            backend,
            contract: contract.normalized(),
            poll: None,
        }
    }

    /// Fetch the contract and wrap it.
    pub async fn load(backend: Arc<dyn Backend>, id: ContractId) -> Result<Self, ApiError> {
        let contract = backend.get_contract(id).await?;
        Ok(Self::new(backend, contract))
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn status(&self) -> ContractStatus {
        self.contract.status
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Replace the local copy with the backend's.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.contract = self.backend.get_contract(self.contract.id).await?.normalized();
        Ok(())
    }

    /// Ask the backend to start analysis. On acceptance the local copy moves
    /// to `processing` and drops any previous enrichment; on failure it is
    /// left untouched.
    pub async fn request_analysis(&mut self) -> Result<(), JobStartError> {
        let id = self.contract.id;
        if !self.contract.status.can_transition_to(ContractStatus::Processing) {
            return Err(JobStartError::AlreadyProcessing(id));
        }
        self.backend
            .start_analysis(id)
            .await
            .map_err(|source| JobStartError::Remote { id, source })?;
        self.contract
            .begin_analysis()
            .map_err(|_| JobStartError::AlreadyProcessing(id))?;
        info!(contract_id = %id, filename = %self.contract.filename, "analysis started");
        Ok(())
    }

    /// Start analysis unless the backend is already running it. Uploads come
    /// back `processing` because the backend starts the pipeline itself;
    /// those are followed as they are. Returns whether a job was requested.
    pub async fn start_or_follow(&mut self) -> Result<bool, JobStartError> {
        if self.contract.status == ContractStatus::Processing {
            debug!(contract_id = %self.contract.id, "analysis already running");
            return Ok(false);
        }
        self.request_analysis().await?;
        Ok(true)
    }

    /// Start polling in the background, replacing any poll already running.
    pub fn start_polling(&mut self, options: PollOptions) -> PollCanceller {
        self.cancel_polling();
        let handle = PollHandle::spawn(self.backend.clone(), self.contract.id, options);
        let canceller = handle.canceller();
        self.poll = Some(handle);
        canceller
    }

    /// Stop the running poll, if any. The local copy is left as it was.
    pub fn cancel_polling(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.cancel();
        }
    }

    /// Wait for the running poll to stop and fold its result into the local
    /// copy.
    pub async fn wait_for_terminal(&mut self) -> PollOutcome {
        let Some(handle) = self.poll.take() else {
            return PollOutcome::Idle;
        };
        match handle.join().await {
            Some(PollEnd::Terminal(contract)) => self.settle(contract),
            Some(PollEnd::Cancelled { attempts }) => PollOutcome::Cancelled { attempts },
            Some(PollEnd::Exhausted { attempts }) => PollOutcome::Exhausted { attempts },
            Some(PollEnd::Error(err)) => PollOutcome::Error(err),
            None => PollOutcome::Cancelled { attempts: 0 },
        }
    }

    pub async fn poll_until_terminal(&mut self, options: PollOptions) -> PollOutcome {
        self.start_polling(options);
        self.wait_for_terminal().await
    }

    /// Start analysis and poll until it settles.
    pub async fn run_analysis(&mut self, options: PollOptions) -> Result<PollOutcome, JobStartError> {
        self.request_analysis().await?;
        Ok(self.poll_until_terminal(options).await)
    }

    fn settle(&mut self, contract: Contract) -> PollOutcome {
        match contract.status {
            ContractStatus::Failed => {
                self.contract = contract;
                self.contract.mark_failed();
                PollOutcome::Failed
            }
            _ => {
                self.contract = contract.normalized();
                PollOutcome::Analyzed
            }
        }
    }
}
