//! Export status polling loop
//!
//! Repeats the single status check from the export slice until the job
//! is terminal, the caller cancels, or the deadline passes. The delay
//! grows by half on each round (plus up to 10% jitter) and is capped at
//! `max_interval`. A failed poll is not terminal; the next round retries.

use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::services::export_client::ExportApi;
use crate::store::export_slice::check_export_status;
use crate::store::{Action, ExportAction, Store};
use crate::types::{ExportFormat, ExportStatus, ExportStatusResponse};

const BACKOFF_FACTOR: f64 = 1.5;
const MAX_JITTER: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PollSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.poll_interval,
            max_interval: config.poll_max_interval,
            timeout: config.poll_timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Job reached Completed, Failed or Cancelled
    Finished(ExportStatusResponse),
    /// Caller cancelled the token
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("export {operation_id} did not finish within {timeout:?}")]
    TimedOut {
        operation_id: String,
        timeout: Duration,
        last_status: Option<ExportStatus>,
    },
}

/// Next delay before jitter
pub fn next_delay(current: Duration, max: Duration) -> Duration {
    current.mul_f64(BACKOFF_FACTOR).min(max)
}

fn with_jitter(delay: Duration, max: Duration) -> Duration {
    let factor = rand::thread_rng().gen_range(0.0..=MAX_JITTER);
    (delay + delay.mul_f64(factor)).min(max)
}

pub struct ExportPoller<'a> {
    store: &'a Store,
    api: &'a dyn ExportApi,
    settings: PollSettings,
}

impl<'a> ExportPoller<'a> {
    pub fn new(store: &'a Store, api: &'a dyn ExportApi, settings: PollSettings) -> Self {
        Self { store, api, settings }
    }

    fn stop(&self, operation_id: &str) -> PollOutcome {
        info!("Stopped polling export {}", operation_id);
        self.store.dispatch(Action::Export(ExportAction::StopPolling));
        PollOutcome::Stopped
    }

    pub async fn run(
        &self,
        operation_id: &str,
        format: ExportFormat,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, PollError> {
        let started = Instant::now();
        let mut delay = self.settings.interval;
        let mut last_status = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(self.stop(operation_id)),
                result = check_export_status(self.store, self.api, operation_id, format) => match result {
                    Ok(response) if response.status.is_terminal() => {
                        info!("Export {} finished: {}", operation_id, response.status);
                        return Ok(PollOutcome::Finished(response));
                    }
                    Ok(response) => {
                        debug!("Export {} {} at {}%", operation_id, response.status, response.progress);
                        last_status = Some(response.status);
                    }
                    Err(rejection) => {
                        warn!("Status poll for export {} failed: {}", operation_id, rejection);
                    }
                }
            }

            let elapsed = started.elapsed();
            if elapsed >= self.settings.timeout {
                return Err(PollError::TimedOut {
                    operation_id: operation_id.to_string(),
                    timeout: self.settings.timeout,
                    last_status,
                });
            }

            let wait = with_jitter(delay, self.settings.max_interval).min(self.settings.timeout - elapsed);
            tokio::select! {
                _ = cancel.cancelled() => return Ok(self.stop(operation_id)),
                _ = tokio::time::sleep(wait) => {}
            }
            delay = next_delay(delay, self.settings.max_interval);
        }
    }
}
