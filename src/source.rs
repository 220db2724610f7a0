//! Report sources: where raw report payloads come from.
//!
//! `HttpReportSource` is the real network boundary (`GET {base}/reports/{year}`).
//! `MockReportSource` replays scripted outcomes for tests and offline runs.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::ReportConfig;
use crate::report::{RawReport, TransportError};

/// One read-only fetch of the raw report for a year.
pub trait ReportSource: Send + Sync {
    fn fetch_report(
        &self,
        year: i64,
    ) -> impl Future<Output = Result<RawReport, TransportError>> + Send;
}

// ═══════════════════════════════════════════════════════════
// HttpReportSource
// ═══════════════════════════════════════════════════════════

/// HTTP client for the report endpoint.
pub struct HttpReportSource {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpReportSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &ReportConfig) -> Result<Self, TransportError> {
        Self::new(config.base_url(), config.timeout_secs)
    }

    pub fn report_url(&self, year: i64) -> String {
        format!("{}/reports/{year}", self.base_url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_connect() {
            TransportError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            TransportError::Timeout(self.timeout_secs)
        } else {
            TransportError::Client(e.to_string())
        }
    }
}

impl ReportSource for HttpReportSource {
    async fn fetch_report(&self, year: i64) -> Result<RawReport, TransportError> {
        let url = self.report_url(year);
        tracing::debug!(%url, "Fetching report");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<RawReport>().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout_secs)
            } else {
                TransportError::Body(e.to_string())
            }
        })
    }
}

// ═══════════════════════════════════════════════════════════
// MockReportSource
// ═══════════════════════════════════════════════════════════

/// Scripted report source. Outcomes are returned in order; once the script
/// runs out the last outcome repeats.
///
/// The script is plain data, so a poisoned lock (a panicking test thread) is
/// recovered rather than losing scripted outcomes.
#[derive(Default)]
pub struct MockReportSource {
    script: Mutex<Script>,
    requested: Mutex<Vec<i64>>,
}

#[derive(Default)]
struct Script {
    pending: VecDeque<Result<RawReport, TransportError>>,
    last: Option<Result<RawReport, TransportError>>,
}

impl MockReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(self, payload: RawReport) -> Self {
        self.push(Ok(payload))
    }

    pub fn with_error(self, error: TransportError) -> Self {
        self.push(Err(error))
    }

    fn push(self, outcome: Result<RawReport, TransportError>) -> Self {
        self.lock_script().pending.push_back(outcome);
        self
    }

    /// Years requested so far, in call order.
    pub fn requested_years(&self) -> Vec<i64> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_outcome(&self) -> Result<RawReport, TransportError> {
        let mut script = self.lock_script();

        if let Some(outcome) = script.pending.pop_front() {
            script.last = Some(outcome.clone());
            return outcome;
        }
        script.last.clone().unwrap_or_else(|| {
            Err(TransportError::Client(
                "mock source has no scripted response".into(),
            ))
        })
    }
}

impl ReportSource for MockReportSource {
    async fn fetch_report(&self, year: i64) -> Result<RawReport, TransportError> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(year);
        self.next_outcome()
    }
}
