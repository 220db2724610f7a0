//! Dashboard: owns the fetch state machine and the report source, and
//! exposes the state plus a single `fetch_report` action to the view layer.
//!
//! Initial load, retry and refresh are all the same action. Fetches are never
//! cancelled; when several overlap, only the most recently started one may
//! update the state.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::{broadcast, watch};

use crate::config::ReportConfig;
use crate::report::{decode_report, Report, ReportError, TransportError};
use crate::source::{HttpReportSource, ReportSource};
use crate::state::{ActiveFetch, FetchMachine, FetchState, RequestId};
use crate::view::DashboardView;

/// Transitions buffered per subscriber before it starts lagging.
const TRANSITION_BUFFER: usize = 16;

/// Errors from the dashboard itself (not from fetching).
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Yearly caregiver report dashboard.
pub struct Dashboard<S> {
    source: S,
    year: i64,
    machine: Mutex<FetchMachine>,
    current: watch::Sender<FetchState>,
    transitions: broadcast::Sender<FetchState>,
}

impl Dashboard<HttpReportSource> {
    /// Dashboard backed by the HTTP report endpoint described by `config`.
    pub fn from_config(config: &ReportConfig) -> Result<Self, TransportError> {
        Ok(Self::new(HttpReportSource::from_config(config)?, config.year))
    }
}

impl<S: ReportSource> Dashboard<S> {
    pub fn new(source: S, year: i64) -> Self {
        let (current, _) = watch::channel(FetchState::Initial);
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            source,
            year,
            machine: Mutex::new(FetchMachine::new()),
            current,
            transitions,
        }
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState {
        self.current.borrow().clone()
    }

    /// Receiver that gets every state published after this call, in order,
    /// including the loading markers. A subscriber that falls more than
    /// `TRANSITION_BUFFER` states behind gets `RecvError::Lagged` and loses
    /// the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<FetchState> {
        self.transitions.subscribe()
    }

    pub fn view(&self) -> DashboardView {
        DashboardView::from_state(&self.state())
    }

    /// The fetch currently allowed to update the state, if one is in flight.
    pub fn active_fetch(&self) -> Option<ActiveFetch> {
        self.lock_machine().ok()?.active().cloned()
    }

    /// Fetch, validate and normalize the report, then publish the outcome.
    ///
    /// Returns the state after this fetch completes. If a newer fetch was
    /// started in the meantime, this fetch's result is dropped and the
    /// returned state reflects whatever the newer one has published so far.
    pub async fn fetch_report(&self) -> Result<FetchState, DashboardError> {
        let request_id = self.begin()?;

        let outcome = match self.source.fetch_report(self.year).await {
            Ok(raw) => decode_report(&raw).map_err(ReportError::from),
            Err(e) => Err(ReportError::from(e)),
        };

        if let Ok(report) = &outcome {
            tracing::info!(
                %request_id,
                year = report.year,
                caregivers = report.caregivers.len(),
                "Report resolved"
            );
        }

        self.complete(request_id, outcome)?;
        Ok(self.state())
    }

    // ── Internal ────────────────────────────────────────────

    fn lock_machine(&self) -> Result<MutexGuard<'_, FetchMachine>, DashboardError> {
        self.machine.lock().map_err(|_| DashboardError::LockPoisoned)
    }

    fn begin(&self) -> Result<RequestId, DashboardError> {
        let mut machine = self.lock_machine()?;
        let request_id = machine.begin(self.year);
        self.publish(machine.state());
        Ok(request_id)
    }

    fn complete(
        &self,
        request_id: RequestId,
        outcome: Result<Report, ReportError>,
    ) -> Result<(), DashboardError> {
        let mut machine = self.lock_machine()?;
        if machine.complete(request_id, outcome) {
            self.publish(machine.state());
        }
        Ok(())
    }

    /// Called with the machine lock held so observers see states in order.
    fn publish(&self, state: &FetchState) {
        self.current.send_replace(state.clone());
        // No subscribers is fine
        let _ = self.transitions.send(state.clone());
    }
}
