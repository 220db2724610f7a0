//! Fetch state machine for the report view.
//!
//! `FetchState::apply` is the pure transition function. `FetchMachine` wraps
//! it with request tagging: every fetch gets a monotonically increasing
//! `RequestId` and only the most recently started fetch may complete. A slow
//! response that lands after a newer fetch started is discarded.

use std::sync::Arc;

use serde::Serialize;

use crate::report::{FailureKind, Report, ReportError};

/// Message shown to the user for any rejected fetch.
pub const REJECTED_MESSAGE: &str = "Error";

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// What the view currently has to show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchState {
    /// Nothing resolved yet, or a retry after a rejection is loading.
    #[default]
    Initial,
    /// A report is available. `is_refreshing` is set while a newer one loads.
    Resolved {
        report: Arc<Report>,
        is_refreshing: bool,
    },
    /// The last fetch failed. `error` is the user-facing message.
    Rejected { error: String, kind: FailureKind },
}

/// Events driving `FetchState` transitions.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    Started,
    Succeeded(Arc<Report>),
    Failed(ReportError),
}

/// Tag for one fetch. Later fetches have larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of the fetch that is allowed to update the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFetch {
    pub request_id: RequestId,
    pub year: i64,
    /// When the fetch started (RFC 3339).
    pub started_at: String,
}

// ═══════════════════════════════════════════════════════════
// Transitions
// ═══════════════════════════════════════════════════════════

impl FetchState {
    pub fn apply(self, event: FetchEvent) -> FetchState {
        match event {
            FetchEvent::Started => match self {
                FetchState::Initial | FetchState::Rejected { .. } => FetchState::Initial,
                FetchState::Resolved { report, .. } => FetchState::Resolved {
                    report,
                    is_refreshing: true,
                },
            },
            FetchEvent::Succeeded(report) => FetchState::Resolved {
                report,
                is_refreshing: false,
            },
            FetchEvent::Failed(err) => FetchState::Rejected {
                error: REJECTED_MESSAGE.to_string(),
                kind: err.kind(),
            },
        }
    }

    /// True while a fetch is outstanding from the viewer's perspective.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            FetchState::Initial
                | FetchState::Resolved {
                    is_refreshing: true,
                    ..
                }
        )
    }

    pub fn report(&self) -> Option<&Arc<Report>> {
        match self {
            FetchState::Resolved { report, .. } => Some(report),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// FetchMachine
// ═══════════════════════════════════════════════════════════

/// Owns the current `FetchState` and decides which completions count.
#[derive(Debug, Default)]
pub struct FetchMachine {
    state: FetchState,
    issued: u64,
    active: Option<ActiveFetch>,
}

impl FetchMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// The latest fetch that has not completed yet, if any.
    pub fn active(&self) -> Option<&ActiveFetch> {
        self.active.as_ref()
    }

    /// Start a fetch for `year`. The returned id supersedes all earlier ones.
    pub fn begin(&mut self, year: i64) -> RequestId {
        self.issued += 1;
        let request_id = RequestId(self.issued);

        if let Some(previous) = self.active.as_ref() {
            tracing::debug!(
                superseded = %previous.request_id,
                %request_id,
                "Fetch started while another is in flight"
            );
        }

        self.transition(FetchEvent::Started);
        self.active = Some(ActiveFetch {
            request_id,
            year,
            started_at: chrono::Utc::now().to_rfc3339(),
        });
        request_id
    }

    /// Complete the fetch tagged `id`.
    ///
    /// Returns `false` and leaves the state untouched when `id` is not the
    /// latest outstanding fetch.
    pub fn complete(&mut self, id: RequestId, outcome: Result<Report, ReportError>) -> bool {
        let is_latest = self
            .active
            .as_ref()
            .is_some_and(|active| active.request_id == id);
        if !is_latest {
            tracing::debug!(request_id = %id, "Discarding stale fetch result");
            return false;
        }

        self.active = None;
        let event = match outcome {
            Ok(report) => FetchEvent::Succeeded(Arc::new(report)),
            Err(err) => {
                tracing::warn!(request_id = %id, kind = %err.kind(), "Report fetch rejected: {err}");
                FetchEvent::Failed(err)
            }
        };
        self.transition(event);
        true
    }

    fn transition(&mut self, event: FetchEvent) {
        let current = std::mem::take(&mut self.state);
        self.state = current.apply(event);
    }
}
