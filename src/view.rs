use std::sync::Arc;

use serde::Serialize;

use crate::report::Report;
use crate::state::FetchState;

/// Which of the three dashboard views the rendering layer should show.
///
/// `Error` comes with a retry action and `Table` with a refresh action; both
/// map to `Dashboard::fetch_report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    Loading,
    Error { message: String },
    Table {
        report: Arc<Report>,
        is_refreshing: bool,
    },
}

impl DashboardView {
    pub fn from_state(state: &FetchState) -> Self {
        match state {
            FetchState::Initial => DashboardView::Loading,
            FetchState::Rejected { error, .. } => DashboardView::Error {
                message: error.clone(),
            },
            FetchState::Resolved {
                report,
                is_refreshing,
            } => DashboardView::Table {
                report: Arc::clone(report),
                is_refreshing: *is_refreshing,
            },
        }
    }
}
