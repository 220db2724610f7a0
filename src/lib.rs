pub mod config;
pub mod dashboard;
pub mod report;
pub mod source;
pub mod state;
pub mod view;

pub use dashboard::{Dashboard, DashboardError};
pub use report::{CaregiverRecord, FailureKind, Report, ReportError};
pub use state::FetchState;
pub use view::DashboardView;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over the default filter.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_tracing_twice_does_not_panic() {
        super::init_tracing();
        super::init_tracing();
    }
}
