/// Application-level constants
pub const APP_NAME: &str = "Caregiver Dashboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Report year the dashboard loads when none is configured.
pub const DEFAULT_REPORT_YEAR: i64 = 2021;

/// Report endpoint used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Whole-request timeout for report fetches.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "CAREGIVER_REPORT_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "CAREGIVER_REPORT_TIMEOUT_SECS";
const ENV_YEAR: &str = "CAREGIVER_REPORT_YEAR";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "warn,caregiver_dashboard_lib=info"
}

/// Where and how to fetch the report. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    base_url: String,
    pub timeout_secs: u64,
    pub year: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_REPORT_YEAR)
    }
}

impl ReportConfig {
    pub fn new(base_url: &str, timeout_secs: u64, year: i64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            year,
        }
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys use defaults;
    /// numbers that fail to parse, and a zero timeout, fall back to defaults
    /// with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs =
            parse_or_default(&lookup, ENV_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, |secs: &u64| {
                *secs > 0
            });
        let year = parse_or_default(&lookup, ENV_YEAR, DEFAULT_REPORT_YEAR, |_| true);

        Self::new(base_url.trim(), timeout_secs, year)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `path` onto the base URL with exactly one `/` between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL of the report for the configured year.
    pub fn report_url(&self) -> String {
        self.endpoint(&format!("reports/{}", self.year))
    }
}

fn parse_or_default<T: std::str::FromStr + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    accept: impl Fn(&T) -> bool,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => value,
        _ => {
            tracing::warn!(key, value = %raw, %default, "Ignoring invalid config value");
            default
        }
    }
}
