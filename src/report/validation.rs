// Schema validation for raw report payloads.
// Walks the untyped JSON value against the expected report shape and collects
// every mismatch instead of stopping at the first one, so the diagnostic log
// shows the whole picture of a broken payload.

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{CaregiverRecord, RawReport, ValidatedPayload};

/// One structural mismatch, located by a `$`-rooted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub path: String,
    pub expected: &'static str,
    pub found: String,
}

impl SchemaIssue {
    pub fn missing(path: impl Into<String>, expected: &'static str) -> Self {
        Self {
            path: path.into(),
            expected,
            found: "missing".to_string(),
        }
    }

    pub fn mismatch(path: impl Into<String>, expected: &'static str, value: &Value) -> Self {
        Self {
            path: path.into(),
            expected,
            found: json_type(value).to_string(),
        }
    }
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.path, self.expected, self.found
        )
    }
}

/// Payload does not match the report shape. Always carries at least one issue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
    issues: Vec<SchemaIssue>,
}

impl ValidationError {
    pub(crate) fn new(issues: Vec<SchemaIssue>) -> Self {
        debug_assert!(!issues.is_empty(), "validation error without issues");
        Self { issues }
    }

    pub fn issues(&self) -> &[SchemaIssue] {
        &self.issues
    }

    /// Whether any issue sits exactly at `path`.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path == path)
    }
}

fn render_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate an untrusted payload against the report shape.
///
/// Expects `{ year: integer, caregivers: [{ name: string, patients: [string] }] }`.
/// Extra fields are ignored. On failure every mismatch is reported.
pub fn validate(raw: &RawReport) -> Result<ValidatedPayload, ValidationError> {
    let Some(root) = raw.as_object() else {
        return Err(ValidationError::new(vec![SchemaIssue::mismatch(
            "$", "object", raw,
        )]));
    };

    let mut issues = Vec::new();
    let year = check_year(root, &mut issues);
    let caregivers = check_caregivers(root, &mut issues);

    match (year, caregivers) {
        (Some(year), Some(caregivers)) if issues.is_empty() => {
            Ok(ValidatedPayload { year, caregivers })
        }
        _ => Err(ValidationError::new(issues)),
    }
}

fn check_year(root: &Map<String, Value>, issues: &mut Vec<SchemaIssue>) -> Option<i64> {
    const PATH: &str = "$.year";
    match root.get("year") {
        None => {
            issues.push(SchemaIssue::missing(PATH, "number"));
            None
        }
        Some(value) if value.is_number() => {
            let year = value.as_i64().or_else(|| integral_f64(value));
            if year.is_none() {
                issues.push(SchemaIssue::mismatch(PATH, "integer", value));
            }
            year
        }
        Some(other) => {
            issues.push(SchemaIssue::mismatch(PATH, "number", other));
            None
        }
    }
}

/// Whole-valued floats such as `2021.0` or `2.021e3` that fit in `i64`.
fn integral_f64(value: &Value) -> Option<i64> {
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
}

fn check_caregivers(
    root: &Map<String, Value>,
    issues: &mut Vec<SchemaIssue>,
) -> Option<Vec<CaregiverRecord>> {
    const PATH: &str = "$.caregivers";
    let items = match root.get("caregivers") {
        None => {
            issues.push(SchemaIssue::missing(PATH, "array"));
            return None;
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            issues.push(SchemaIssue::mismatch(PATH, "array", other));
            return None;
        }
    };

    let mut records = Vec::with_capacity(items.len());
    let mut all_valid = true;
    for (idx, item) in items.iter().enumerate() {
        match check_caregiver(&format!("{PATH}[{idx}]"), item, issues) {
            Some(record) => records.push(record),
            None => all_valid = false,
        }
    }

    all_valid.then_some(records)
}

fn check_caregiver(
    path: &str,
    item: &Value,
    issues: &mut Vec<SchemaIssue>,
) -> Option<CaregiverRecord> {
    let Some(fields) = item.as_object() else {
        issues.push(SchemaIssue::mismatch(path, "object", item));
        return None;
    };

    let name_path = format!("{path}.name");
    let name = match fields.get("name") {
        None => {
            issues.push(SchemaIssue::missing(name_path, "string"));
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            issues.push(SchemaIssue {
                path: name_path,
                expected: "non-empty string",
                found: "empty string".to_string(),
            });
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(SchemaIssue::mismatch(name_path, "string", other));
            None
        }
    };

    let patients_path = format!("{path}.patients");
    let patients = match fields.get("patients") {
        None => {
            issues.push(SchemaIssue::missing(patients_path, "array"));
            None
        }
        Some(Value::Array(entries)) => check_patients(&patients_path, entries, issues),
        Some(other) => {
            issues.push(SchemaIssue::mismatch(patients_path, "array", other));
            None
        }
    };

    Some(CaregiverRecord {
        name: name?,
        patients: patients?,
    })
}

fn check_patients(
    path: &str,
    entries: &[Value],
    issues: &mut Vec<SchemaIssue>,
) -> Option<Vec<String>> {
    let before = issues.len();
    let patients: Vec<String> = entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| match entry {
            Value::String(s) => Some(s.clone()),
            other => {
                issues.push(SchemaIssue::mismatch(
                    format!("{path}[{idx}]"),
                    "string",
                    other,
                ));
                None
            }
        })
        .collect();

    (issues.len() == before).then_some(patients)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
