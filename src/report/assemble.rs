use super::normalize::normalize;
use super::types::{CaregiverRecord, RawReport, Report};
use super::validation::{validate, ValidationError};

/// Build the canonical report from a validated year and normalized caregivers.
pub fn assemble(year: i64, caregivers: Vec<CaregiverRecord>) -> Report {
    Report { year, caregivers }
}

/// Run the full decode pipeline: validate, merge caregivers, assemble.
///
/// Validation failures are logged with the full path report before being
/// returned; the caller only surfaces a simple message to the user.
pub fn decode_report(raw: &RawReport) -> Result<Report, ValidationError> {
    let payload = validate(raw).map_err(|e| {
        tracing::error!(
            issue_count = e.issues().len(),
            "Report payload failed validation: {e}"
        );
        e
    })?;

    let received = payload.caregivers.len();
    let caregivers = normalize(payload.caregivers);
    tracing::debug!(
        year = payload.year,
        received,
        merged = caregivers.len(),
        "Report caregivers normalized"
    );

    Ok(assemble(payload.year, caregivers))
}
