use serde::{Deserialize, Serialize};

/// Untrusted payload as received from the report endpoint.
pub type RawReport = serde_json::Value;

/// Canonical yearly report. Caregiver names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub year: i64,
    pub caregivers: Vec<CaregiverRecord>,
}

/// A caregiver and the patients assigned to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaregiverRecord {
    pub name: String,
    pub patients: Vec<String>,
}

impl CaregiverRecord {
    pub fn new(name: impl Into<String>, patients: Vec<String>) -> Self {
        Self {
            name: name.into(),
            patients,
        }
    }
}

/// Payload that passed schema validation but has not been normalized yet.
/// Caregivers are in payload order and may repeat a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayload {
    pub year: i64,
    pub caregivers: Vec<CaregiverRecord>,
}

impl Report {
    /// Total number of patient entries across all caregivers.
    pub fn patient_count(&self) -> usize {
        self.caregivers.iter().map(|c| c.patients.len()).sum()
    }

    pub fn caregiver(&self, name: &str) -> Option<&CaregiverRecord> {
        self.caregivers.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_with_field_names() {
        let report = Report {
            year: 2021,
            caregivers: vec![CaregiverRecord::new("Alice", vec!["P1".into()])],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "year": 2021,
                "caregivers": [{"name": "Alice", "patients": ["P1"]}]
            })
        );
    }

    #[test]
    fn caregiver_lookup_and_patient_count() {
        let report = Report {
            year: 2021,
            caregivers: vec![
                CaregiverRecord::new("Alice", vec!["P1".into(), "P3".into()]),
                CaregiverRecord::new("Bob", vec![]),
            ],
        };
        assert_eq!(report.patient_count(), 2);
        assert!(report.caregiver("Bob").unwrap().patients.is_empty());
        assert!(report.caregiver("Carol").is_none());
    }
}
