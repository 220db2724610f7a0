use std::collections::HashMap;

use super::types::CaregiverRecord;

/// Merge caregiver records that share a name.
///
/// The first record seen for a name keeps its position; patients of later
/// records with the same name are appended to it in input order. Patient
/// lists are concatenated as-is, so the same patient may appear twice.
pub fn normalize(records: Vec<CaregiverRecord>) -> Vec<CaregiverRecord> {
    let mut merged: Vec<CaregiverRecord> = Vec::with_capacity(records.len());
    let mut position: HashMap<String, usize> = HashMap::with_capacity(records.len());

    for record in records {
        match position.get(&record.name) {
            Some(&idx) => merged[idx].patients.extend(record.patients),
            None => {
                position.insert(record.name.clone(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, patients: &[&str]) -> CaregiverRecord {
        CaregiverRecord::new(name, patients.iter().map(|p| p.to_string()).collect())
    }

    fn total_patients(records: &[CaregiverRecord]) -> usize {
        records.iter().map(|r| r.patients.len()).sum()
    }

    #[test]
    fn merges_by_name_in_first_seen_order() {
        let input = vec![
            record("Alice", &["P1"]),
            record("Bob", &["P2"]),
            record("Alice", &["P3"]),
        ];
        let output = normalize(input);
        assert_eq!(
            output,
            vec![record("Alice", &["P1", "P3"]), record("Bob", &["P2"])]
        );
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn single_record_unchanged() {
        let input = vec![record("Alice", &["P1", "P2"])];
        assert_eq!(normalize(input.clone()), input);
    }

    #[test]
    fn all_same_name_concatenates_everything() {
        let input = vec![
            record("Alice", &["P1", "P2"]),
            record("Alice", &[]),
            record("Alice", &["P3"]),
            record("Alice", &["P1"]),
        ];
        let output = normalize(input);
        assert_eq!(output, vec![record("Alice", &["P1", "P2", "P3", "P1"])]);
    }

    #[test]
    fn duplicate_patients_are_kept() {
        let input = vec![record("Alice", &["P1"]), record("Alice", &["P1"])];
        let output = normalize(input);
        assert_eq!(output[0].patients, vec!["P1", "P1"]);
    }

    #[test]
    fn preserves_total_patient_count() {
        let input = vec![
            record("Dana", &["P1", "P2"]),
            record("Eve", &["P3"]),
            record("Dana", &["P4"]),
            record("Frank", &[]),
            record("Eve", &["P5", "P6"]),
        ];
        let before = total_patients(&input);
        let output = normalize(input.clone());
        assert_eq!(total_patients(&output), before);
        assert!(output.len() <= input.len());
    }

    #[test]
    fn every_name_once_in_first_occurrence_order() {
        let input = vec![
            record("Carol", &["P1"]),
            record("Alice", &["P2"]),
            record("Carol", &["P3"]),
            record("Bob", &["P4"]),
            record("Alice", &["P5"]),
        ];
        let names: Vec<String> = normalize(input).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
    }

    #[test]
    fn unique_input_is_fixed_point() {
        let input = vec![
            record("Alice", &["P1"]),
            record("Bob", &["P2", "P2"]),
            record("Carol", &[]),
        ];
        let once = normalize(input.clone());
        assert_eq!(once, input);
        assert_eq!(normalize(once.clone()), once);
    }

    #[test]
    fn names_are_case_sensitive() {
        let output = normalize(vec![record("alice", &["P1"]), record("Alice", &["P2"])]);
        assert_eq!(output.len(), 2);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use proptest::test_runner::Config;

        fn records() -> impl Strategy<Value = Vec<CaregiverRecord>> {
            prop::collection::vec(
                ("[A-E]", prop::collection::vec("P[0-9]", 0..4)),
                0..16,
            )
            .prop_map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(name, patients)| CaregiverRecord::new(name, patients))
                    .collect::<Vec<_>>()
            })
        }

        fn first_seen_names(records: &[CaregiverRecord]) -> Vec<String> {
            let mut names: Vec<String> = Vec::new();
            for r in records {
                if !names.contains(&r.name) {
                    names.push(r.name.clone());
                }
            }
            names
        }

        proptest! {
            #![proptest_config(Config::with_cases(256))]

            #[test]
            fn patient_count_preserved(input in records()) {
                let before = total_patients(&input);
                let output = normalize(input.clone());
                prop_assert_eq!(total_patients(&output), before);
                prop_assert!(output.len() <= input.len());
            }

            #[test]
            fn names_once_in_first_seen_order(input in records()) {
                let expected = first_seen_names(&input);
                let output = normalize(input);
                let names: Vec<String> = output.into_iter().map(|r| r.name).collect();
                prop_assert_eq!(names, expected);
            }

            #[test]
            fn patients_concatenate_in_input_order(input in records()) {
                let output = normalize(input.clone());
                for merged in &output {
                    let expected: Vec<String> = input
                        .iter()
                        .filter(|r| r.name == merged.name)
                        .flat_map(|r| r.patients.iter().cloned())
                        .collect();
                    prop_assert_eq!(&merged.patients, &expected);
                }
            }

            #[test]
            fn normalizing_twice_changes_nothing(input in records()) {
                let once = normalize(input);
                prop_assert_eq!(normalize(once.clone()), once);
            }
        }
    }
}
