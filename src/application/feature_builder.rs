//! Feature vector construction.
//!
//! Maps a partial patient record onto the classifier's fixed feature order.
//! This is a total function: every branch falls back to the default table,
//! so incomplete intake data lowers prediction quality but never fails a
//! request.

use std::sync::Arc;

use crate::domain::{
    DefaultTable, DimensionSet, FeatureSchema, FeatureSource, FeatureVector, PatientRecord,
};

/// Build the feature vector for `record` in schema order.
///
/// - Categorical features resolve the lower-cased label through the matching
///   lookup; a missing, empty or unknown label yields the default.
/// - Every other feature is coerced to a number; a missing value or a value
///   that cannot be coerced yields the default.
#[must_use]
pub fn build_feature_vector(
    record: &PatientRecord,
    lookups: &DimensionSet,
    schema: &FeatureSchema,
    defaults: &DefaultTable,
) -> FeatureVector {
    let values = schema
        .specs()
        .iter()
        .map(|spec| {
            let resolved = match spec.source {
                FeatureSource::Categorical { dimension, label } => label(record)
                    .filter(|l| !l.is_empty())
                    .and_then(|l| lookups.lookup(dimension).resolve(l))
                    .map(|key| key as f64),
                FeatureSource::Scalar(field) => field(record).and_then(|v| v.coerce()),
            };
            resolved.unwrap_or_else(|| defaults.get(spec.name))
        })
        .collect();

    FeatureVector::from_built(values)
}

/// Schema and defaults bundled for repeated use.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    schema: Arc<FeatureSchema>,
    defaults: Arc<DefaultTable>,
}

impl FeatureVectorBuilder {
    #[must_use]
    pub fn new(schema: FeatureSchema, defaults: DefaultTable) -> Self {
        Self {
            schema: Arc::new(schema),
            defaults: Arc::new(defaults),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    #[must_use]
    pub fn build(&self, record: &PatientRecord, lookups: &DimensionSet) -> FeatureVector {
        build_feature_vector(record, lookups, &self.schema, &self.defaults)
    }
}

impl Default for FeatureVectorBuilder {
    fn default() -> Self {
        let schema = FeatureSchema::readmission_v1();
        let defaults = DefaultTable::standard(&schema);
        Self::new(schema, defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DimensionLookup, FieldValue};
    use proptest::prelude::*;

    fn lookups() -> DimensionSet {
        DimensionSet::new(
            [("m", 1), ("f", 2)].into_iter().collect(),
            [("white", 1), ("black", 2)].into_iter().collect(),
            [("hispanic", 1), ("nonhispanic", 2)].into_iter().collect(),
        )
    }

    fn at(builder: &FeatureVectorBuilder, vector: &FeatureVector, name: &str) -> f64 {
        let idx = builder.schema().position(name).expect("Known feature");
        vector.as_slice()[idx]
    }

    #[test]
    fn test_scenario_known_labels_and_flag() {
        let builder = FeatureVectorBuilder::default();
        let record = PatientRecord {
            age: Some(FieldValue::Int(50)),
            gender: Some("m".into()),
            race: Some("White".into()),
            ethnicity: Some("Hispanic".into()),
            has_diabetes: Some(FieldValue::Bool(true)),
            ..PatientRecord::default()
        };

        let vector = builder.build(&record, &lookups());

        let mut expected = vec![0.0; 22];
        expected[0] = 50.0;
        expected[1] = 1.0;
        expected[2] = 1.0;
        expected[3] = 1.0;
        expected[4] = 1.0;
        assert_eq!(vector.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_scenario_empty_record_equals_defaults() {
        let builder = FeatureVectorBuilder::default();
        let vector = builder.build(&PatientRecord::default(), &lookups());
        assert_eq!(vector.into_inner(), builder.defaults().to_vec(builder.schema()));
    }

    #[test]
    fn test_scenario_mixed_case_label() {
        let builder = FeatureVectorBuilder::default();
        let record = PatientRecord {
            gender: Some("M".into()),
            ..PatientRecord::default()
        };
        let vector = builder.build(&record, &lookups());
        assert!((at(&builder, &vector, "gender_key") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scenario_non_numeric_count_defaults() {
        let builder = FeatureVectorBuilder::default();
        let record = PatientRecord {
            num_meds: Some(FieldValue::from("five")),
            num_procedures: Some(FieldValue::from("3")),
            ..PatientRecord::default()
        };
        let vector = builder.build(&record, &lookups());
        assert!(at(&builder, &vector, "num_meds").abs() < f64::EPSILON);
        assert!((at(&builder, &vector, "num_procedures") - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_and_empty_labels_use_defaults() {
        let schema = FeatureSchema::readmission_v1();
        let defaults = DefaultTable::standard(&schema)
            .with("race_key", 99.0)
            .expect("Known feature")
            .with("gender_key", 42.0)
            .expect("Known feature");
        let builder = FeatureVectorBuilder::new(schema, defaults);

        let record = PatientRecord {
            gender: Some(String::new()),
            race: Some("martian".into()),
            ..PatientRecord::default()
        };
        let vector = builder.build(&record, &lookups());
        assert!((at(&builder, &vector, "gender_key") - 42.0).abs() < f64::EPSILON);
        assert!((at(&builder, &vector, "race_key") - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_label_ignores_empty_lookup_entry() {
        let builder = FeatureVectorBuilder::default();
        let set = DimensionSet::new(
            [("", 9), ("m", 1)].into_iter().collect(),
            [("white", 1)].into_iter().collect(),
            [("hispanic", 1)].into_iter().collect(),
        );
        let record = PatientRecord {
            gender: Some(String::new()),
            ..PatientRecord::default()
        };

        let vector = builder.build(&record, &set);
        assert!(at(&builder, &vector, "gender_key").abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_lookups_force_defaults() {
        let builder = FeatureVectorBuilder::default();
        let record = PatientRecord {
            gender: Some("m".into()),
            ..PatientRecord::default()
        };
        let empty = DimensionSet::new(
            DimensionLookup::new(),
            DimensionLookup::new(),
            DimensionLookup::new(),
        );
        let vector = builder.build(&record, &empty);
        assert!(at(&builder, &vector, "gender_key").abs() < f64::EPSILON);
    }

    #[test]
    fn test_boolean_flags_serialize_as_zero_one() {
        let builder = FeatureVectorBuilder::default();
        let record = PatientRecord {
            has_copd: Some(FieldValue::Bool(true)),
            had_surgery: Some(FieldValue::Bool(false)),
            ..PatientRecord::default()
        };
        let vector = builder.build(&record, &lookups());
        assert!((at(&builder, &vector, "has_copd") - 1.0).abs() < f64::EPSILON);
        assert!(at(&builder, &vector, "had_surgery").abs() < f64::EPSILON);
    }

    fn field_value() -> impl Strategy<Value = Option<FieldValue>> {
        prop_oneof![
            Just(None),
            any::<bool>().prop_map(|b| Some(FieldValue::Bool(b))),
            (-1000i64..1000).prop_map(|i| Some(FieldValue::Int(i))),
            (-1000.0f64..1000.0).prop_map(|f| Some(FieldValue::Float(f))),
            "[a-z0-9 ]{0,6}".prop_map(|s| Some(FieldValue::Text(s))),
        ]
    }

    fn label() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("M".to_string())),
            Just(Some("black".to_string())),
            "[A-Za-z]{0,8}".prop_map(Some),
        ]
    }

    fn record() -> impl Strategy<Value = PatientRecord> {
        (
            (field_value(), label(), label(), label()),
            proptest::collection::vec(field_value(), 18),
        )
            .prop_map(|((age, gender, race, ethnicity), mut rest)| {
                let mut next = || rest.pop().flatten();
                PatientRecord {
                    age,
                    gender,
                    race,
                    ethnicity,
                    has_diabetes: next(),
                    has_hypertension: next(),
                    has_copd: next(),
                    has_asthma: next(),
                    has_heart_failure: next(),
                    has_arthritis: next(),
                    has_depression: next(),
                    has_kidney_disease: next(),
                    has_cancer: next(),
                    has_alzheimers: next(),
                    chronic_dx_count: next(),
                    num_meds: next(),
                    has_anticoagulant: next(),
                    has_antibiotic: next(),
                    has_steroid: next(),
                    num_procedures: next(),
                    had_surgery: next(),
                    had_biopsy: next(),
                }
            })
    }

    proptest! {
        #[test]
        fn prop_vector_length_is_schema_length(record in record()) {
            let builder = FeatureVectorBuilder::default();
            let vector = builder.build(&record, &lookups());
            prop_assert_eq!(vector.len(), builder.schema().len());
            prop_assert!(vector.as_slice().iter().all(|v| v.is_finite()));
        }

        #[test]
        fn prop_build_is_idempotent(record in record()) {
            let builder = FeatureVectorBuilder::default();
            let set = lookups();
            prop_assert_eq!(builder.build(&record, &set), builder.build(&record, &set));
        }

        #[test]
        fn prop_flags_are_zero_or_one(flag in any::<Option<bool>>()) {
            let builder = FeatureVectorBuilder::default();
            let record = PatientRecord {
                has_cancer: flag.map(FieldValue::Bool),
                ..PatientRecord::default()
            };
            let value = at(&builder, &builder.build(&record, &lookups()), "has_cancer");
            let expected = match flag {
                Some(true) => 1.0,
                Some(false) | None => builder.defaults().get("has_cancer"),
            };
            prop_assert!((value - expected).abs() < f64::EPSILON);
        }
    }
}
