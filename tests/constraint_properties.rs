use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::{json, Value};

use synthgen_gateway::core::assembler::normalize_response;
use synthgen_gateway::core::constraint_builder::{remove_at, validate_and_build};
use synthgen_gateway::error::AppError;
use synthgen_gateway::models::constraint::{Constraint, ConstraintDraft};
use synthgen_gateway::models::request::GenerationMode;
use synthgen_gateway::models::result::GeneratedResult;

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn percentage_within_bounds_is_accepted(hundredths in 1_u32..=10_000_u32) {
        let pct = f64::from(hundredths) / 100.0;
        let draft = ConstraintDraft::new("status", "percentage_distribution")
            .with_value("active")
            .with_percentage(&pct.to_string());
        let built = validate_and_build(&draft).expect("valid percentage");
        let is_percentage = matches!(built, Constraint::PercentageDistribution { percentage, .. } if percentage == pct);
        prop_assert!(is_percentage);
    }

    #[test]
    fn percentage_above_hundred_is_rejected(extra in 1_u32..100_000_u32) {
        let pct = 100.0 + f64::from(extra) / 10.0;
        let draft = ConstraintDraft::new("status", "percentage_distribution")
            .with_value("active")
            .with_percentage(&pct.to_string());
        let is_range = matches!(validate_and_build(&draft), Err(AppError::InvalidRange(_)));
        prop_assert!(is_range);
    }

    #[test]
    fn inverted_range_is_rejected(min in -1_000_000_i64..1_000_000_i64, gap in 1_i64..1_000_i64) {
        let max = min - gap;
        let draft = ConstraintDraft::new("age", "range")
            .with_bounds(Some(&min.to_string()), Some(&max.to_string()));
        let is_range = matches!(validate_and_build(&draft), Err(AppError::InvalidRange(_)));
        prop_assert!(is_range);
    }

    #[test]
    fn single_bound_range_is_accepted(min in -1_000_i64..1_000_i64) {
        let draft = ConstraintDraft::new("age", "range").with_bounds(Some(&min.to_string()), None);
        let built = validate_and_build(&draft).expect("one bound is enough");
        let expected = Constraint::Range { field: "age".into(), min_value: Some(min as f64), max_value: None };
        prop_assert_eq!(built, expected);
    }

    #[test]
    fn removal_out_of_range_is_noop(items in prop::collection::vec("[a-z]{1,8}", 0..10), past in 0_usize..5) {
        let index = items.len() + past;
        prop_assert_eq!(remove_at(&items, index), items.clone());
    }

    #[test]
    fn removal_in_range_drops_exactly_one(items in prop::collection::vec("[a-z]{1,8}", 1..10), pick in any::<prop::sample::Index>()) {
        let index = pick.index(items.len());
        let next = remove_at(&items, index);
        prop_assert_eq!(next.len(), items.len() - 1);
        let mut expected = items.clone();
        expected.remove(index);
        prop_assert_eq!(next, expected);
    }

    #[test]
    fn normalized_result_has_one_shape(ids in prop::collection::vec(0_i64..1_000, 0..20)) {
        let rows: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
        let raw = Value::Array(rows);

        let flat = normalize_response(raw.clone(), GenerationMode::Single).expect("array is a flat result");
        let is_flat = matches!(&flat, GeneratedResult::Flat { rows } if rows.len() == ids.len());
        prop_assert!(is_flat);

        let is_malformed = matches!(
            normalize_response(raw, GenerationMode::Relational),
            Err(AppError::MalformedResponse(_))
        );
        prop_assert!(is_malformed);
    }
}
