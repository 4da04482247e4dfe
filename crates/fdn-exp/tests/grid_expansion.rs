mod common;

use fdn_core::{ConfigParser, PopulateError};
use fdn_exp::{
    derive_scoring_config, from_json_slice, to_canonical_json_bytes, GridPoint,
    HyperparameterSpace, RunPlan,
};
use proptest::prelude::*;

fn pairs(space: &HyperparameterSpace) -> Vec<(f64, usize)> {
    space.points().map(|p| (p.alpha, p.num_mapping)).collect()
}

#[test]
fn points_are_row_major_with_alpha_outermost() {
    let space = HyperparameterSpace::new(vec![0.1, 0.2], vec![3, 7]).expect("space");
    assert_eq!(pairs(&space), vec![(0.1, 3), (0.1, 7), (0.2, 3), (0.2, 7)]);
    assert_eq!(space.total_runs(), 4);
}

#[test]
fn points_restart_and_report_exact_length() {
    let space = HyperparameterSpace::new(vec![0.1, 0.5, 0.9], vec![10]).expect("space");
    let mut points = space.points();
    assert_eq!(points.len(), 3);
    points.next();
    assert_eq!(points.len(), 2);
    let resumed = points.clone().count();
    assert_eq!(resumed, 2);
    assert_eq!(space.points().count(), 3);
    assert_eq!(pairs(&space), pairs(&space));
}

#[test]
fn two_alphas_one_mapping_gives_two_suffixed_runs() {
    let space = HyperparameterSpace::new(vec![0.1, 0.5], vec![10]).expect("space");
    let base = common::base_scoring();
    let derived: Vec<_> = space
        .points()
        .map(|point| derive_scoring_config(&base, &point).expect("derive"))
        .collect();
    assert_eq!(derived.len(), 2);
    assert_eq!(derived[0].getstr("alpha").unwrap(), "0.1");
    assert_eq!(derived[0].getstr("pairs_filepath").unwrap(), "./output/pairs_alpha0.1_N10.pkl");
    assert_eq!(
        derived[0].getstr("populated_filepath").unwrap(),
        "./output/populated_alpha0.1_N10.pkl"
    );
    assert_eq!(derived[1].getstr("alpha").unwrap(), "0.5");
    assert_eq!(derived[1].getstr("num_mapping_per_iteration").unwrap(), "10");
    assert_eq!(derived[1].getstr("pairs_filepath").unwrap(), "./output/pairs_alpha0.5_N10.pkl");
}

#[test]
fn duplicate_values_collide_on_the_same_suffix() {
    let space = HyperparameterSpace::new(vec![1.0, 1.0], vec![5]).expect("space");
    let suffixes: Vec<String> = space.points().map(|p| p.suffix()).collect();
    assert_eq!(suffixes, vec!["_alpha1.0_N5", "_alpha1.0_N5"]);

    let base = common::base_scoring();
    let paths: Vec<String> = space
        .points()
        .map(|point| {
            derive_scoring_config(&base, &point)
                .and_then(|config| config.getstr("populated_filepath"))
                .expect("derive")
        })
        .collect();
    assert_eq!(paths[0], paths[1]);
}

#[test]
fn space_parses_from_config_lists() {
    let config = ConfigParser::parse(
        "grid_search = true\nalpha = \"0.1, 0.5\"\nnum_mapping_per_iteration = [10, 20]\n",
    )
    .expect("config");
    let space = HyperparameterSpace::from_config(&config).expect("space");
    assert_eq!(space.alpha(), &[0.1, 0.5]);
    assert_eq!(space.num_mapping(), &[10, 20]);
}

#[test]
fn non_numeric_values_are_configuration_errors() {
    let config = ConfigParser::parse("alpha = \"0.1, high\"\nnum_mapping_per_iteration = \"10\"\n")
        .expect("config");
    match HyperparameterSpace::from_config(&config) {
        Err(PopulateError::Config(info)) => {
            assert_eq!(info.code, "hyperparameter-parse");
            assert_eq!(info.context["key"], "alpha");
            assert_eq!(info.context["value"], "high");
        }
        other => panic!("unexpected result {other:?}"),
    }

    let config = ConfigParser::parse("alpha = \"0.1\"\nnum_mapping_per_iteration = \"2.5\"\n")
        .expect("config");
    let err = HyperparameterSpace::from_config(&config).unwrap_err();
    assert_eq!(err.info().context["key"], "num_mapping_per_iteration");
}

#[test]
fn negative_mapping_counts_are_rejected_with_a_hint() {
    let config = ConfigParser::parse("alpha = \"0.1\"\nnum_mapping_per_iteration = \"-1\"\n")
        .expect("config");
    let err = HyperparameterSpace::from_config(&config).unwrap_err();
    assert_eq!(err.info().code, "hyperparameter-parse");
    assert_eq!(err.info().context["value"], "-1");
    assert!(err.info().hint.as_deref().unwrap_or_default().contains("non-negative"));
}

#[test]
fn empty_lists_are_rejected() {
    let err = HyperparameterSpace::new(vec![], vec![1]).unwrap_err();
    assert_eq!(err.info().code, "hyperparameter-empty");
    let config = ConfigParser::parse("alpha = \"0.3\"\nnum_mapping_per_iteration = \"\"\n")
        .expect("config");
    let err = HyperparameterSpace::from_config(&config).unwrap_err();
    assert_eq!(err.info().code, "hyperparameter-empty");
}

#[test]
fn grid_plans_round_trip_through_json() {
    let plan = RunPlan::Grid {
        space: HyperparameterSpace::new(vec![0.1, 0.8], vec![10, 50]).expect("space"),
    };
    let bytes = to_canonical_json_bytes(&plan).expect("encode");
    let restored: RunPlan = from_json_slice(&bytes).expect("decode");
    assert_eq!(restored, plan);
    assert_eq!(restored.total_runs(), 4);
}

#[test]
fn deserialized_plans_reject_empty_lists() {
    for raw in [
        r#"{"type":"grid","space":{"alpha":[],"num_mapping":[1]}}"#,
        r#"{"type":"grid","space":{"alpha":[0.5],"num_mapping":[]}}"#,
    ] {
        match from_json_slice::<RunPlan>(raw.as_bytes()) {
            Err(PopulateError::Serde(info)) => {
                assert_eq!(info.code, "json-read");
                assert!(info.message.contains("hyperparameter-empty"), "{}", info.message);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
    let err = serde_json::from_str::<HyperparameterSpace>(r#"{"alpha":[],"num_mapping":[1]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("hyperparameter-empty"));
}

#[test]
fn point_params_render_like_the_output_suffix() {
    let point = GridPoint {
        alpha: 0.25,
        num_mapping: 100,
    };
    let params = point.params();
    assert_eq!(params[0], ("alpha", "0.25".to_string()));
    assert_eq!(params[1], ("N", "100".to_string()));
    assert_eq!(point.suffix(), "_alpha0.25_N100");

    let tiny = GridPoint {
        alpha: 0.00001,
        num_mapping: 10,
    };
    assert_eq!(tiny.suffix(), "_alpha1e-05_N10");
}

fn distinct<T: PartialEq + Clone>(values: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

proptest! {
    #[test]
    fn grid_size_and_order_follow_the_lists(
        alpha in prop::collection::vec(0.0f64..10.0, 1..6),
        num_mapping in prop::collection::vec(0usize..500, 1..6),
    ) {
        let space = HyperparameterSpace::new(alpha.clone(), num_mapping.clone()).unwrap();
        let points: Vec<GridPoint> = space.points().collect();
        prop_assert_eq!(points.len(), alpha.len() * num_mapping.len());
        prop_assert_eq!(space.total_runs(), points.len());
        for (i, point) in points.iter().enumerate() {
            prop_assert_eq!(point.alpha, alpha[i / num_mapping.len()]);
            prop_assert_eq!(point.num_mapping, num_mapping[i % num_mapping.len()]);
        }
    }

    #[test]
    fn distinct_points_never_share_output_paths(
        alpha in prop::collection::vec(0.0f64..10.0, 1..5),
        num_mapping in prop::collection::vec(0usize..500, 1..5),
    ) {
        let space = HyperparameterSpace::new(distinct(alpha), distinct(num_mapping)).unwrap();
        let base = common::base_scoring();
        let base_pairs = base.getstr("pairs_filepath").unwrap();
        let base_populated = base.getstr("populated_filepath").unwrap();
        let mut seen = Vec::new();
        for point in space.points() {
            let derived = derive_scoring_config(&base, &point).unwrap();
            let pairs = derived.getstr("pairs_filepath").unwrap();
            let populated = derived.getstr("populated_filepath").unwrap();
            prop_assert_ne!(&pairs, &base_pairs);
            prop_assert_ne!(&populated, &base_populated);
            prop_assert!(!seen.contains(&pairs));
            prop_assert!(!seen.contains(&populated));
            seen.push(pairs);
            seen.push(populated);
        }
    }
}
