//! Integration tests for the diversion engine
//!
//! Fixtures are small enough that every expected ratio is computed by hand.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use hosp_div::testdata::{SimulationConfig, simulate_discharge_batch};
use hosp_div::{DiversionCalculator, DiversionConfig, DiversionError};

mod common;
use common::{column_names, discharge_batch, f64_column, i64_column, init_logging, str_column, value_for};

fn assert_ratio(value: Option<f64>, expected: f64) {
    let value = value.expect("expected a ratio, found null");
    assert!(
        (value - expected).abs() < 1e-12,
        "ratio {value} != {expected}"
    );
}

#[test]
fn test_single_rival_receives_everything() {
    let batch = discharge_batch(&[
        ("c1", 1, "Alpha", 1, true, 60.0),
        ("c1", 2, "Beta", 2, false, 40.0),
    ]);
    let calculator = DiversionCalculator::new(DiversionConfig::default());
    let result = calculator.calculate(&batch).unwrap();

    assert_eq!(result.focal_systems, vec![1]);
    assert_eq!(
        column_names(&result.hospital_level),
        ["hosp_id", "hospital", "sys_id", "party_sys_id", "n_h", "div_from_1"]
    );

    assert_ratio(value_for(&result.hospital_level, 2, "div_from_1"), 1.0);
    assert_eq!(value_for(&result.hospital_level, 1, "div_from_1"), None);
    assert_ratio(value_for(&result.system_level, 2, "div_from_sys_1"), 1.0);

    assert_eq!(result.report.scenarios.len(), 1);
    let scenario = &result.report.scenarios[0];
    assert_eq!(scenario.hosp_id, 1);
    assert_eq!(scenario.excluded_admissions, 60.0);
    assert!(scenario.degenerate_cells.is_empty());
    assert!(!scenario.zero_denominator);
}

#[test]
fn test_concentrated_cell_under_both_policies() {
    // Focal share is 0.5, so the larger rival's diversion fraction is 1.2.
    // The drop policy renormalizes over everything that moved and sums to
    // one; the retain policy divides by the excluded hospital's total and
    // lets the raw fractions through.
    let rows = [
        ("c1", 1, "A", 1, true, 50.0),
        ("c1", 2, "B", 2, false, 30.0),
        ("c1", 3, "C", 3, false, 20.0),
    ];

    let drop = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&discharge_batch(&rows))
        .unwrap();
    assert_ratio(value_for(&drop.hospital_level, 2, "div_from_1"), 0.6);
    assert_ratio(value_for(&drop.hospital_level, 3, "div_from_1"), 0.4);

    let retain_config = DiversionConfig::builder().drop_degenerate_cells(false).build();
    let retain = DiversionCalculator::new(retain_config)
        .calculate(&discharge_batch(&rows))
        .unwrap();
    assert_ratio(value_for(&retain.hospital_level, 2, "div_from_1"), 1.2);
    assert_ratio(value_for(&retain.hospital_level, 3, "div_from_1"), 0.8);
}

#[test]
fn test_degenerate_cell_skipped_and_reported() {
    // The focal system holds all of c1, so c1 moves no admissions under
    // either policy. Under the retain policy its volume still dilutes the
    // ratios through the denominator.
    let rows = [
        ("c1", 1, "A", 1, true, 10.0),
        ("c2", 1, "A", 1, true, 30.0),
        ("c2", 2, "B", 2, false, 30.0),
        ("c2", 3, "C", 3, false, 40.0),
    ];

    let drop = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&discharge_batch(&rows))
        .unwrap();
    assert_ratio(value_for(&drop.hospital_level, 2, "div_from_1"), 3.0 / 7.0);
    assert_ratio(value_for(&drop.hospital_level, 3, "div_from_1"), 4.0 / 7.0);
    assert_eq!(drop.report.scenarios[0].degenerate_cells, vec!["c1"]);
    assert!(!drop.report.scenarios[0].zero_denominator);
    assert!(drop.report.to_json().unwrap().contains("\"c1\""));

    let retain_config = DiversionConfig::builder().drop_degenerate_cells(false).build();
    let retain = DiversionCalculator::new(retain_config)
        .calculate(&discharge_batch(&rows))
        .unwrap();
    assert_ratio(value_for(&retain.hospital_level, 2, "div_from_1"), 45.0 / 98.0);
    assert_ratio(value_for(&retain.hospital_level, 3, "div_from_1"), 30.0 / 49.0);
    assert_eq!(retain.report.scenarios[0].degenerate_cells, vec!["c1"]);
}

#[test]
fn test_two_focal_systems_and_non_party_sibling() {
    // Hospital 7 belongs to system 1 without being a party to the merger.
    // It is excluded from system 1 scenarios on both sides, yet receives
    // diversion from system 2 like any other rival.
    let batch = discharge_batch(&[
        ("c1", 5, "Mercy", 1, true, 20.0),
        ("c1", 7, "Mercy North", 1, false, 20.0),
        ("c1", 9, "Union", 2, true, 40.0),
        ("c1", 3, "County", 3, false, 20.0),
    ]);
    let result = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&batch)
        .unwrap();

    assert_eq!(result.focal_systems, vec![1, 2]);
    assert_eq!(
        column_names(&result.hospital_level),
        ["hosp_id", "hospital", "sys_id", "party_sys_id", "n_h", "div_from_5", "div_from_9"]
    );
    assert_eq!(
        column_names(&result.system_level),
        ["hosp_id", "hospital", "sys_id", "party_sys_id", "n_h", "div_from_sys_1", "div_from_sys_2"]
    );

    // Non-party rows first, then party rows by system; ties break on ids
    assert_eq!(i64_column(&result.hospital_level, "hosp_id"), vec![7, 3, 5, 9]);
    assert_eq!(i64_column(&result.hospital_level, "party_sys_id"), vec![0, 0, 1, 2]);

    let hospital = &result.hospital_level;
    assert_eq!(value_for(hospital, 7, "div_from_5"), None);
    assert_ratio(value_for(hospital, 9, "div_from_5"), 2.0 / 3.0);
    assert_ratio(value_for(hospital, 3, "div_from_5"), 1.0 / 3.0);

    assert_eq!(value_for(hospital, 9, "div_from_9"), None);
    assert_ratio(value_for(hospital, 7, "div_from_9"), 1.0 / 3.0);
    assert_ratio(value_for(hospital, 5, "div_from_9"), 1.0 / 3.0);
    assert_ratio(value_for(hospital, 3, "div_from_9"), 1.0 / 3.0);

    let system = &result.system_level;
    assert_eq!(value_for(system, 7, "div_from_sys_1"), None);
    assert_ratio(value_for(system, 9, "div_from_sys_1"), 2.0 / 3.0);
    assert_ratio(value_for(system, 7, "div_from_sys_2"), 1.0 / 3.0);
}

#[test]
fn test_system_column_weights_by_admissions() {
    // System 1 runs two hospitals with 60 and 40 admissions, so the system
    // column blends their scenario columns 60/40.
    let batch = discharge_batch(&[
        ("c1", 1, "A One", 1, true, 60.0),
        ("c1", 11, "B", 2, false, 30.0),
        ("c1", 12, "C", 3, false, 10.0),
        ("c2", 2, "A Two", 1, true, 40.0),
        ("c2", 11, "B", 2, false, 10.0),
        ("c2", 12, "C", 3, false, 30.0),
    ]);
    let result = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&batch)
        .unwrap();

    let hospital = &result.hospital_level;
    assert_ratio(value_for(hospital, 11, "div_from_1"), 0.75);
    assert_ratio(value_for(hospital, 12, "div_from_1"), 0.25);
    assert_ratio(value_for(hospital, 11, "div_from_2"), 0.25);
    assert_ratio(value_for(hospital, 12, "div_from_2"), 0.75);

    let system = &result.system_level;
    assert_ratio(value_for(system, 11, "div_from_sys_1"), 0.55);
    assert_ratio(value_for(system, 12, "div_from_sys_1"), 0.45);
    assert_eq!(value_for(system, 1, "div_from_sys_1"), None);
    assert_eq!(value_for(system, 2, "div_from_sys_1"), None);
}

#[test]
fn test_zero_denominator_policies() {
    // Hospital 1 only appears in a cell it fully captures, so nothing can
    // be redistributed when it closes.
    let rows = [
        ("c1", 1, "A", 1, true, 50.0),
        ("c2", 2, "B", 2, false, 80.0),
    ];

    let drop = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&discharge_batch(&rows))
        .unwrap();
    assert_eq!(value_for(&drop.hospital_level, 2, "div_from_1"), None);
    assert_eq!(value_for(&drop.hospital_level, 1, "div_from_1"), None);
    assert!(drop.report.scenarios[0].zero_denominator);
    assert_eq!(drop.report.scenarios[0].degenerate_cells, vec!["c1"]);

    let retain_config = DiversionConfig::builder().drop_degenerate_cells(false).build();
    let retain = DiversionCalculator::new(retain_config)
        .calculate(&discharge_batch(&rows))
        .unwrap();
    assert_ratio(value_for(&retain.hospital_level, 2, "div_from_1"), 0.0);
    assert!(!retain.report.scenarios[0].zero_denominator);
}

#[test]
fn test_unusable_rows_are_skipped() {
    // A null count and a negative count drop their rows without touching
    // the ratios computed from the remaining volume.
    init_logging();
    let schema = Schema::new(vec![
        Field::new("cell", DataType::Utf8, false),
        Field::new("hosp_id", DataType::Int64, false),
        Field::new("hospital", DataType::Utf8, false),
        Field::new("sys_id", DataType::Int64, false),
        Field::new("party_ind", DataType::Boolean, false),
        Field::new("count", DataType::Float64, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["c1", "c1", "c1", "c1"])),
        Arc::new(Int64Array::from(vec![1, 2, 2, 2])),
        Arc::new(StringArray::from(vec!["A", "B", "B", "B"])),
        Arc::new(Int64Array::from(vec![1, 2, 2, 2])),
        Arc::new(BooleanArray::from(vec![true, false, false, false])),
        Arc::new(Float64Array::from(vec![
            Some(50.0),
            Some(50.0),
            None,
            Some(-5.0),
        ])),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns).unwrap();

    let result = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&batch)
        .unwrap();

    assert_eq!(result.report.skipped_rows, 2);
    assert_eq!(value_for(&result.hospital_level, 2, "n_h"), Some(50.0));
    assert_ratio(value_for(&result.hospital_level, 2, "div_from_1"), 1.0);
}

#[test]
fn test_ambiguous_hospital_name_keeps_first() {
    let batch = discharge_batch(&[
        ("c1", 1, "Alpha", 1, true, 40.0),
        ("c1", 2, "Beta", 2, false, 30.0),
        ("c2", 1, "Alpha", 1, true, 10.0),
        ("c2", 2, "Beta Medical", 2, false, 20.0),
    ]);
    let result = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&batch)
        .unwrap();

    let names = str_column(&result.hospital_level, "hospital");
    let ids = i64_column(&result.hospital_level, "hosp_id");
    let beta = ids.iter().position(|&id| id == 2).unwrap();
    assert_eq!(names[beta], "Beta");
    assert_eq!(value_for(&result.hospital_level, 2, "n_h"), Some(50.0));
}

#[test]
fn test_no_party_rows_yields_baseline_only() {
    init_logging();
    let batch = discharge_batch(&[
        ("c1", 1, "A", 1, false, 60.0),
        ("c1", 2, "B", 2, false, 40.0),
    ]);
    let result = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&batch)
        .unwrap();

    assert!(result.focal_systems.is_empty());
    assert!(result.report.scenarios.is_empty());
    assert_eq!(
        column_names(&result.hospital_level),
        ["hosp_id", "hospital", "sys_id", "party_sys_id", "n_h"]
    );
    assert_eq!(result.hospital_level.num_rows(), 2);
    assert_eq!(result.system_level.num_columns(), 5);
}

#[test]
fn test_missing_column_is_an_error() {
    let batch = discharge_batch(&[("c1", 1, "A", 1, true, 10.0)]);
    let narrowed = batch.project(&[0, 1, 2, 3, 4]).unwrap();

    let err = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&narrowed)
        .unwrap_err();
    assert!(matches!(err, DiversionError::MissingColumn(name) if name == "count"));
}

#[test]
fn test_wrong_column_type_is_an_error() {
    let schema = Schema::new(vec![
        Field::new("cell", DataType::Utf8, false),
        Field::new("hosp_id", DataType::Utf8, false),
        Field::new("hospital", DataType::Utf8, false),
        Field::new("sys_id", DataType::Int64, false),
        Field::new("party_ind", DataType::Boolean, false),
        Field::new("count", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["c1"])),
        Arc::new(StringArray::from(vec!["h1"])),
        Arc::new(StringArray::from(vec!["A"])),
        Arc::new(Int64Array::from(vec![1])),
        Arc::new(BooleanArray::from(vec![true])),
        Arc::new(Float64Array::from(vec![10.0])),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns).unwrap();

    let err = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&batch)
        .unwrap_err();
    assert!(matches!(
        err,
        DiversionError::InvalidDataType { column, .. } if column == "hosp_id"
    ));
}

#[test]
fn test_simulated_batch_ratios_sum_to_one() {
    let batch = simulate_discharge_batch(&SimulationConfig::default()).unwrap();
    let result = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&batch)
        .unwrap();

    assert!(!result.report.scenarios.is_empty());
    let sys_ids = i64_column(&result.hospital_level, "sys_id");

    for scenario in &result.report.scenarios {
        let values = f64_column(
            &result.hospital_level,
            &format!("div_from_{}", scenario.hosp_id),
        );

        let nulls = values.iter().filter(|value| value.is_none()).count();
        let own_system = sys_ids
            .iter()
            .filter(|&&sys| sys == scenario.focal_system)
            .count();
        assert_eq!(nulls, own_system);

        if !scenario.zero_denominator {
            let total: f64 = values.iter().flatten().sum();
            assert!(
                (total - 1.0).abs() < 1e-9,
                "column div_from_{} sums to {total}",
                scenario.hosp_id
            );
        }
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let config = SimulationConfig::default();
    let batch_a = simulate_discharge_batch(&config).unwrap();
    let batch_b = simulate_discharge_batch(&config).unwrap();
    assert_eq!(batch_a, batch_b);

    for drop_policy in [true, false] {
        let calculator = DiversionCalculator::new(
            DiversionConfig::builder()
                .drop_degenerate_cells(drop_policy)
                .build(),
        );
        let first = calculator.calculate(&batch_a).unwrap();
        let second = calculator.calculate(&batch_b).unwrap();

        assert_eq!(first.hospital_level, second.hospital_level);
        assert_eq!(first.system_level, second.system_level);
    }
}

#[test]
fn test_system_column_stays_within_constituents() {
    let batch = simulate_discharge_batch(&SimulationConfig::default()).unwrap();
    let result = DiversionCalculator::new(DiversionConfig::default())
        .calculate(&batch)
        .unwrap();

    // Both outputs share row order, so constituents can be read by index
    for &focal in &result.focal_systems {
        let system = f64_column(&result.system_level, &format!("div_from_sys_{focal}"));
        let members: Vec<Vec<Option<f64>>> = result
            .report
            .scenarios
            .iter()
            .filter(|scenario| scenario.focal_system == focal)
            .map(|scenario| {
                f64_column(
                    &result.hospital_level,
                    &format!("div_from_{}", scenario.hosp_id),
                )
            })
            .collect();
        assert!(!members.is_empty());

        for (row, blended) in system.iter().enumerate() {
            if let Some(blended) = blended {
                let constituents: Vec<f64> = members
                    .iter()
                    .map(|values| values[row].expect("blended row has a null constituent"))
                    .collect();
                let low = constituents.iter().copied().fold(f64::INFINITY, f64::min);
                let high = constituents
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                assert!(
                    *blended >= low - 1e-12 && *blended <= high + 1e-12,
                    "system {focal} row {row}: {blended} outside [{low}, {high}]"
                );
            }
        }
    }
}
