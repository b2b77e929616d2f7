use hashlab_rs::pipeline::presets::PRESETS;
use hashlab_rs::pipeline::{avalanche_report, catalog, evaluate, Pipeline, PipelineError, Step};
use hashlab_rs::strength::{estimate, StrengthLabel};

#[test]
fn every_catalog_step_runs_alone() {
    for info in catalog() {
        let pipeline = Pipeline::from_steps([info.id]);
        let result = evaluate("password", "salt", &pipeline).expect(info.id);
        assert_eq!(result.trace.len(), 1);
        assert_eq!(result.trace[0].step_id, info.id);
        assert_eq!(result.step_values, vec![result.trace[0].value]);
        let expected_len = if info.id == "hex_encode" { 8 } else { 16 };
        assert_eq!(result.final_hash.len(), expected_len, "{}", info.id);
    }
}

#[test]
fn hex_digest_width_is_eight_per_encode() {
    let mut pipeline = Pipeline::new();
    for n in 1..=4 {
        pipeline.push(Step::Avalanche.id());
        pipeline.push(Step::HexEncode.id());
        let result = evaluate("pw", "", &pipeline).unwrap();
        assert_eq!(result.final_hash.len(), 8 * n);
        assert!(result.final_hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

#[test]
fn boundary_errors_surface_to_callers() {
    assert_eq!(
        evaluate("pw", "s", &Pipeline::new()).unwrap_err(),
        PipelineError::EmptyPipeline
    );
    assert!(matches!(
        avalanche_report("pw", "s", &Pipeline::parse_list("avalanche,bogus")).unwrap_err(),
        PipelineError::UnknownStep { position: 1, .. }
    ));
}

#[test]
fn presets_report_avalanche_rows() {
    for preset in PRESETS {
        let rows = avalanche_report("hunter2", "pepper", &preset.pipeline()).unwrap();
        assert_eq!(rows.len(), 4, "{}", preset.name);
        assert_eq!(rows[0].diff_percent, 0);
        assert!(rows.iter().all(|row| row.hash.len() == rows[0].hash.len()));
    }
}

#[test]
fn same_password_different_salt_changes_salted_digest() {
    let pipeline = Pipeline::parse_list("poly_rolling,salt_inject,avalanche,hex_encode");
    let a = evaluate("hunter2", "pepper", &pipeline).unwrap();
    let b = evaluate("hunter2", "paprika", &pipeline).unwrap();
    assert_ne!(a.final_hash, b.final_hash);
}

#[test]
fn strength_panel_orders_passwords() {
    let weak = estimate("123456");
    let strong = estimate("v9#Lq2!xR7@mZ4");
    assert_eq!(weak.label, StrengthLabel::VeryWeak);
    assert!(strong.score >= 3);
    assert!(strong.entropy_bits > weak.entropy_bits);
}
