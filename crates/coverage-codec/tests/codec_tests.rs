//! End-to-end tests for the coverage codec over the sample catalog.

use std::collections::HashSet;
use std::sync::Arc;

use coverage_codec::{
    CatalogSnapshot, CoverageCodec, CoverageError, CoverageFilter, DecodeReason, EntityKind,
    TemplateKind,
};
use test_utils::{
    assert_set_eq, configurations, identifiers, init_test_tracing, MEMBER_MODELS,
    SAMPLE_CATALOG_YAML, SAMPLE_IDENTIFIER_COUNTS,
};

fn sample_codec() -> CoverageCodec {
    init_test_tracing();
    let snapshot = CatalogSnapshot::from_yaml_str(SAMPLE_CATALOG_YAML).unwrap();
    CoverageCodec::new(Arc::new(snapshot))
}

fn reason(err: CoverageError) -> DecodeReason {
    match err.decode_reason() {
        Some(reason) => reason.clone(),
        None => panic!("expected decode error, got {:?}", err),
    }
}

// ============================================================================
// Generation and round trip
// ============================================================================

#[test]
fn test_generation_counts() {
    let codec = sample_codec();
    for (name, expected) in SAMPLE_IDENTIFIER_COUNTS {
        let ids = codec.generate(name).unwrap();
        assert_eq!(ids.len(), expected, "identifier count of {}", name);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len(), "duplicates in {}", name);
    }
}

#[test]
fn test_every_identifier_round_trips() {
    let codec = sample_codec();
    for config in codec.snapshot().configurations() {
        for coverage in codec.coverages(config.name()).unwrap() {
            let decoded = codec.decode(&coverage.identifier).unwrap();
            assert_eq!(decoded.identifier, coverage.identifier);
            assert_eq!(decoded.configuration, config.name());
            assert_eq!(decoded.values, coverage.values);
        }
    }
}

#[test]
fn test_generation_is_deterministic() {
    let codec = sample_codec();
    let other = sample_codec();
    for config in codec.snapshot().configurations() {
        assert_eq!(
            codec.generate(config.name()).unwrap(),
            other.generate(config.name()).unwrap()
        );
    }
}

#[test]
fn test_generation_order_is_declaration_product_order() {
    let codec = sample_codec();
    let ids = codec.generate(configurations::FORECAST_TAS_ANNUAL).unwrap();
    assert_eq!(ids[0], "forecast-tas-anomaly-annual-arpa_vfvg-rcp26-winter");
    assert_eq!(ids[1], "forecast-tas-anomaly-annual-arpa_vfvg-rcp26-spring");
    assert_eq!(ids[4], "forecast-tas-anomaly-annual-arpa_vfvg-rcp45-winter");
    assert_eq!(ids[11], "forecast-tas-anomaly-annual-arpa_vfvg-rcp85-autumn");
}

#[test]
fn test_single_valued_dimensions_are_implicit() {
    let codec = sample_codec();
    let ids = codec.generate(configurations::FORECAST_TAS_30YR).unwrap();
    assert!(ids.contains(&identifiers::FORECAST_TAS_30YR_RCP85_TW1_WINTER.to_string()));
    assert!(ids.iter().all(|id| !id.contains("model_ensemble")));
    assert!(ids.iter().all(|id| id.split('-').count() == 8));

    assert_eq!(
        codec.generate(configurations::HISTORICAL_TAS).unwrap(),
        vec![identifiers::HISTORICAL_TAS.to_string()]
    );
}

#[test]
fn test_generic_identifier_carries_indicator_tokens() {
    let codec = sample_codec();
    let coverage = codec.decode(identifiers::ENSEMBLE_RCP26_SPRING).unwrap();
    assert_eq!(coverage.configuration, configurations::ENSEMBLE);
    assert_eq!(coverage.token("archive"), Some("forecast"));
    assert_eq!(coverage.token("model"), Some("model_ensemble"));
    assert_eq!(coverage.token("scenario"), Some("rcp26"));
    assert_eq!(coverage.token("year_period"), Some("spring"));
}

#[test]
fn test_generate_unknown_configuration() {
    let codec = sample_codec();
    assert!(matches!(
        codec.generate("tas_daily"),
        Err(CoverageError::NotFound {
            kind: EntityKind::Configuration,
            ..
        })
    ));
}

// ============================================================================
// Derived coverages
// ============================================================================

#[test]
fn test_uncertainty_bounds() {
    let codec = sample_codec();
    let coverage = codec.decode(identifiers::ENSEMBLE_RCP26_SPRING).unwrap();

    let (lower, upper) = codec.uncertainty_bounds(&coverage).unwrap();
    let lower = lower.unwrap();
    let upper = upper.unwrap();
    assert_eq!(lower.identifier, identifiers::ENSEMBLE_LOWER_RCP26_SPRING);
    assert_eq!(upper.identifier, identifiers::ENSEMBLE_UPPER_RCP26_SPRING);
    assert_eq!(lower.configuration, configurations::ENSEMBLE_LOWER);
    assert_eq!(lower.token("uncertainty_type"), Some("lower_bound"));

    // The derived identifiers decode back to the same coverages.
    assert_eq!(codec.decode(&lower.identifier).unwrap(), lower);
    assert_eq!(codec.decode(&upper.identifier).unwrap(), upper);
}

#[test]
fn test_uncertainty_bounds_absent() {
    let codec = sample_codec();
    let coverage = codec
        .decode(identifiers::FORECAST_TAS_ANNUAL_RCP85_WINTER)
        .unwrap();
    let (lower, upper) = codec.uncertainty_bounds(&coverage).unwrap();
    assert!(lower.is_none());
    assert!(upper.is_none());
}

#[test]
fn test_other_models() {
    let codec = sample_codec();
    let coverage = codec.decode(identifiers::ENSEMBLE_RCP26_SPRING).unwrap();

    let others = codec.other_models(&coverage).unwrap();
    assert_eq!(others.len(), MEMBER_MODELS.len());
    assert_set_eq!(
        others.iter().map(|c| c.token("model").unwrap().to_string()),
        MEMBER_MODELS.iter().map(|m| m.to_string())
    );
    for other in &others {
        assert_eq!(other.configuration, configurations::MEMBERS);
        assert_eq!(other.token("scenario"), Some("rcp26"));
        assert_eq!(other.token("year_period"), Some("spring"));
    }
}

#[test]
fn test_other_models_from_member_includes_ensemble_peers() {
    let codec = sample_codec();
    let id = "tas_seasonal_anomaly_model_members-tas-anomaly-annual-forecast-ec_earth_rca4-rcp85-winter";
    let coverage = codec.decode(id).unwrap();

    let others = codec.other_models(&coverage).unwrap();
    let models: Vec<_> = others.iter().filter_map(|c| c.token("model")).collect();
    assert!(models.contains(&"model_ensemble"));
    assert!(!models.contains(&"ec_earth_rca4"));
    assert_eq!(models.len(), MEMBER_MODELS.len());
}

#[test]
fn test_other_models_without_model() {
    let codec = sample_codec();
    let coverage = codec.decode(identifiers::HISTORICAL_TAS).unwrap();
    assert!(codec.other_models(&coverage).unwrap().is_empty());
}

const FIXED_BOUNDS_YAML: &str = r#"
dimensions:
  - name: model
    values: [{ name: ec_earth_rca4 }, { name: hadgem2_racmo22e }]
  - name: scenario
    values: [{ name: rcp26 }, { name: rcp85 }]
  - name: year_period
    values: [{ name: winter }, { name: summer }]
  - name: uncertainty_type
    values: [{ name: lower_bound }, { name: upper_bound }]
indicators:
  - { name: tas, measure: anomaly, aggregation_period: annual }
  - { name: tas, measure: anomaly_lower, aggregation_period: annual }
  - { name: tas, measure: anomaly_upper, aggregation_period: annual }
regions:
  - { name: arpa_vfvg }
configurations:
  - kind: fixed_schema
    name: tas_anomaly
    category: forecast
    indicator: { name: tas, measure: anomaly, aggregation_period: annual }
    region: arpa_vfvg
    models: [ec_earth_rca4]
    scenarios: [rcp26, rcp85]
    year_periods: [winter, summer]
    uncertainty: { lower: tas_anomaly_lower, upper: tas_anomaly_upper }
  - kind: fixed_schema
    name: tas_anomaly_lower
    category: forecast
    indicator: { name: tas, measure: anomaly_lower, aggregation_period: annual }
    region: arpa_vfvg
    models: [ec_earth_rca4]
    scenarios: [rcp26, rcp85]
    year_periods: [winter, summer]
  - kind: fixed_schema
    name: tas_anomaly_upper
    category: forecast
    indicator: { name: tas, measure: anomaly_upper, aggregation_period: annual }
    region: arpa_vfvg
    models: [ec_earth_rca4]
    scenarios: [rcp26, rcp85]
    year_periods: [winter, summer]
"#;

#[test]
fn test_fixed_schema_uncertainty_bounds() {
    init_test_tracing();
    let snapshot = CatalogSnapshot::from_yaml_str(FIXED_BOUNDS_YAML).unwrap();
    let codec = CoverageCodec::new(Arc::new(snapshot));
    let coverage = codec
        .decode("forecast-tas-anomaly-annual-arpa_vfvg-rcp85-summer")
        .unwrap();

    let (lower, upper) = codec.uncertainty_bounds(&coverage).unwrap();
    let lower = lower.unwrap();
    let upper = upper.unwrap();
    assert_eq!(
        lower.identifier,
        "forecast-tas-anomaly_lower-annual-arpa_vfvg-rcp85-summer"
    );
    assert_eq!(
        upper.identifier,
        "forecast-tas-anomaly_upper-annual-arpa_vfvg-rcp85-summer"
    );

    for bound in [&lower, &upper] {
        let decoded = codec.decode(&bound.identifier).unwrap();
        assert_eq!(&decoded, bound);
        assert_eq!(decoded.configuration, bound.configuration);
        assert_eq!(decoded.token("model"), Some("ec_earth_rca4"));
    }
    assert_eq!(lower.configuration, "tas_anomaly_lower");
    assert_eq!(upper.configuration, "tas_anomaly_upper");
}

#[test]
fn test_configurations_spelling_same_identifiers_rejected() {
    // Only the single-valued model tells these apart, and it is never encoded.
    let yaml = FIXED_BOUNDS_YAML.replace(
        "measure: anomaly_upper, aggregation_period: annual }\n    region: arpa_vfvg\n    models: [ec_earth_rca4]",
        "measure: anomaly_lower, aggregation_period: annual }\n    region: arpa_vfvg\n    models: [hadgem2_racmo22e]",
    );
    assert_ne!(yaml, FIXED_BOUNDS_YAML);

    let err = CatalogSnapshot::from_yaml_str(&yaml).unwrap_err();
    assert!(matches!(err, CoverageError::Configuration(_)));
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("tas_anomaly_lower"));
    assert!(err.to_string().contains("tas_anomaly_upper"));
}

// ============================================================================
// Decoding failures
// ============================================================================

#[test]
fn test_fixed_schema_one_token_short() {
    let codec = sample_codec();
    let err = codec.decode("forecast-tas-anomaly-annual").unwrap_err();
    assert_eq!(
        reason(err),
        DecodeReason::TooShort {
            expected: 5,
            found: 4
        }
    );
}

#[test]
fn test_unknown_token() {
    let codec = sample_codec();
    let err = codec
        .decode("forecast-tas-anomaly-annual-arpa_vfvg-rcp99-winter")
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(
        reason(err),
        DecodeReason::UnknownToken {
            token: "rcp99".to_string()
        }
    );

    let err = codec
        .decode("tas_seasonal_anomaly_model_ensemble-tas-anomaly-annual-forecast-model_ensemble-rcp99-spring")
        .unwrap_err();
    assert_eq!(
        reason(err),
        DecodeReason::UnknownToken {
            token: "rcp99".to_string()
        }
    );
}

#[test]
fn test_empty_identifier() {
    let codec = sample_codec();
    assert!(matches!(
        reason(codec.decode("").unwrap_err()),
        DecodeReason::TooShort { .. }
    ));
}

#[test]
fn test_unknown_configuration_name() {
    let codec = sample_codec();
    let err = codec.decode("tas_daily-rcp26").unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_fixed_schema_name_is_not_an_identifier_prefix() {
    let codec = sample_codec();
    let id = format!("{}-model_ensemble", configurations::FORECAST_PR);
    let err = codec.decode(&id).unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(
        reason(err),
        DecodeReason::UnknownToken {
            token: configurations::FORECAST_PR.to_string()
        }
    );
}

// ============================================================================
// Filtering and listing
// ============================================================================

fn intersection_filter() -> CoverageFilter {
    CoverageFilter::new()
        .with("variable", ["tas"])
        .with("aggregation_period", ["annual", "30yr"])
        .with("model", ["model_ensemble"])
        .with("scenario", ["rcp85"])
        .with("measure", ["anomaly"])
        .with("year_period", ["winter"])
}

#[test]
fn test_filter_intersection() {
    let codec = sample_codec();
    let filter = intersection_filter().with("time_window", ["tw1"]);
    let ids: Vec<_> = codec
        .filter(&filter)
        .unwrap()
        .into_iter()
        .map(|c| c.identifier)
        .collect();
    assert_eq!(
        ids,
        vec![identifiers::FORECAST_TAS_30YR_RCP85_TW1_WINTER.to_string()]
    );
}

#[test]
fn test_filter_union_across_aggregation_periods() {
    let codec = sample_codec();
    let ids: Vec<_> = codec
        .filter(&intersection_filter())
        .unwrap()
        .into_iter()
        .map(|c| c.identifier)
        .collect();

    assert_set_eq!(
        ids.clone(),
        vec![
            "tas_seasonal_anomaly_model_ensemble-tas-anomaly-annual-forecast-model_ensemble-rcp85-winter".to_string(),
            "tas_seasonal_anomaly_model_ensemble_lower_uncertainty-tas-anomaly-annual-forecast-model_ensemble-rcp85-lower_bound-winter".to_string(),
            "tas_seasonal_anomaly_model_ensemble_upper_uncertainty-tas-anomaly-annual-forecast-model_ensemble-rcp85-upper_bound-winter".to_string(),
            identifiers::FORECAST_TAS_ANNUAL_RCP85_WINTER.to_string(),
            identifiers::FORECAST_TAS_30YR_RCP85_TW1_WINTER.to_string(),
            identifiers::FORECAST_TAS_30YR_RCP85_TW2_WINTER.to_string(),
        ]
    );
}

#[test]
fn test_filter_by_archive() {
    let codec = sample_codec();
    let filter = CoverageFilter::new().with("archive", ["historical"]);
    let ids: Vec<_> = codec
        .filter(&filter)
        .unwrap()
        .into_iter()
        .map(|c| c.identifier)
        .collect();
    assert_eq!(ids.len(), 5);
    assert!(ids.iter().all(|id| id.starts_with("historical-")));
}

#[test]
fn test_filter_unknown_key() {
    let codec = sample_codec();
    let filter = CoverageFilter::new().with("ensemble_member", ["r1i1p1"]);
    assert!(matches!(
        codec.filter(&filter),
        Err(CoverageError::NotFound {
            kind: EntityKind::Dimension,
            ..
        })
    ));
}

#[test]
fn test_empty_filter_lists_everything() {
    let codec = sample_codec();
    let total: usize = SAMPLE_IDENTIFIER_COUNTS.iter().map(|(_, n)| n).sum();
    let all = codec.filter(&CoverageFilter::new()).unwrap();
    assert_eq!(all.len(), total);
}

#[test]
fn test_list_pages_are_stable() {
    let codec = sample_codec();
    let filter = CoverageFilter::new().with("scenario", ["rcp26"]);
    let everything = codec.list(&filter, 0, usize::MAX).unwrap();

    let first = codec.list(&filter, 0, 10).unwrap();
    let second = codec.list(&filter, 10, 10).unwrap();
    assert_eq!(first.total, everything.total);
    assert_eq!(first.identifiers.len(), 10);
    assert_eq!(first.identifiers[..], everything.identifiers[..10]);
    assert_eq!(second.identifiers[..], everything.identifiers[10..20]);
    assert_eq!(second.offset, 10);

    let past_end = codec.list(&filter, everything.total, 10).unwrap();
    assert!(past_end.identifiers.is_empty());
}

// ============================================================================
// Template rendering
// ============================================================================

#[test]
fn test_render_fixed_schema_templates() {
    let codec = sample_codec();
    let coverage = codec
        .decode(identifiers::FORECAST_TAS_30YR_RCP85_TW1_WINTER)
        .unwrap();
    assert_eq!(
        codec.storage_path(&coverage).unwrap(),
        "arpa_vfvg/tas_anomaly_30yr/tas_rcp85_2021-2050_DJF.nc"
    );
    assert_eq!(codec.variable_name(&coverage).unwrap(), "tas");
    assert_eq!(codec.layer_name(&coverage).unwrap(), "tas-2021-2050-DJF");
}

#[test]
fn test_render_uses_internal_values_of_implicit_dimensions() {
    let codec = sample_codec();
    let coverage = codec
        .decode(identifiers::FORECAST_TAS_ANNUAL_RCP85_WINTER)
        .unwrap();
    assert_eq!(
        codec.storage_path(&coverage).unwrap(),
        "arpa_vfvg/tas_anomaly_annual/tas_ensemble_rcp85_DJF.nc"
    );
}

#[test]
fn test_render_uncertainty_templates() {
    let codec = sample_codec();
    let coverage = codec.decode(identifiers::ENSEMBLE_RCP26_SPRING).unwrap();
    assert_eq!(
        codec
            .render(&coverage, TemplateKind::LowerUncertaintyStoragePath)
            .unwrap()
            .as_deref(),
        Some("ensemble/tas_anomaly/tas_rcp26_MAM_stddown.nc")
    );
    assert_eq!(
        codec
            .render(&coverage, TemplateKind::UpperUncertaintyVariableName)
            .unwrap()
            .as_deref(),
        Some("tas_stdup")
    );

    let (lower, _) = codec.uncertainty_bounds(&coverage).unwrap();
    assert_eq!(
        codec.storage_path(&lower.unwrap()).unwrap(),
        "ensemble/tas_anomaly/tas_rcp26_MAM_stddown.nc"
    );
}

#[test]
fn test_missing_layer_template() {
    let codec = sample_codec();
    let coverage = codec.decode(identifiers::HISTORICAL_TAS).unwrap();
    assert!(matches!(
        codec.layer_name(&coverage),
        Err(CoverageError::Configuration(_))
    ));
}

#[test]
fn test_templates_pass_strict_check() {
    let codec = sample_codec();
    codec.snapshot().check_templates().unwrap();
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_decode_error_serializes_reason() {
    let codec = sample_codec();
    let err = match codec.decode("forecast-tas-anomaly-annual-arpa_vfvg-rcp99-winter") {
        Err(CoverageError::Decode(err)) => err,
        other => panic!("expected decode error, got {:?}", other),
    };
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["reason"]["kind"], "unknown_token");
    assert_eq!(json["reason"]["token"], "rcp99");
    assert_eq!(json["attempted_lengths"], serde_json::json!([3, 2, 1, 0]));
}

#[test]
fn test_coverage_serializes_values() {
    let codec = sample_codec();
    let coverage = codec
        .decode(identifiers::FORECAST_TAS_30YR_RCP85_TW1_WINTER)
        .unwrap();
    let json = serde_json::to_value(&coverage).unwrap();
    assert_eq!(json["identifier"], identifiers::FORECAST_TAS_30YR_RCP85_TW1_WINTER);
    assert_eq!(json["configuration"], configurations::FORECAST_TAS_30YR);
    assert_eq!(json["values"]["time_window"]["internal_value"], "2021-2050");
    assert_eq!(json["values"]["model"]["name"], "model_ensemble");
}
