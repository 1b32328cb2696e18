//! Common test fixtures for coverage-codec tests.
//!
//! [`SAMPLE_CATALOG_YAML`] is a small but complete catalog snapshot: one
//! spatial region, a seasonal ensemble with uncertainty bounds and its
//! single-model members, and fixed-schema forecast/historical configurations
//! leaving zero to three dimensions open.

/// Configuration names in [`SAMPLE_CATALOG_YAML`].
pub mod configurations {
    pub const ENSEMBLE: &str = "tas_seasonal_anomaly_model_ensemble";
    pub const ENSEMBLE_LOWER: &str = "tas_seasonal_anomaly_model_ensemble_lower_uncertainty";
    pub const ENSEMBLE_UPPER: &str = "tas_seasonal_anomaly_model_ensemble_upper_uncertainty";
    pub const MEMBERS: &str = "tas_seasonal_anomaly_model_members";
    /// Open: scenario, year period.
    pub const FORECAST_TAS_ANNUAL: &str = "forecast_tas_anomaly_annual_arpa_vfvg";
    /// Open: scenario, time window, year period.
    pub const FORECAST_TAS_30YR: &str = "forecast_tas_anomaly_30yr_arpa_vfvg";
    /// Open: model.
    pub const FORECAST_PR: &str = "forecast_pr_absolute_annual_arpa_vfvg";
    /// Open: scenario.
    pub const FORECAST_SU30: &str = "forecast_su30_absolute_annual_arpa_vfvg";
    /// Nothing open.
    pub const HISTORICAL_TAS: &str = "historical_tas_absolute_annual_arpa_vfvg";
    /// Open: year period.
    pub const HISTORICAL_PR: &str = "historical_pr_absolute_annual_arpa_vfvg";
}

/// Single-model members of the ensemble, in catalog order.
pub const MEMBER_MODELS: [&str; 5] = [
    "ec_earth_cclm_4_8_17",
    "ec_earth_racmo22e",
    "ec_earth_rca4",
    "hadgem2_racmo22e",
    "mpi_esm_lr_remo2009",
];

/// Well-known identifiers of [`SAMPLE_CATALOG_YAML`].
pub mod identifiers {
    pub const ENSEMBLE_RCP26_SPRING: &str =
        "tas_seasonal_anomaly_model_ensemble-tas-anomaly-annual-forecast-model_ensemble-rcp26-spring";
    pub const ENSEMBLE_LOWER_RCP26_SPRING: &str = "tas_seasonal_anomaly_model_ensemble_lower_uncertainty-tas-anomaly-annual-forecast-model_ensemble-rcp26-lower_bound-spring";
    pub const ENSEMBLE_UPPER_RCP26_SPRING: &str = "tas_seasonal_anomaly_model_ensemble_upper_uncertainty-tas-anomaly-annual-forecast-model_ensemble-rcp26-upper_bound-spring";
    pub const FORECAST_TAS_ANNUAL_RCP85_WINTER: &str =
        "forecast-tas-anomaly-annual-arpa_vfvg-rcp85-winter";
    pub const FORECAST_TAS_30YR_RCP85_TW1_WINTER: &str =
        "forecast-tas-anomaly-30yr-arpa_vfvg-rcp85-tw1-winter";
    pub const FORECAST_TAS_30YR_RCP85_TW2_WINTER: &str =
        "forecast-tas-anomaly-30yr-arpa_vfvg-rcp85-tw2-winter";
    pub const FORECAST_PR_RCA4: &str = "forecast-pr-absolute-annual-arpa_vfvg-ec_earth_rca4";
    pub const FORECAST_SU30_RCP26: &str = "forecast-su30-absolute-annual-arpa_vfvg-rcp26";
    pub const HISTORICAL_TAS: &str = "historical-tas-absolute-annual-arpa_vfvg";
    pub const HISTORICAL_PR_SUMMER: &str = "historical-pr-absolute-annual-arpa_vfvg-summer";
}

/// Complete catalog snapshot used across codec tests.
pub const SAMPLE_CATALOG_YAML: &str = r#"
dimensions:
  - name: archive
    values:
      - { name: forecast }
      - { name: historical }
  - name: model
    values:
      - { name: model_ensemble, internal_value: ensemble }
      - { name: ec_earth_cclm_4_8_17, internal_value: EC-EARTH_CCLM4-8-17 }
      - { name: ec_earth_racmo22e, internal_value: EC-EARTH_RACMO22E }
      - { name: ec_earth_rca4, internal_value: EC-EARTH_RCA4 }
      - { name: hadgem2_racmo22e, internal_value: HadGEM2-ES_RACMO22E }
      - { name: mpi_esm_lr_remo2009, internal_value: MPI-ESM-LR_REMO2009 }
  - name: scenario
    values:
      - { name: rcp26 }
      - { name: rcp45 }
      - { name: rcp85 }
  - name: year_period
    values:
      - { name: winter, internal_value: DJF }
      - { name: spring, internal_value: MAM }
      - { name: summer, internal_value: JJA }
      - { name: autumn, internal_value: SON }
      - { name: all_year, internal_value: year }
  - name: time_window
    values:
      - { name: tw1, internal_value: "2021-2050" }
      - { name: tw2, internal_value: "2071-2100" }
  - name: uncertainty_type
    values:
      - { name: lower_bound, internal_value: stddown }
      - { name: upper_bound, internal_value: stdup }

indicators:
  - { name: tas, measure: anomaly, aggregation_period: annual }
  - { name: tas, measure: anomaly, aggregation_period: 30yr }
  - { name: tas, measure: absolute, aggregation_period: annual }
  - { name: pr, measure: absolute, aggregation_period: annual }
  - { name: su30, measure: absolute, aggregation_period: annual }

regions:
  - { name: arpa_vfvg }

configurations:
  - kind: generic
    name: tas_seasonal_anomaly_model_ensemble
    indicator: { name: tas, measure: anomaly, aggregation_period: annual }
    dimensions:
      - { dimension: archive, values: [forecast] }
      - { dimension: model, values: [model_ensemble] }
      - { dimension: scenario, values: [rcp26, rcp45, rcp85] }
      - { dimension: year_period, values: [winter, spring, summer, autumn] }
    templates:
      storage_path: "ensemble/tas_anomaly/tas_{scenario}_{year_period}_avg.nc"
      variable_name: "{variable}"
      layer_name: "{variable}_{measure}_{scenario}_{year_period}"
      lower_uncertainty:
        storage_path: "ensemble/tas_anomaly/tas_{scenario}_{year_period}_stddown.nc"
        variable_name: "{variable}_stddown"
      upper_uncertainty:
        storage_path: "ensemble/tas_anomaly/tas_{scenario}_{year_period}_stdup.nc"
        variable_name: "{variable}_stdup"
    uncertainty:
      lower: tas_seasonal_anomaly_model_ensemble_lower_uncertainty
      upper: tas_seasonal_anomaly_model_ensemble_upper_uncertainty

  - kind: generic
    name: tas_seasonal_anomaly_model_ensemble_lower_uncertainty
    indicator: { name: tas, measure: anomaly, aggregation_period: annual }
    dimensions:
      - { dimension: archive, values: [forecast] }
      - { dimension: model, values: [model_ensemble] }
      - { dimension: scenario, values: [rcp26, rcp45, rcp85] }
      - { dimension: year_period, values: [winter, spring, summer, autumn] }
      - { dimension: uncertainty_type, values: [lower_bound] }
    templates:
      storage_path: "ensemble/tas_anomaly/tas_{scenario}_{year_period}_{uncertainty_type}.nc"
      variable_name: "{variable}_{uncertainty_type}"

  - kind: generic
    name: tas_seasonal_anomaly_model_ensemble_upper_uncertainty
    indicator: { name: tas, measure: anomaly, aggregation_period: annual }
    dimensions:
      - { dimension: archive, values: [forecast] }
      - { dimension: model, values: [model_ensemble] }
      - { dimension: scenario, values: [rcp26, rcp45, rcp85] }
      - { dimension: year_period, values: [winter, spring, summer, autumn] }
      - { dimension: uncertainty_type, values: [upper_bound] }
    templates:
      storage_path: "ensemble/tas_anomaly/tas_{scenario}_{year_period}_{uncertainty_type}.nc"
      variable_name: "{variable}_{uncertainty_type}"

  - kind: generic
    name: tas_seasonal_anomaly_model_members
    indicator: { name: tas, measure: anomaly, aggregation_period: annual }
    dimensions:
      - { dimension: archive, values: [forecast] }
      - dimension: model
        values: [ec_earth_cclm_4_8_17, ec_earth_racmo22e, ec_earth_rca4, hadgem2_racmo22e, mpi_esm_lr_remo2009]
      - { dimension: scenario, values: [rcp26, rcp45, rcp85] }
      - { dimension: year_period, values: [winter, spring, summer, autumn] }
    templates:
      storage_path: "members/{model}/tas_{scenario}_{year_period}.nc"
      variable_name: "{variable}"

  - kind: fixed_schema
    name: forecast_tas_anomaly_annual_arpa_vfvg
    category: forecast
    indicator: { name: tas, measure: anomaly, aggregation_period: annual }
    region: arpa_vfvg
    models: [model_ensemble]
    scenarios: [rcp26, rcp45, rcp85]
    year_periods: [winter, spring, summer, autumn]
    templates:
      storage_path: "{spatial_region}/{variable}_{measure}_{aggregation_period}/{variable}_{model}_{scenario}_{year_period}.nc"
      variable_name: "{variable}"

  - kind: fixed_schema
    name: forecast_tas_anomaly_30yr_arpa_vfvg
    category: forecast
    indicator: { name: tas, measure: anomaly, aggregation_period: 30yr }
    region: arpa_vfvg
    models: [model_ensemble]
    scenarios: [rcp26, rcp45, rcp85]
    time_windows: [tw1, tw2]
    year_periods: [winter, spring, summer, autumn]
    templates:
      storage_path: "{spatial_region}/{variable}_{measure}_{aggregation_period}/{variable}_{scenario}_{time_window}_{year_period}.nc"
      variable_name: "{variable}"
      layer_name: "{variable}-{time_window}-{year_period}"

  - kind: fixed_schema
    name: forecast_pr_absolute_annual_arpa_vfvg
    category: forecast
    indicator: { name: pr, measure: absolute, aggregation_period: annual }
    region: arpa_vfvg
    models: [model_ensemble, ec_earth_cclm_4_8_17, ec_earth_racmo22e, ec_earth_rca4, hadgem2_racmo22e, mpi_esm_lr_remo2009]
    scenarios: [rcp85]
    year_periods: [all_year]
    templates:
      storage_path: "{spatial_region}/pr/{model}_{scenario}.nc"
      variable_name: "pr"

  - kind: fixed_schema
    name: forecast_su30_absolute_annual_arpa_vfvg
    category: forecast
    indicator: { name: su30, measure: absolute, aggregation_period: annual }
    region: arpa_vfvg
    models: [model_ensemble]
    scenarios: [rcp26, rcp85]
    year_periods: [all_year]
    templates:
      storage_path: "{spatial_region}/su30/su30_{scenario}.nc"
      variable_name: "su30"

  - kind: fixed_schema
    name: historical_tas_absolute_annual_arpa_vfvg
    category: historical
    indicator: { name: tas, measure: absolute, aggregation_period: annual }
    region: arpa_vfvg
    year_periods: [all_year]
    templates:
      storage_path: "{spatial_region}/historical/tas_{year_period}.nc"
      variable_name: "tas"

  - kind: fixed_schema
    name: historical_pr_absolute_annual_arpa_vfvg
    category: historical
    indicator: { name: pr, measure: absolute, aggregation_period: annual }
    region: arpa_vfvg
    year_periods: [winter, spring, summer, autumn]
    templates:
      storage_path: "{spatial_region}/historical/pr_{year_period}.nc"
      variable_name: "pr"
"#;

/// Number of identifiers each configuration of [`SAMPLE_CATALOG_YAML`]
/// generates, in declaration order.
pub const SAMPLE_IDENTIFIER_COUNTS: [(&str, usize); 10] = [
    (configurations::ENSEMBLE, 12),
    (configurations::ENSEMBLE_LOWER, 12),
    (configurations::ENSEMBLE_UPPER, 12),
    (configurations::MEMBERS, 60),
    (configurations::FORECAST_TAS_ANNUAL, 12),
    (configurations::FORECAST_TAS_30YR, 24),
    (configurations::FORECAST_PR, 6),
    (configurations::FORECAST_SU30, 2),
    (configurations::HISTORICAL_TAS, 1),
    (configurations::HISTORICAL_PR, 4),
];
