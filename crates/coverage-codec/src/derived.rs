//! Coverages derived from another coverage: uncertainty bounds and the same
//! scenario/year period under other models.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::configuration::{Configuration, LOWER_BOUND, UNCERTAINTY_DIMENSION, UPPER_BOUND};
use crate::coverage::{Coverage, ResolvedValues};
use crate::error::{CoverageError, CoverageResult};
use crate::generator;
use crate::snapshot::CatalogSnapshot;

const MODEL_DIMENSION: &str = "model";
const SCENARIO_DIMENSION: &str = "scenario";
const YEAR_PERIOD_DIMENSION: &str = "year_period";

/// Lower and upper uncertainty bound siblings of `coverage`.
///
/// Each side is `None` when the coverage's configuration declares no sibling
/// for it. A declared sibling that cannot represent the coverage's values is a
/// configuration error.
pub fn uncertainty_bounds(
    snapshot: &CatalogSnapshot,
    coverage: &Coverage,
) -> CoverageResult<(Option<Coverage>, Option<Coverage>)> {
    let config = snapshot.configuration(&coverage.configuration)?;
    let siblings = config.uncertainty();

    let lower = match &siblings.lower {
        Some(name) => Some(bound_sibling(snapshot, coverage, name, LOWER_BOUND)?),
        None => None,
    };
    let upper = match &siblings.upper {
        Some(name) => Some(bound_sibling(snapshot, coverage, name, UPPER_BOUND)?),
        None => None,
    };
    Ok((lower, upper))
}

fn bound_sibling(
    snapshot: &CatalogSnapshot,
    coverage: &Coverage,
    sibling_name: &str,
    bound: &str,
) -> CoverageResult<Coverage> {
    let sibling = snapshot.configuration(sibling_name).map_err(|_| {
        CoverageError::inconsistent(format!(
            "Uncertainty sibling '{}' of '{}' is not in the snapshot",
            sibling_name, coverage.configuration
        ))
    })?;

    let bound_value = snapshot
        .catalog()
        .lookup_value(UNCERTAINTY_DIMENSION, bound)
        .map_err(|_| {
            CoverageError::inconsistent(format!(
                "Catalog has no {} value '{}'",
                UNCERTAINTY_DIMENSION, bound
            ))
        })?;

    let mut values: ResolvedValues = coverage.values.clone();
    values.insert(UNCERTAINTY_DIMENSION.to_string(), bound_value.clone());

    for (dimension, value) in &values {
        if dimension == UNCERTAINTY_DIMENSION && !sibling.is_generic() {
            // Fixed-schema identifiers have no slot for the bound.
            continue;
        }
        let admitted = sibling
            .allowed_values(dimension)
            .is_some_and(|allowed| allowed.iter().any(|t| *t == value.name));
        if !admitted {
            return Err(CoverageError::configuration(format!(
                "Uncertainty sibling '{}' does not admit {}={} of '{}'",
                sibling_name, dimension, value.name, coverage.identifier
            )));
        }
    }

    let derived = Coverage::new(sibling, values)?;
    debug!(
        coverage = %coverage.identifier,
        bound,
        sibling = %derived.identifier,
        "Derived uncertainty bound"
    );
    Ok(derived)
}

fn shares_family(base: &Configuration, other: &Configuration) -> bool {
    if !base.same_kind(other) {
        return false;
    }
    match (base, other) {
        (Configuration::FixedSchema(a), Configuration::FixedSchema(b)) => {
            a.category == b.category && a.region == b.region
        }
        _ => true,
    }
}

/// The same scenario and year period of `coverage` under every other model.
///
/// Looks at configurations sharing the coverage's climatic indicator and keeps
/// one coverage per model, the first one found in snapshot order.
pub fn other_models(snapshot: &CatalogSnapshot, coverage: &Coverage) -> CoverageResult<Vec<Coverage>> {
    let config = snapshot.configuration(&coverage.configuration)?;
    let Some(indicator) = config.indicator() else {
        return Ok(Vec::new());
    };
    let Some(current_model) = coverage.token(MODEL_DIMENSION) else {
        warn!(coverage = %coverage.identifier, "Coverage has no model, no other models to offer");
        return Ok(Vec::new());
    };
    let scenario = coverage.token(SCENARIO_DIMENSION);
    let year_period = coverage.token(YEAR_PERIOD_DIMENSION);

    let mut seen_models = HashSet::new();
    let mut result = Vec::new();
    for other in snapshot.configurations_for_indicator(indicator) {
        if !shares_family(config, other) {
            continue;
        }
        let offers_other_model = other
            .allowed_values(MODEL_DIMENSION)
            .is_some_and(|models| models.iter().any(|m| m != current_model));
        if !offers_other_model {
            continue;
        }

        let candidates = generator::enumerate_where(snapshot, other, |dimension, token| {
            dimension != MODEL_DIMENSION || token != current_model
        })?;
        for candidate in candidates {
            if candidate.token(SCENARIO_DIMENSION) != scenario
                || candidate.token(YEAR_PERIOD_DIMENSION) != year_period
            {
                continue;
            }
            let Some(model) = candidate.token(MODEL_DIMENSION) else {
                continue;
            };
            if seen_models.insert(model.to_string()) {
                result.push(candidate);
            }
        }
    }

    debug!(
        coverage = %coverage.identifier,
        count = result.len(),
        "Collected coverages for other models"
    );
    Ok(result)
}
