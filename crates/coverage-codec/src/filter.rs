//! Dimension filters over the whole configuration space.
//!
//! A filter maps keys to sets of accepted tokens. Keys are either catalog
//! dimension names or one of the indicator/region keys (`variable`, `measure`,
//! `aggregation_period`, `spatial_region`). `archive` matches the generic
//! `archive` dimension and the fixed-schema category alike.
//!
//! A configuration contributes coverages only if it can satisfy every key: a
//! key naming something the configuration does not have excludes it. The
//! result is the union over configurations, in snapshot order.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::configuration::Configuration;
use crate::coverage::Coverage;
use crate::error::{CoverageError, CoverageResult, EntityKind};
use crate::generator;
use crate::snapshot::CatalogSnapshot;
use crate::template::{AGGREGATION_PERIOD_KEY, MEASURE_KEY, SPATIAL_REGION_KEY, VARIABLE_KEY};

/// Key matching the generic `archive` dimension or the fixed-schema category.
pub const ARCHIVE_KEY: &str = "archive";

/// Accepted tokens per filter key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageFilter {
    constraints: BTreeMap<String, BTreeSet<String>>,
}

impl CoverageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept any of `tokens` for `key`. Repeated calls for one key widen it.
    pub fn with<I, S>(mut self, key: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints
            .entry(key.into())
            .or_default()
            .extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.constraints.keys().map(String::as_str)
    }

    /// Whether `token` passes the constraint on `key`; unconstrained keys pass.
    pub fn allows(&self, key: &str, token: &str) -> bool {
        self.constraints
            .get(key)
            .map_or(true, |accepted| accepted.contains(token))
    }

    fn validate_keys(&self, snapshot: &CatalogSnapshot) -> CoverageResult<()> {
        for key in self.keys() {
            let known = matches!(
                key,
                VARIABLE_KEY | MEASURE_KEY | AGGREGATION_PERIOD_KEY | SPATIAL_REGION_KEY | ARCHIVE_KEY
            ) || snapshot.catalog().get(key).is_some();
            if !known {
                return Err(CoverageError::not_found(EntityKind::Dimension, key));
            }
        }
        Ok(())
    }

    /// Whether the fixed parts of `config` (indicator, region, category) pass,
    /// and every dimension key names a dimension it declares.
    fn admits_configuration(&self, config: &Configuration) -> bool {
        for key in self.keys() {
            let admitted = match key {
                VARIABLE_KEY => config
                    .indicator()
                    .is_some_and(|i| self.allows(key, &i.name)),
                MEASURE_KEY => config
                    .indicator()
                    .is_some_and(|i| self.allows(key, &i.measure)),
                AGGREGATION_PERIOD_KEY => config
                    .indicator()
                    .is_some_and(|i| self.allows(key, &i.aggregation_period)),
                SPATIAL_REGION_KEY => config.region().is_some_and(|r| self.allows(key, r)),
                ARCHIVE_KEY => match config {
                    Configuration::FixedSchema(fixed) => self.allows(key, fixed.category.as_str()),
                    Configuration::Generic(_) => self.dimension_intersects(config, key),
                },
                dimension => self.dimension_intersects(config, dimension),
            };
            if !admitted {
                return false;
            }
        }
        true
    }

    fn dimension_intersects(&self, config: &Configuration, dimension: &str) -> bool {
        config
            .allowed_values(dimension)
            .is_some_and(|values| values.iter().any(|v| self.allows(dimension, v)))
    }
}

/// Every coverage passing `filter`, deduplicated, in snapshot order.
pub fn filter(snapshot: &CatalogSnapshot, filter: &CoverageFilter) -> CoverageResult<Vec<Coverage>> {
    filter.validate_keys(snapshot)?;

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for config in snapshot.configurations() {
        if !filter.admits_configuration(config) {
            continue;
        }
        let coverages =
            generator::enumerate_where(snapshot, config, |dimension, token| filter.allows(dimension, token))?;
        for coverage in coverages {
            if seen.insert(coverage.identifier.clone()) {
                result.push(coverage);
            }
        }
    }

    debug!(
        keys = filter.constraints.len(),
        count = result.len(),
        "Filtered coverages"
    );
    Ok(result)
}

/// Identifiers of [`filter`]'s result.
pub fn filter_identifiers(
    snapshot: &CatalogSnapshot,
    coverage_filter: &CoverageFilter,
) -> CoverageResult<Vec<String>> {
    Ok(filter(snapshot, coverage_filter)?
        .into_iter()
        .map(|c| c.identifier)
        .collect())
}
