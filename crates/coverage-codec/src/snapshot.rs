//! Immutable catalog snapshot.
//!
//! Everything the codec reads comes from a [`CatalogSnapshot`]: dimensions and
//! values, climatic indicators, spatial regions and configurations. The storage
//! collaborator builds one per reload and shares it as `Arc<CatalogSnapshot>`;
//! nothing in this crate mutates a snapshot after construction.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::catalog::{ensure_valid_token, ClimaticIndicator, DimensionCatalog, SpatialRegion};
use crate::configuration::{
    Configuration, CoverageCategory, FixedSchemaConfiguration, GenericConfiguration,
    LOWER_BOUND, MAX_OPEN_DIMENSIONS, UNCERTAINTY_DIMENSION, UPPER_BOUND,
};
use crate::error::{CoverageError, CoverageResult, EntityKind};
use crate::template;

/// A validated, read-only view of the configuration space.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    catalog: DimensionCatalog,
    indicators: Vec<ClimaticIndicator>,
    regions: Vec<SpatialRegion>,
    configurations: Vec<Configuration>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl CatalogSnapshot {
    /// Build and validate a snapshot.
    pub fn new(
        catalog: DimensionCatalog,
        indicators: Vec<ClimaticIndicator>,
        regions: Vec<SpatialRegion>,
        configurations: Vec<Configuration>,
    ) -> CoverageResult<Self> {
        let mut by_name = HashMap::with_capacity(configurations.len());
        for (i, config) in configurations.iter().enumerate() {
            ensure_valid_token("Configuration name", config.name())?;
            if by_name.insert(config.name().to_string(), i).is_some() {
                return Err(CoverageError::configuration(format!(
                    "Duplicate configuration '{}'",
                    config.name()
                )));
            }
        }

        let snapshot = Self {
            catalog,
            indicators,
            regions,
            configurations,
            by_name,
        };
        snapshot.validate()?;

        debug!(
            dimensions = snapshot.catalog.dimensions().len(),
            configurations = snapshot.configurations.len(),
            "Catalog snapshot built"
        );
        Ok(snapshot)
    }

    pub fn catalog(&self) -> &DimensionCatalog {
        &self.catalog
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn indicators(&self) -> &[ClimaticIndicator] {
        &self.indicators
    }

    pub fn regions(&self) -> &[SpatialRegion] {
        &self.regions
    }

    pub fn configuration(&self, name: &str) -> CoverageResult<&Configuration> {
        self.by_name
            .get(name)
            .map(|&i| &self.configurations[i])
            .ok_or_else(|| CoverageError::not_found(EntityKind::Configuration, name))
    }

    /// Look up an indicator by its compound identity.
    pub fn lookup_indicator(
        &self,
        name: &str,
        measure: &str,
        aggregation_period: &str,
    ) -> CoverageResult<&ClimaticIndicator> {
        self.indicators
            .iter()
            .find(|i| i.matches_tokens(&[name, measure, aggregation_period]))
            .ok_or_else(|| {
                CoverageError::not_found(
                    EntityKind::ClimaticIndicator,
                    format!("{}-{}-{}", name, measure, aggregation_period),
                )
            })
    }

    pub fn lookup_region(&self, name: &str) -> CoverageResult<&SpatialRegion> {
        self.regions
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| CoverageError::not_found(EntityKind::SpatialRegion, name))
    }

    /// Fixed-schema configurations sharing a prefix, in snapshot order.
    pub fn fixed_candidates(
        &self,
        category: CoverageCategory,
        indicator: &ClimaticIndicator,
        region: &str,
    ) -> Vec<&FixedSchemaConfiguration> {
        self.configurations
            .iter()
            .filter_map(|c| match c {
                Configuration::FixedSchema(f)
                    if f.category == category
                        && &f.indicator == indicator
                        && f.region == region =>
                {
                    Some(f)
                }
                _ => None,
            })
            .collect()
    }

    /// Configurations referencing `indicator`, in snapshot order.
    pub fn configurations_for_indicator<'a>(
        &'a self,
        indicator: &'a ClimaticIndicator,
    ) -> impl Iterator<Item = &'a Configuration> + 'a {
        self.configurations
            .iter()
            .filter(move |c| c.indicator() == Some(indicator))
    }

    /// Check every template placeholder names something the configuration
    /// can resolve.
    pub fn check_templates(&self) -> CoverageResult<()> {
        for config in &self.configurations {
            let known = template::context_keys(config);
            for (label, text) in config.templates().all() {
                for placeholder in template::placeholders(text) {
                    if !known.contains(placeholder) {
                        return Err(CoverageError::configuration(format!(
                            "Template {} of '{}' references unknown placeholder '{{{}}}'",
                            label,
                            config.name(),
                            placeholder
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn validate(&self) -> CoverageResult<()> {
        let mut seen = HashSet::new();
        for indicator in &self.indicators {
            indicator.validate()?;
            if !seen.insert(indicator) {
                return Err(CoverageError::configuration(format!(
                    "Duplicate climatic indicator '{}'",
                    indicator
                )));
            }
        }

        let mut seen = HashSet::new();
        for region in &self.regions {
            ensure_valid_token("Region name", &region.name)?;
            if !seen.insert(region.name.as_str()) {
                return Err(CoverageError::configuration(format!(
                    "Duplicate spatial region '{}'",
                    region.name
                )));
            }
        }

        for config in &self.configurations {
            if let Some(indicator) = config.indicator() {
                if !self.indicators.contains(indicator) {
                    return Err(CoverageError::inconsistent(format!(
                        "Configuration '{}' references unknown indicator '{}'",
                        config.name(),
                        indicator
                    )));
                }
            }

            match config {
                Configuration::Generic(generic) => self.validate_generic(generic)?,
                Configuration::FixedSchema(fixed) => self.validate_fixed(fixed)?,
            }

            self.validate_siblings(config)?;
        }

        self.validate_fixed_overlaps()
    }

    /// Two fixed-schema configurations under one prefix may not spell the same
    /// identifier: with the same number of open dimensions, some position must
    /// admit disjoint tokens. Configurations with nothing open are left to the
    /// resolver, which reports them as ambiguous.
    fn validate_fixed_overlaps(&self) -> CoverageResult<()> {
        let fixed: Vec<&FixedSchemaConfiguration> = self
            .configurations
            .iter()
            .filter_map(|c| match c {
                Configuration::FixedSchema(f) => Some(f),
                Configuration::Generic(_) => None,
            })
            .collect();

        for (i, first) in fixed.iter().enumerate() {
            let first_open = first.open_dimensions();
            if first_open.is_empty() {
                continue;
            }
            for second in &fixed[i + 1..] {
                if first.prefix_tokens() != second.prefix_tokens() {
                    continue;
                }
                let second_open = second.open_dimensions();
                if first_open.len() != second_open.len() {
                    continue;
                }
                let collides = first_open
                    .iter()
                    .zip(&second_open)
                    .all(|((_, a), (_, b))| a.iter().any(|token| b.contains(token)));
                if collides {
                    return Err(CoverageError::configuration(format!(
                        "Contradictory dimension cardinalities: '{}' and '{}' produce the same identifiers",
                        first.name, second.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_generic(&self, config: &GenericConfiguration) -> CoverageResult<()> {
        if CoverageCategory::from_token(&config.name).is_some() {
            return Err(CoverageError::configuration(format!(
                "Generic configuration may not be named '{}'",
                config.name
            )));
        }

        let mut declared = HashSet::new();
        for dim in &config.dimensions {
            if !declared.insert(dim.dimension.as_str()) {
                return Err(CoverageError::configuration(format!(
                    "Configuration '{}' declares dimension '{}' twice",
                    config.name, dim.dimension
                )));
            }
            self.check_values(&config.name, &dim.dimension, &dim.values)?;
        }
        Ok(())
    }

    fn validate_fixed(&self, config: &FixedSchemaConfiguration) -> CoverageResult<()> {
        if !self.regions.iter().any(|r| r.name == config.region) {
            return Err(CoverageError::inconsistent(format!(
                "Configuration '{}' references unknown region '{}'",
                config.name, config.region
            )));
        }

        if config.category == CoverageCategory::Historical
            && (!config.models.is_empty() || !config.scenarios.is_empty())
        {
            return Err(CoverageError::configuration(format!(
                "Historical configuration '{}' cannot declare models or scenarios",
                config.name
            )));
        }

        for (slot, values) in config.declared_dimensions() {
            self.check_values(&config.name, slot.dimension_name(), values)?;
        }

        let open = config.open_dimensions().len();
        if open > MAX_OPEN_DIMENSIONS {
            return Err(CoverageError::configuration(format!(
                "Configuration '{}' leaves {} dimensions open, at most {} can be encoded",
                config.name, open, MAX_OPEN_DIMENSIONS
            )));
        }
        Ok(())
    }

    fn check_values(&self, config: &str, dimension: &str, values: &[String]) -> CoverageResult<()> {
        let dim = self.catalog.get(dimension).ok_or_else(|| {
            CoverageError::inconsistent(format!(
                "Configuration '{}' references unknown dimension '{}'",
                config, dimension
            ))
        })?;
        let mut seen = HashSet::new();
        for token in values {
            if !dim.contains(token) {
                return Err(CoverageError::inconsistent(format!(
                    "Configuration '{}' references unknown value '{}' of dimension '{}'",
                    config, token, dimension
                )));
            }
            if !seen.insert(token.as_str()) {
                return Err(CoverageError::configuration(format!(
                    "Configuration '{}' lists value '{}' of '{}' twice",
                    config, token, dimension
                )));
            }
        }
        Ok(())
    }

    fn validate_siblings(&self, config: &Configuration) -> CoverageResult<()> {
        let siblings = config.uncertainty();
        for (sibling_name, bound) in [
            (siblings.lower.as_deref(), LOWER_BOUND),
            (siblings.upper.as_deref(), UPPER_BOUND),
        ] {
            let Some(sibling_name) = sibling_name else {
                continue;
            };
            let sibling = self.configuration(sibling_name).map_err(|_| {
                CoverageError::inconsistent(format!(
                    "Configuration '{}' references unknown uncertainty sibling '{}'",
                    config.name(),
                    sibling_name
                ))
            })?;

            match (config, sibling) {
                (Configuration::Generic(_), Configuration::Generic(_)) => {
                    let admits_bound = sibling
                        .allowed_values(UNCERTAINTY_DIMENSION)
                        .is_some_and(|values| values.iter().any(|v| v == bound));
                    if !admits_bound {
                        return Err(CoverageError::configuration(format!(
                            "Uncertainty sibling '{}' of '{}' must admit {}={}",
                            sibling_name,
                            config.name(),
                            UNCERTAINTY_DIMENSION,
                            bound
                        )));
                    }
                }
                (Configuration::FixedSchema(base), Configuration::FixedSchema(other)) => {
                    if base.prefix_tokens() == other.prefix_tokens() {
                        return Err(CoverageError::configuration(format!(
                            "Uncertainty sibling '{}' of '{}' shares its identifier prefix",
                            sibling_name, base.name
                        )));
                    }
                }
                _ => {
                    return Err(CoverageError::configuration(format!(
                        "Uncertainty sibling '{}' of '{}' is a different kind of configuration",
                        sibling_name,
                        config.name()
                    )));
                }
            }
        }
        Ok(())
    }
}
