//! Coverages: one concrete point of a configuration's space.
//!
//! A [`Coverage`] is never stored. It is produced by the generator or a parser,
//! handed to callers, and discarded. Two coverages are equal when their
//! identifiers are.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::catalog::{Value, SEPARATOR};
use crate::configuration::Configuration;
use crate::error::{CoverageError, CoverageResult};
use crate::template::{
    self, RenderContext, AGGREGATION_PERIOD_KEY, MEASURE_KEY, SPATIAL_REGION_KEY, VARIABLE_KEY,
};

/// Resolved values keyed by dimension name.
pub type ResolvedValues = BTreeMap<String, Value>;

/// A fully resolved coverage.
#[derive(Debug, Clone, Serialize)]
pub struct Coverage {
    pub identifier: String,
    /// Name of the configuration this coverage belongs to.
    pub configuration: String,
    /// One value per declared dimension, implicit ones included.
    pub values: ResolvedValues,
}

impl Coverage {
    /// Build a coverage and compute its identifier.
    pub fn new(config: &Configuration, values: ResolvedValues) -> CoverageResult<Self> {
        let identifier = encode(config, &values)?;
        Ok(Self {
            identifier,
            configuration: config.name().to_string(),
            values,
        })
    }

    pub fn value(&self, dimension: &str) -> Option<&Value> {
        self.values.get(dimension)
    }

    /// Identifier token resolved for `dimension`.
    pub fn token(&self, dimension: &str) -> Option<&str> {
        self.values.get(dimension).map(|v| v.name.as_str())
    }

    /// Placeholder values for rendering this coverage's templates.
    pub fn render_context(&self, config: &Configuration) -> RenderContext {
        let mut ctx: RenderContext = self
            .values
            .iter()
            .map(|(dim, value)| (dim.clone(), value.internal_value.clone()))
            .collect();
        if let Some(indicator) = config.indicator() {
            ctx.insert(VARIABLE_KEY.to_string(), indicator.name.clone());
            ctx.insert(MEASURE_KEY.to_string(), indicator.measure.clone());
            ctx.insert(
                AGGREGATION_PERIOD_KEY.to_string(),
                indicator.aggregation_period.clone(),
            );
        }
        if let Some(region) = config.region() {
            ctx.insert(SPATIAL_REGION_KEY.to_string(), region.to_string());
        }
        ctx
    }

    /// Render one of the configuration's templates for this coverage.
    ///
    /// Returns `Ok(None)` when the configuration has no such template.
    pub fn render(
        &self,
        config: &Configuration,
        which: TemplateKind,
    ) -> CoverageResult<Option<String>> {
        if config.name() != self.configuration {
            return Err(CoverageError::configuration(format!(
                "Coverage '{}' belongs to '{}', not '{}'",
                self.identifier,
                self.configuration,
                config.name()
            )));
        }
        match which.select(config) {
            Some(text) if !text.is_empty() => {
                template::render(text, &self.render_context(config)).map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl PartialEq for Coverage {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Coverage {}

impl Hash for Coverage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

/// Which configuration template to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    StoragePath,
    VariableName,
    LayerName,
    LowerUncertaintyStoragePath,
    LowerUncertaintyVariableName,
    UpperUncertaintyStoragePath,
    UpperUncertaintyVariableName,
}

impl TemplateKind {
    fn select(self, config: &Configuration) -> Option<&str> {
        let templates = config.templates();
        match self {
            TemplateKind::StoragePath => Some(templates.storage_path.as_str()),
            TemplateKind::VariableName => Some(templates.variable_name.as_str()),
            TemplateKind::LayerName => Some(templates.layer_name.as_str()),
            TemplateKind::LowerUncertaintyStoragePath => {
                templates.lower_uncertainty.as_ref().map(|t| t.storage_path.as_str())
            }
            TemplateKind::LowerUncertaintyVariableName => {
                templates.lower_uncertainty.as_ref().map(|t| t.variable_name.as_str())
            }
            TemplateKind::UpperUncertaintyStoragePath => {
                templates.upper_uncertainty.as_ref().map(|t| t.storage_path.as_str())
            }
            TemplateKind::UpperUncertaintyVariableName => {
                templates.upper_uncertainty.as_ref().map(|t| t.variable_name.as_str())
            }
        }
    }
}

fn token_for<'a>(
    config: &Configuration,
    values: &'a ResolvedValues,
    dimension: &str,
) -> CoverageResult<&'a str> {
    values
        .get(dimension)
        .map(|v| v.name.as_str())
        .ok_or_else(|| {
            CoverageError::configuration(format!(
                "No value resolved for dimension '{}' of '{}'",
                dimension,
                config.name()
            ))
        })
}

/// Join resolved values into the identifier `config` uses for them.
pub fn encode(config: &Configuration, values: &ResolvedValues) -> CoverageResult<String> {
    let mut tokens: Vec<&str> = Vec::new();
    match config {
        Configuration::Generic(generic) => {
            tokens.push(&generic.name);
            if let Some(indicator) = &generic.indicator {
                tokens.extend(indicator.tokens());
            }
            for dim in generic.sorted_dimensions() {
                tokens.push(token_for(config, values, &dim.dimension)?);
            }
        }
        Configuration::FixedSchema(fixed) => {
            tokens.extend(fixed.prefix_tokens());
            for (slot, _) in fixed.open_dimensions() {
                tokens.push(token_for(config, values, slot.dimension_name())?);
            }
        }
    }
    Ok(tokens.join(SEPARATOR))
}
