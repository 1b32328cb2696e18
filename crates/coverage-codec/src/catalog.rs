//! Dimension catalog: named dimensions and their admissible values.
//!
//! The catalog is a read-only lookup built once per snapshot. Dimension names are
//! unique catalog-wide and value tokens are unique within their dimension.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, CoverageResult, EntityKind};

/// Separator between identifier segments.
pub const SEPARATOR: &str = "-";

/// Check that a name can be used as an identifier token: non-empty,
/// lowercase ASCII letters, digits and underscores only.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

pub(crate) fn ensure_valid_token(what: &str, token: &str) -> CoverageResult<()> {
    if is_valid_token(token) {
        Ok(())
    } else {
        Err(CoverageError::configuration(format!(
            "{} '{}' must be lowercase letters, digits or underscores",
            what, token
        )))
    }
}

/// One admissible point along a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    /// Token used in identifiers.
    pub name: String,
    /// Value substituted into templates.
    pub internal_value: String,
    pub sort_order: i32,
    /// Name of the owning dimension.
    pub dimension: String,
}

/// A named axis of variation, e.g. `scenario`.
#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub name: String,
    /// Values ordered by `sort_order`, ties kept in declaration order.
    values: Vec<Value>,
}

impl Dimension {
    /// Build a dimension, validating names and token uniqueness.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> CoverageResult<Self> {
        let name = name.into();
        ensure_valid_token("Dimension name", &name)?;

        let mut values = values;
        for value in values.iter_mut() {
            ensure_valid_token("Value name", &value.name)?;
            value.dimension = name.clone();
        }

        {
            let mut seen = HashSet::new();
            for value in &values {
                if !seen.insert(value.name.as_str()) {
                    return Err(CoverageError::configuration(format!(
                        "Duplicate value '{}' in dimension '{}'",
                        value.name, name
                    )));
                }
            }
        }

        values.sort_by_key(|v| v.sort_order);
        Ok(Self { name, values })
    }

    /// Ordered values of this dimension.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Find a value by its identifier token.
    pub fn value(&self, token: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.name == token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.value(token).is_some()
    }
}

impl Value {
    pub fn new(name: impl Into<String>, internal_value: impl Into<String>, sort_order: i32) -> Self {
        Self {
            name: name.into(),
            internal_value: internal_value.into(),
            sort_order,
            dimension: String::new(),
        }
    }
}

/// Read-only lookup of dimensions by name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DimensionCatalog {
    dimensions: Vec<Dimension>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DimensionCatalog {
    pub fn new(dimensions: Vec<Dimension>) -> CoverageResult<Self> {
        let mut index = HashMap::with_capacity(dimensions.len());
        for (i, dimension) in dimensions.iter().enumerate() {
            if index.insert(dimension.name.clone(), i).is_some() {
                return Err(CoverageError::configuration(format!(
                    "Duplicate dimension '{}'",
                    dimension.name
                )));
            }
        }
        Ok(Self { dimensions, index })
    }

    pub fn lookup_dimension(&self, name: &str) -> CoverageResult<&Dimension> {
        self.index
            .get(name)
            .map(|&i| &self.dimensions[i])
            .ok_or_else(|| CoverageError::not_found(EntityKind::Dimension, name))
    }

    pub fn lookup_value(&self, dimension: &str, token: &str) -> CoverageResult<&Value> {
        self.lookup_dimension(dimension)?
            .value(token)
            .ok_or_else(|| {
                CoverageError::not_found(EntityKind::Value, format!("{}:{}", dimension, token))
            })
    }

    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.index.get(name).map(|&i| &self.dimensions[i])
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// True if any dimension admits `token`.
    pub fn knows_token(&self, token: &str) -> bool {
        self.dimensions.iter().any(|d| d.contains(token))
    }
}

/// Compound identity of a climatic indicator, rendered as three tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClimaticIndicator {
    pub name: String,
    pub measure: String,
    pub aggregation_period: String,
}

impl ClimaticIndicator {
    pub fn new(
        name: impl Into<String>,
        measure: impl Into<String>,
        aggregation_period: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            measure: measure.into(),
            aggregation_period: aggregation_period.into(),
        }
    }

    /// The three identifier tokens, in order.
    pub fn tokens(&self) -> [&str; 3] {
        [&self.name, &self.measure, &self.aggregation_period]
    }

    pub fn matches_tokens(&self, tokens: &[&str]) -> bool {
        tokens.len() == 3 && self.tokens() == [tokens[0], tokens[1], tokens[2]]
    }

    pub(crate) fn validate(&self) -> CoverageResult<()> {
        ensure_valid_token("Indicator name", &self.name)?;
        ensure_valid_token("Indicator measure", &self.measure)?;
        ensure_valid_token("Indicator aggregation period", &self.aggregation_period)
    }
}

impl fmt::Display for ClimaticIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.name,
            self.measure,
            self.aggregation_period,
            sep = SEPARATOR
        )
    }
}

/// A spatial region, contributing one identifier token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialRegion {
    pub name: String,
}

impl SpatialRegion {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
