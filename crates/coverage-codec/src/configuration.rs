//! Configuration definitions.
//!
//! A configuration declares which dimensions (and which of their values) make up a
//! family of coverages, together with the templates used to locate their data.
//! There are two shapes: free-form [`GenericConfiguration`]s, whose identifiers
//! list one segment per declared dimension, and [`FixedSchemaConfiguration`]s for
//! forecast/historical data, whose identifiers start with a fixed prefix.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::ClimaticIndicator;

/// Leading token of a fixed-schema identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageCategory {
    Forecast,
    Historical,
}

impl CoverageCategory {
    pub const ALL: [CoverageCategory; 2] = [CoverageCategory::Forecast, CoverageCategory::Historical];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageCategory::Forecast => "forecast",
            CoverageCategory::Historical => "historical",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }
}

impl fmt::Display for CoverageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensions a fixed-schema identifier may carry after its prefix, in
/// encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FixedDimension {
    Model,
    Scenario,
    TimeWindow,
    YearPeriod,
}

impl FixedDimension {
    pub const ORDER: [FixedDimension; 4] = [
        FixedDimension::Model,
        FixedDimension::Scenario,
        FixedDimension::TimeWindow,
        FixedDimension::YearPeriod,
    ];

    /// Catalog dimension backing this slot.
    pub fn dimension_name(&self) -> &'static str {
        match self {
            FixedDimension::Model => "model",
            FixedDimension::Scenario => "scenario",
            FixedDimension::TimeWindow => "time_window",
            FixedDimension::YearPeriod => "year_period",
        }
    }
}

/// Most fixed-schema suffix tokens an identifier may carry.
pub const MAX_OPEN_DIMENSIONS: usize = 3;

/// Name of the dimension that distinguishes uncertainty bound siblings.
pub const UNCERTAINTY_DIMENSION: &str = "uncertainty_type";
pub const LOWER_BOUND: &str = "lower_bound";
pub const UPPER_BOUND: &str = "upper_bound";

/// Values a configuration admits for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValues {
    pub dimension: String,
    pub values: Vec<String>,
}

/// Storage path and variable name used for an uncertainty bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSet {
    pub storage_path: String,
    pub variable_name: String,
}

/// Templates with `{dimension_name}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageTemplates {
    pub storage_path: String,
    pub variable_name: String,
    #[serde(default)]
    pub layer_name: String,
    #[serde(default)]
    pub lower_uncertainty: Option<TemplateSet>,
    #[serde(default)]
    pub upper_uncertainty: Option<TemplateSet>,
}

impl CoverageTemplates {
    /// Every non-empty template string, labelled.
    pub fn all(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            ("storage_path", self.storage_path.as_str()),
            ("variable_name", self.variable_name.as_str()),
            ("layer_name", self.layer_name.as_str()),
        ];
        if let Some(lower) = &self.lower_uncertainty {
            out.push(("lower_uncertainty.storage_path", lower.storage_path.as_str()));
            out.push(("lower_uncertainty.variable_name", lower.variable_name.as_str()));
        }
        if let Some(upper) = &self.upper_uncertainty {
            out.push(("upper_uncertainty.storage_path", upper.storage_path.as_str()));
            out.push(("upper_uncertainty.variable_name", upper.variable_name.as_str()));
        }
        out.retain(|(_, t)| !t.is_empty());
        out
    }
}

/// Names of the configurations holding the lower/upper bound siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncertaintySiblings {
    #[serde(default)]
    pub lower: Option<String>,
    #[serde(default)]
    pub upper: Option<String>,
}

impl UncertaintySiblings {
    pub fn is_empty(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

/// Free-form configuration: `<name>[-<indicator tokens>](-<token>)*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericConfiguration {
    pub name: String,
    #[serde(default)]
    pub indicator: Option<ClimaticIndicator>,
    /// Declared dimensions, in declaration order.
    pub dimensions: Vec<DimensionValues>,
    #[serde(default)]
    pub templates: CoverageTemplates,
    #[serde(default)]
    pub uncertainty: UncertaintySiblings,
}

impl GenericConfiguration {
    /// Declared dimensions ordered by name, which is their identifier order.
    pub fn sorted_dimensions(&self) -> Vec<&DimensionValues> {
        let mut dims: Vec<_> = self.dimensions.iter().collect();
        dims.sort_by(|a, b| a.dimension.cmp(&b.dimension));
        dims
    }

    /// Number of leading tokens before the first dimension segment.
    pub fn prefix_len(&self) -> usize {
        if self.indicator.is_some() {
            4
        } else {
            1
        }
    }

    pub fn allowed_values(&self, dimension: &str) -> Option<&[String]> {
        self.dimensions
            .iter()
            .find(|d| d.dimension == dimension)
            .map(|d| d.values.as_slice())
    }
}

/// Forecast/historical configuration:
/// `<category>-<indicator tokens>-<region>(-<token>){0,3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSchemaConfiguration {
    pub name: String,
    pub category: CoverageCategory,
    pub indicator: ClimaticIndicator,
    pub region: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub scenarios: Vec<String>,
    pub year_periods: Vec<String>,
    #[serde(default)]
    pub time_windows: Option<Vec<String>>,
    #[serde(default)]
    pub templates: CoverageTemplates,
    #[serde(default)]
    pub uncertainty: UncertaintySiblings,
}

impl FixedSchemaConfiguration {
    /// Declared slots in encoding order. Historical configurations carry
    /// neither model nor scenario.
    pub fn declared_dimensions(&self) -> Vec<(FixedDimension, &[String])> {
        FixedDimension::ORDER
            .into_iter()
            .filter_map(|slot| self.slot_values(slot).map(|values| (slot, values)))
            .collect()
    }

    /// Declared slots with more than one admissible value; these are the ones
    /// spelled out in identifiers.
    pub fn open_dimensions(&self) -> Vec<(FixedDimension, &[String])> {
        self.declared_dimensions()
            .into_iter()
            .filter(|(_, values)| values.len() > 1)
            .collect()
    }

    pub fn slot_values(&self, slot: FixedDimension) -> Option<&[String]> {
        match (slot, self.category) {
            (FixedDimension::Model, CoverageCategory::Forecast) => Some(&self.models),
            (FixedDimension::Scenario, CoverageCategory::Forecast) => Some(&self.scenarios),
            (FixedDimension::Model | FixedDimension::Scenario, CoverageCategory::Historical) => {
                None
            }
            (FixedDimension::TimeWindow, _) => self.time_windows.as_deref(),
            (FixedDimension::YearPeriod, _) => Some(&self.year_periods),
        }
    }

    pub fn allowed_values(&self, dimension: &str) -> Option<&[String]> {
        FixedDimension::ORDER
            .into_iter()
            .find(|slot| slot.dimension_name() == dimension)
            .and_then(|slot| self.slot_values(slot))
    }

    /// The five leading tokens shared by every identifier of this configuration.
    pub fn prefix_tokens(&self) -> Vec<&str> {
        let mut tokens = Vec::with_capacity(5);
        tokens.push(self.category.as_str());
        tokens.extend(self.indicator.tokens());
        tokens.push(self.region.as_str());
        tokens
    }
}

/// A configuration of either shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Configuration {
    Generic(GenericConfiguration),
    FixedSchema(FixedSchemaConfiguration),
}

impl Configuration {
    pub fn name(&self) -> &str {
        match self {
            Configuration::Generic(c) => &c.name,
            Configuration::FixedSchema(c) => &c.name,
        }
    }

    pub fn indicator(&self) -> Option<&ClimaticIndicator> {
        match self {
            Configuration::Generic(c) => c.indicator.as_ref(),
            Configuration::FixedSchema(c) => Some(&c.indicator),
        }
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            Configuration::Generic(_) => None,
            Configuration::FixedSchema(c) => Some(&c.region),
        }
    }

    pub fn templates(&self) -> &CoverageTemplates {
        match self {
            Configuration::Generic(c) => &c.templates,
            Configuration::FixedSchema(c) => &c.templates,
        }
    }

    pub fn uncertainty(&self) -> &UncertaintySiblings {
        match self {
            Configuration::Generic(c) => &c.uncertainty,
            Configuration::FixedSchema(c) => &c.uncertainty,
        }
    }

    /// Values admitted for `dimension`, or `None` if it is not declared.
    pub fn allowed_values(&self, dimension: &str) -> Option<&[String]> {
        match self {
            Configuration::Generic(c) => c.allowed_values(dimension),
            Configuration::FixedSchema(c) => c.allowed_values(dimension),
        }
    }

    /// Declared dimension names paired with their admissible tokens, in the
    /// order identifiers encode them.
    pub fn declared_dimensions(&self) -> Vec<(&str, &[String])> {
        match self {
            Configuration::Generic(c) => c
                .sorted_dimensions()
                .into_iter()
                .map(|d| (d.dimension.as_str(), d.values.as_slice()))
                .collect(),
            Configuration::FixedSchema(c) => c
                .declared_dimensions()
                .into_iter()
                .map(|(slot, values)| (slot.dimension_name(), values))
                .collect(),
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Configuration::Generic(_))
    }

    /// True when both configurations are the same variant.
    pub fn same_kind(&self, other: &Configuration) -> bool {
        self.is_generic() == other.is_generic()
    }
}
