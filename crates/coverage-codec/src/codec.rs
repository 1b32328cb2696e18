//! Codec facade over a shared catalog snapshot.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::SEPARATOR;
use crate::configuration::{Configuration, CoverageCategory};
use crate::coverage::{Coverage, TemplateKind};
use crate::derived;
use crate::error::{CoverageError, CoverageResult, DecodeError};
use crate::filter::{self, CoverageFilter};
use crate::generator;
use crate::parser;
use crate::resolver::FixedSchemaResolver;
use crate::snapshot::CatalogSnapshot;

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize)]
pub struct CoveragePage {
    pub identifiers: Vec<String>,
    /// Size of the whole result, across pages.
    pub total: usize,
    pub offset: usize,
}

/// Entry point for API layers: generation, decoding, rendering and derived
/// coverages over one snapshot.
///
/// The codec only reads its snapshot, so it can be cloned and shared across
/// threads freely; a catalog reload means building a new codec.
#[derive(Debug, Clone)]
pub struct CoverageCodec {
    snapshot: Arc<CatalogSnapshot>,
    resolver: Arc<FixedSchemaResolver>,
}

impl CoverageCodec {
    pub fn new(snapshot: Arc<CatalogSnapshot>) -> Self {
        Self::with_resolver(snapshot, FixedSchemaResolver::default())
    }

    pub fn with_resolver(snapshot: Arc<CatalogSnapshot>, resolver: FixedSchemaResolver) -> Self {
        Self {
            snapshot,
            resolver: Arc::new(resolver),
        }
    }

    pub fn snapshot(&self) -> &Arc<CatalogSnapshot> {
        &self.snapshot
    }

    /// Every identifier of the named configuration.
    pub fn generate(&self, configuration: &str) -> CoverageResult<Vec<String>> {
        let config = self.snapshot.configuration(configuration)?;
        generator::generate(&self.snapshot, config)
    }

    /// Every coverage of the named configuration.
    pub fn coverages(&self, configuration: &str) -> CoverageResult<Vec<Coverage>> {
        let config = self.snapshot.configuration(configuration)?;
        generator::enumerate(&self.snapshot, config)
    }

    /// Decode any identifier. `forecast-…` and `historical-…` go through the
    /// fixed-schema resolver; anything else is parsed against the generic
    /// configuration named by its first token.
    pub fn decode(&self, identifier: &str) -> CoverageResult<Coverage> {
        let first = identifier.split(SEPARATOR).next().unwrap_or_default();
        if first.is_empty() {
            return Err(DecodeError::too_short(identifier, 1, 0).into());
        }
        match CoverageCategory::from_token(first) {
            Some(category) => self.resolver.resolve(&self.snapshot, category, identifier),
            None => match self.snapshot.configuration(first)? {
                // Fixed-schema identifiers never start with a configuration name.
                Configuration::FixedSchema(_) => {
                    Err(DecodeError::unknown_token(identifier, first).into())
                }
                config => parser::parse_coverage(&self.snapshot, config, identifier),
            },
        }
    }

    /// Decode a fixed-schema identifier of a known category.
    pub fn resolve(&self, category: CoverageCategory, identifier: &str) -> CoverageResult<Coverage> {
        self.resolver.resolve(&self.snapshot, category, identifier)
    }

    /// Render a template of the coverage's configuration.
    pub fn render(&self, coverage: &Coverage, which: TemplateKind) -> CoverageResult<Option<String>> {
        let config = self.snapshot.configuration(&coverage.configuration)?;
        coverage.render(config, which)
    }

    pub fn storage_path(&self, coverage: &Coverage) -> CoverageResult<String> {
        self.required(coverage, TemplateKind::StoragePath)
    }

    pub fn variable_name(&self, coverage: &Coverage) -> CoverageResult<String> {
        self.required(coverage, TemplateKind::VariableName)
    }

    pub fn layer_name(&self, coverage: &Coverage) -> CoverageResult<String> {
        self.required(coverage, TemplateKind::LayerName)
    }

    fn required(&self, coverage: &Coverage, which: TemplateKind) -> CoverageResult<String> {
        self.render(coverage, which)?.ok_or_else(|| {
            CoverageError::configuration(format!(
                "Configuration '{}' has no {:?} template",
                coverage.configuration, which
            ))
        })
    }

    pub fn uncertainty_bounds(
        &self,
        coverage: &Coverage,
    ) -> CoverageResult<(Option<Coverage>, Option<Coverage>)> {
        derived::uncertainty_bounds(&self.snapshot, coverage)
    }

    pub fn other_models(&self, coverage: &Coverage) -> CoverageResult<Vec<Coverage>> {
        derived::other_models(&self.snapshot, coverage)
    }

    pub fn filter(&self, coverage_filter: &CoverageFilter) -> CoverageResult<Vec<Coverage>> {
        filter::filter(&self.snapshot, coverage_filter)
    }

    /// A page of filtered identifiers. Output order is stable for a given
    /// snapshot, so consecutive pages neither repeat nor skip entries.
    pub fn list(
        &self,
        coverage_filter: &CoverageFilter,
        offset: usize,
        limit: usize,
    ) -> CoverageResult<CoveragePage> {
        let all = filter::filter_identifiers(&self.snapshot, coverage_filter)?;
        let total = all.len();
        let identifiers = all.into_iter().skip(offset).take(limit).collect();
        Ok(CoveragePage {
            identifiers,
            total,
            offset,
        })
    }
}
