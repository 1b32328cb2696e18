//! Coverage identifier codec for climate datasets.
//!
//! A coverage is one concrete combination of dimension values (scenario,
//! model, year period, time window, uncertainty bound) inside a configuration.
//! This crate enumerates the identifiers of a configuration, decodes
//! identifiers back into coverages and renders the templates that locate a
//! coverage's data.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod configuration;
pub mod coverage;
pub mod derived;
pub mod error;
pub mod filter;
pub mod generator;
pub mod loader;
pub mod parser;
pub mod resolver;
pub mod snapshot;
pub mod template;

pub use catalog::{ClimaticIndicator, Dimension, DimensionCatalog, SpatialRegion, Value, SEPARATOR};
pub use codec::{CoverageCodec, CoveragePage};
pub use config::CodecConfig;
pub use configuration::{
    Configuration, CoverageCategory, CoverageTemplates, DimensionValues, FixedDimension,
    FixedSchemaConfiguration, GenericConfiguration, TemplateSet, UncertaintySiblings,
};
pub use coverage::{Coverage, ResolvedValues, TemplateKind};
pub use error::{CoverageError, CoverageResult, DecodeError, DecodeReason, EntityKind};
pub use filter::CoverageFilter;
pub use resolver::{
    FixedSchemaResolver, IdentifierResolutionStrategy, OrderedSuffixStrategy, PrefixOnlyStrategy,
    ResolutionInput, SingleTokenStrategy,
};
pub use snapshot::CatalogSnapshot;
