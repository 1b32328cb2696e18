//! Parser for generic configuration identifiers.
//!
//! A generic identifier is `<name>[-<indicator tokens>](-<token>)*`. The name is
//! followed by the three climatic-indicator tokens when the configuration has
//! an indicator, then one token per declared dimension with dimensions ordered
//! by name ascending.

use tracing::trace;

use crate::catalog::SEPARATOR;
use crate::configuration::{Configuration, GenericConfiguration};
use crate::coverage::{Coverage, ResolvedValues};
use crate::error::{CoverageError, CoverageResult, DecodeError};
use crate::snapshot::CatalogSnapshot;

/// Decode `identifier` against one generic configuration.
pub fn parse(
    snapshot: &CatalogSnapshot,
    config: &GenericConfiguration,
    identifier: &str,
) -> CoverageResult<ResolvedValues> {
    let tokens: Vec<&str> = identifier.split(SEPARATOR).collect();

    if tokens[0] != config.name {
        return Err(DecodeError::unknown_token(identifier, tokens[0]).into());
    }

    let dimensions = config.sorted_dimensions();
    let prefix_len = config.prefix_len();
    let expected = prefix_len + dimensions.len();
    if tokens.len() < expected {
        return Err(DecodeError::too_short(identifier, expected, tokens.len()).into());
    }
    if tokens.len() > expected {
        return Err(DecodeError::too_long(identifier, expected, tokens.len()).into());
    }

    if let Some(indicator) = &config.indicator {
        for (expected_token, token) in indicator.tokens().iter().zip(&tokens[1..prefix_len]) {
            if expected_token != token {
                return Err(DecodeError::unknown_token(identifier, *token).into());
            }
        }
    }

    let mut values = ResolvedValues::new();
    for (dim, token) in dimensions.iter().zip(&tokens[prefix_len..]) {
        if !dim.values.iter().any(|v| v.as_str() == *token) {
            return Err(DecodeError::unknown_token(identifier, *token).into());
        }
        let value = snapshot
            .catalog()
            .lookup_value(&dim.dimension, token)
            .map_err(|_| {
                CoverageError::inconsistent(format!(
                    "Configuration '{}' admits '{}' which is not a value of '{}'",
                    config.name, token, dim.dimension
                ))
            })?;
        values.insert(dim.dimension.clone(), value.clone());
    }

    trace!(configuration = %config.name, identifier, "Parsed generic identifier");
    Ok(values)
}

/// Decode `identifier` into a coverage of `config`, which must be generic.
pub fn parse_coverage(
    snapshot: &CatalogSnapshot,
    config: &Configuration,
    identifier: &str,
) -> CoverageResult<Coverage> {
    let Configuration::Generic(generic) = config else {
        return Err(CoverageError::configuration(format!(
            "Configuration '{}' is not generic",
            config.name()
        )));
    };
    let values = parse(snapshot, generic, identifier)?;
    Coverage::new(config, values)
}
