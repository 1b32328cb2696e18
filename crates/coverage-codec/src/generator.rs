//! Identifier generation.
//!
//! Enumerates every coverage of a configuration as the Cartesian product of its
//! declared dimensions' admissible values. The product varies the last encoded
//! dimension fastest, so output order is stable across calls; listing and
//! pagination rely on that.

use std::collections::HashSet;

use tracing::trace;

use crate::catalog::Value;
use crate::configuration::Configuration;
use crate::coverage::{Coverage, ResolvedValues};
use crate::error::{CoverageError, CoverageResult};
use crate::snapshot::CatalogSnapshot;

/// Every identifier of `config`, deduplicated, in product order.
pub fn generate(snapshot: &CatalogSnapshot, config: &Configuration) -> CoverageResult<Vec<String>> {
    Ok(enumerate(snapshot, config)?
        .into_iter()
        .map(|c| c.identifier)
        .collect())
}

/// Every coverage of `config`, deduplicated by identifier, in product order.
pub fn enumerate(snapshot: &CatalogSnapshot, config: &Configuration) -> CoverageResult<Vec<Coverage>> {
    enumerate_where(snapshot, config, |_, _| true)
}

/// Like [`enumerate`], keeping only values for which `keep(dimension, token)`
/// holds. A dimension left without values empties the product.
pub fn enumerate_where<F>(
    snapshot: &CatalogSnapshot,
    config: &Configuration,
    keep: F,
) -> CoverageResult<Vec<Coverage>>
where
    F: Fn(&str, &str) -> bool,
{
    let mut axes: Vec<(&str, Vec<&Value>)> = Vec::new();
    for (dimension, tokens) in config.declared_dimensions() {
        let mut values = Vec::with_capacity(tokens.len());
        for token in tokens.iter().filter(|t| keep(dimension, t.as_str())) {
            let value = snapshot.catalog().lookup_value(dimension, token).map_err(|_| {
                CoverageError::inconsistent(format!(
                    "Configuration '{}' admits '{}' which is not a value of '{}'",
                    config.name(),
                    token,
                    dimension
                ))
            })?;
            values.push(value);
        }
        axes.push((dimension, values));
    }

    let combinations = cartesian_product(&axes);
    let mut seen = HashSet::with_capacity(combinations.len());
    let mut coverages = Vec::with_capacity(combinations.len());
    for combination in combinations {
        let coverage = Coverage::new(config, combination)?;
        if seen.insert(coverage.identifier.clone()) {
            coverages.push(coverage);
        }
    }

    trace!(
        configuration = config.name(),
        count = coverages.len(),
        "Enumerated coverages"
    );
    Ok(coverages)
}

/// Odometer over the axes, last axis fastest. No axes yields one empty
/// combination; an empty axis yields none.
fn cartesian_product(axes: &[(&str, Vec<&Value>)]) -> Vec<ResolvedValues> {
    if axes.iter().any(|(_, values)| values.is_empty()) {
        return Vec::new();
    }

    let total: usize = axes.iter().map(|(_, values)| values.len()).product();
    let mut out = Vec::with_capacity(total);
    let mut indices = vec![0usize; axes.len()];

    loop {
        let combination: ResolvedValues = axes
            .iter()
            .zip(&indices)
            .map(|((dimension, values), &i)| (dimension.to_string(), values[i].clone()))
            .collect();
        out.push(combination);

        let mut axis = axes.len();
        loop {
            if axis == 0 {
                return out;
            }
            axis -= 1;
            indices[axis] += 1;
            if indices[axis] < axes[axis].1.len() {
                break;
            }
            indices[axis] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(dimension: &str, name: &str) -> Value {
        let mut v = Value::new(name, name, 0);
        v.dimension = dimension.to_string();
        v
    }

    #[test]
    fn test_product_last_axis_fastest() {
        let a1 = value("a", "a1");
        let a2 = value("a", "a2");
        let b1 = value("b", "b1");
        let b2 = value("b", "b2");
        let b3 = value("b", "b3");
        let axes = vec![("a", vec![&a1, &a2]), ("b", vec![&b1, &b2, &b3])];

        let combos = cartesian_product(&axes);
        assert_eq!(combos.len(), 6);
        let pairs: Vec<(String, String)> = combos
            .iter()
            .map(|c| (c["a"].name.clone(), c["b"].name.clone()))
            .collect();
        assert_eq!(pairs[0], ("a1".to_string(), "b1".to_string()));
        assert_eq!(pairs[1], ("a1".to_string(), "b2".to_string()));
        assert_eq!(pairs[3], ("a2".to_string(), "b1".to_string()));
        assert_eq!(pairs[5], ("a2".to_string(), "b3".to_string()));
    }

    #[test]
    fn test_empty_axis_empties_product() {
        let a1 = value("a", "a1");
        let axes = vec![("a", vec![&a1]), ("b", vec![])];
        assert!(cartesian_product(&axes).is_empty());
    }

    #[test]
    fn test_no_axes_single_combination() {
        let combos = cartesian_product(&[]);
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }
}
