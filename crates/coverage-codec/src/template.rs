//! `{dimension_name}` template rendering.
//!
//! Templates are plain strings such as
//! `"tas/{scenario}/tas_{year_period}_{scenario}.nc"`. Every placeholder is
//! replaced by the internal value of the resolved dimension value; substituted
//! text is not scanned again. A placeholder left without a value is an error.

use std::collections::{BTreeMap, HashSet};

use crate::catalog::is_valid_token;
use crate::configuration::Configuration;
use crate::error::{CoverageError, CoverageResult};

/// Placeholder name to substituted text.
pub type RenderContext = BTreeMap<String, String>;

/// Context keys contributed by the climatic indicator and spatial region.
pub const VARIABLE_KEY: &str = "variable";
pub const MEASURE_KEY: &str = "measure";
pub const AGGREGATION_PERIOD_KEY: &str = "aggregation_period";
pub const SPATIAL_REGION_KEY: &str = "spatial_region";

/// Find the placeholder spans in `template` as `(start, end, name)`, where
/// `start..end` covers the braces.
fn scan(template: &str) -> Vec<(usize, usize, &str)> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    while let Some(open) = template[cursor..].find('{') {
        let start = cursor + open;
        let Some(close) = template[start + 1..].find('}') else {
            break;
        };
        let end = start + 1 + close;
        let name = &template[start + 1..end];
        if is_valid_token(name) {
            spans.push((start, end + 1, name));
            cursor = end + 1;
        } else {
            // Not a placeholder; a later '{' may still open one.
            cursor = start + 1;
        }
    }
    spans
}

/// Names of the placeholders in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    scan(template).into_iter().map(|(_, _, name)| name).collect()
}

/// Substitute every placeholder from `context`.
pub fn render(template: &str, context: &RenderContext) -> CoverageResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for (start, end, name) in scan(template) {
        let value = context.get(name).ok_or_else(|| {
            CoverageError::configuration(format!(
                "Unresolved placeholder '{{{}}}' in template '{}'",
                name, template
            ))
        })?;
        out.push_str(&template[last..start]);
        out.push_str(value);
        last = end;
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Every key a coverage of `config` puts in its render context.
pub fn context_keys(config: &Configuration) -> HashSet<String> {
    let mut keys: HashSet<String> = config
        .declared_dimensions()
        .into_iter()
        .map(|(name, _)| name.to_string())
        .collect();
    if config.indicator().is_some() {
        keys.extend(
            [VARIABLE_KEY, MEASURE_KEY, AGGREGATION_PERIOD_KEY]
                .into_iter()
                .map(String::from),
        );
    }
    if config.region().is_some() {
        keys.insert(SPATIAL_REGION_KEY.to_string());
    }
    keys
}
