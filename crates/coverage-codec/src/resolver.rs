//! Fixed-schema identifier resolution.
//!
//! Forecast and historical identifiers share a five-token prefix
//! (`<category>-<name>-<measure>-<aggregation period>-<region>`) followed by
//! zero to three tokens. Which dimensions those trailing tokens stand for is not
//! written down anywhere: a dimension is only spelled out when the matching
//! configuration admits more than one value for it. Resolution therefore has to
//! find a configuration whose open dimensions account for exactly the tokens
//! present.
//!
//! The search is an ordered list of [`IdentifierResolutionStrategy`]s, one per
//! suffix length, tried longest first. The first strategy producing a coverage
//! wins; every strategy is bounded by the candidate list, so resolution always
//! terminates.

use tracing::{debug, trace};

use crate::catalog::SEPARATOR;
use crate::configuration::{
    CoverageCategory, FixedDimension, FixedSchemaConfiguration, MAX_OPEN_DIMENSIONS,
};
use crate::coverage::{Coverage, ResolvedValues};
use crate::error::{CoverageResult, DecodeError, DecodeReason};
use crate::snapshot::CatalogSnapshot;

/// Tokens before the variable suffix: category, three indicator tokens, region.
pub const PREFIX_LEN: usize = 5;

/// What a strategy gets to look at.
#[derive(Debug)]
pub struct ResolutionInput<'a> {
    pub snapshot: &'a CatalogSnapshot,
    pub identifier: &'a str,
    /// Tokens after the fixed prefix.
    pub suffix: Vec<&'a str>,
    /// Configurations sharing the identifier's prefix, in catalog order.
    pub candidates: Vec<&'a FixedSchemaConfiguration>,
}

/// One length-specific resolution rule.
pub trait IdentifierResolutionStrategy: Send + Sync {
    /// Number of suffix tokens this strategy decodes.
    fn suffix_len(&self) -> usize;

    /// Try to decode the input. `Ok(None)` hands over to the next strategy;
    /// an error stops the search.
    fn try_resolve(&self, input: &ResolutionInput<'_>) -> Result<Option<Coverage>, DecodeReason>;
}

/// Resolve `suffix` against `candidate`, provided its open dimensions line up
/// with the tokens one to one and every token is admissible.
pub fn match_candidate(
    snapshot: &CatalogSnapshot,
    candidate: &FixedSchemaConfiguration,
    suffix: &[&str],
) -> Option<ResolvedValues> {
    let open = candidate.open_dimensions();
    if open.len() != suffix.len() {
        return None;
    }
    for ((_, admissible), token) in open.iter().zip(suffix) {
        if !admissible.iter().any(|v| v.as_str() == *token) {
            return None;
        }
    }

    let mut values = ResolvedValues::new();
    let mut open_tokens = suffix.iter();
    for (slot, admissible) in candidate.declared_dimensions() {
        let token = if admissible.len() > 1 {
            *open_tokens.next()?
        } else {
            admissible.first()?.as_str()
        };
        let value = snapshot
            .catalog()
            .lookup_value(slot.dimension_name(), token)
            .ok()?;
        values.insert(slot.dimension_name().to_string(), value.clone());
    }
    Some(values)
}

fn build(
    candidate: &FixedSchemaConfiguration,
    values: ResolvedValues,
    snapshot: &CatalogSnapshot,
) -> Result<Coverage, DecodeReason> {
    // Candidates come out of the snapshot, so the lookup cannot miss.
    let config = snapshot
        .configuration(&candidate.name)
        .map_err(|_| DecodeReason::NoMatchingConfiguration)?;
    Coverage::new(config, values).map_err(|_| DecodeReason::NoMatchingConfiguration)
}

/// Two or three trailing tokens: the first candidate whose open dimensions
/// account for all of them, in model, scenario, time window, year period order.
#[derive(Debug, Clone, Copy)]
pub struct OrderedSuffixStrategy {
    suffix_len: usize,
}

impl OrderedSuffixStrategy {
    pub fn new(suffix_len: usize) -> Self {
        Self { suffix_len }
    }
}

impl IdentifierResolutionStrategy for OrderedSuffixStrategy {
    fn suffix_len(&self) -> usize {
        self.suffix_len
    }

    fn try_resolve(&self, input: &ResolutionInput<'_>) -> Result<Option<Coverage>, DecodeReason> {
        if input.suffix.len() != self.suffix_len {
            return Ok(None);
        }
        for candidate in &input.candidates {
            if let Some(values) = match_candidate(input.snapshot, candidate, &input.suffix) {
                return build(candidate, values, input.snapshot).map(Some);
            }
        }
        Ok(None)
    }
}

/// One trailing token. The token is read as a model first, then as a year
/// period, then scenario, then time window; for each reading the first
/// candidate leaving exactly that dimension open wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleTokenStrategy;

impl SingleTokenStrategy {
    const PRIORITY: [FixedDimension; 4] = [
        FixedDimension::Model,
        FixedDimension::YearPeriod,
        FixedDimension::Scenario,
        FixedDimension::TimeWindow,
    ];
}

impl IdentifierResolutionStrategy for SingleTokenStrategy {
    fn suffix_len(&self) -> usize {
        1
    }

    fn try_resolve(&self, input: &ResolutionInput<'_>) -> Result<Option<Coverage>, DecodeReason> {
        let [token] = input.suffix.as_slice() else {
            return Ok(None);
        };
        for slot in Self::PRIORITY {
            let known = input
                .snapshot
                .catalog()
                .get(slot.dimension_name())
                .is_some_and(|d| d.contains(token));
            if !known {
                continue;
            }
            trace!(token, dimension = slot.dimension_name(), "Trying single-token reading");
            for candidate in &input.candidates {
                let open = candidate.open_dimensions();
                if open.len() != 1 || open[0].0 != slot {
                    continue;
                }
                if let Some(values) = match_candidate(input.snapshot, candidate, &input.suffix) {
                    return build(candidate, values, input.snapshot).map(Some);
                }
            }
        }
        Ok(None)
    }
}

/// No trailing tokens: the unique candidate with every dimension implicit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixOnlyStrategy;

impl IdentifierResolutionStrategy for PrefixOnlyStrategy {
    fn suffix_len(&self) -> usize {
        0
    }

    fn try_resolve(&self, input: &ResolutionInput<'_>) -> Result<Option<Coverage>, DecodeReason> {
        if !input.suffix.is_empty() {
            return Ok(None);
        }
        let mut matches: Vec<(&FixedSchemaConfiguration, ResolvedValues)> = input
            .candidates
            .iter()
            .filter_map(|c| match_candidate(input.snapshot, c, &[]).map(|v| (*c, v)))
            .collect();
        if matches.len() > 1 {
            return Err(DecodeReason::Ambiguous {
                candidates: matches.iter().map(|(c, _)| c.name.clone()).collect(),
            });
        }
        match matches.pop() {
            Some((candidate, values)) => build(candidate, values, input.snapshot).map(Some),
            None => Ok(None),
        }
    }
}

/// Resolves fixed-schema identifiers with an ordered list of strategies.
pub struct FixedSchemaResolver {
    strategies: Vec<Box<dyn IdentifierResolutionStrategy>>,
}

impl Default for FixedSchemaResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(OrderedSuffixStrategy::new(3)),
            Box::new(OrderedSuffixStrategy::new(2)),
            Box::new(SingleTokenStrategy),
            Box::new(PrefixOnlyStrategy),
        ])
    }
}

impl std::fmt::Debug for FixedSchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lengths: Vec<usize> = self.strategies.iter().map(|s| s.suffix_len()).collect();
        f.debug_struct("FixedSchemaResolver")
            .field("strategies", &lengths)
            .finish()
    }
}

impl FixedSchemaResolver {
    /// Build a resolver trying `strategies` in the given order.
    pub fn new(strategies: Vec<Box<dyn IdentifierResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Decode a fixed-schema identifier of the given category.
    pub fn resolve(
        &self,
        snapshot: &CatalogSnapshot,
        category: CoverageCategory,
        identifier: &str,
    ) -> CoverageResult<Coverage> {
        let tokens: Vec<&str> = identifier.split(SEPARATOR).collect();
        if tokens.len() < PREFIX_LEN {
            return Err(DecodeError::too_short(identifier, PREFIX_LEN, tokens.len()).into());
        }
        let max_len = PREFIX_LEN + MAX_OPEN_DIMENSIONS;
        if tokens.len() > max_len {
            return Err(DecodeError::too_long(identifier, max_len, tokens.len()).into());
        }
        if tokens[0] != category.as_str() {
            return Err(DecodeError::unknown_token(identifier, tokens[0]).into());
        }

        let indicator = snapshot.lookup_indicator(tokens[1], tokens[2], tokens[3])?;
        let region = snapshot.lookup_region(tokens[4])?;

        let input = ResolutionInput {
            snapshot,
            identifier,
            suffix: tokens[PREFIX_LEN..].to_vec(),
            candidates: snapshot.fixed_candidates(category, indicator, &region.name),
        };

        let mut attempted = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            attempted.push(strategy.suffix_len());
            match strategy.try_resolve(&input) {
                Ok(Some(coverage)) => {
                    debug!(
                        identifier,
                        configuration = %coverage.configuration,
                        suffix_len = strategy.suffix_len(),
                        "Resolved fixed-schema identifier"
                    );
                    return Ok(coverage);
                }
                Ok(None) => continue,
                Err(reason) => {
                    return Err(DecodeError::new(identifier, reason)
                        .with_attempted_lengths(attempted)
                        .into());
                }
            }
        }

        let reason = match unknown_suffix_token(&input) {
            Some(token) => DecodeReason::UnknownToken {
                token: token.to_string(),
            },
            None => DecodeReason::NoMatchingConfiguration,
        };
        debug!(identifier, %reason, ?attempted, "Fixed-schema identifier did not resolve");
        Err(DecodeError::new(identifier, reason)
            .with_attempted_lengths(attempted)
            .into())
    }
}

/// First suffix token no candidate admits for any of its dimensions.
fn unknown_suffix_token<'a>(input: &ResolutionInput<'a>) -> Option<&'a str> {
    input.suffix.iter().copied().find(|token| {
        !input.candidates.iter().any(|c| {
            c.declared_dimensions()
                .iter()
                .any(|(_, values)| values.iter().any(|v| v.as_str() == *token))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoverageError, EntityKind};
    use test_utils::{configurations, identifiers, SAMPLE_CATALOG_YAML};

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::from_yaml_str(SAMPLE_CATALOG_YAML).unwrap()
    }

    fn decode_error(err: CoverageError) -> DecodeError {
        match err {
            CoverageError::Decode(err) => err,
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_three_token_suffix() {
        let snapshot = snapshot();
        let coverage = FixedSchemaResolver::default()
            .resolve(
                &snapshot,
                CoverageCategory::Forecast,
                identifiers::FORECAST_TAS_30YR_RCP85_TW1_WINTER,
            )
            .unwrap();
        assert_eq!(coverage.configuration, configurations::FORECAST_TAS_30YR);
        assert_eq!(coverage.token("model"), Some("model_ensemble"));
        assert_eq!(coverage.token("scenario"), Some("rcp85"));
        assert_eq!(coverage.token("time_window"), Some("tw1"));
        assert_eq!(coverage.token("year_period"), Some("winter"));
    }

    #[test]
    fn test_single_token_read_as_model() {
        let snapshot = snapshot();
        let coverage = FixedSchemaResolver::default()
            .resolve(&snapshot, CoverageCategory::Forecast, identifiers::FORECAST_PR_RCA4)
            .unwrap();
        assert_eq!(coverage.configuration, configurations::FORECAST_PR);
        assert_eq!(coverage.token("model"), Some("ec_earth_rca4"));
        // Implicit single-valued slots are still resolved.
        assert_eq!(coverage.token("scenario"), Some("rcp85"));
        assert_eq!(coverage.token("year_period"), Some("all_year"));
    }

    #[test]
    fn test_single_token_falls_back_to_scenario() {
        let snapshot = snapshot();
        let coverage = FixedSchemaResolver::default()
            .resolve(&snapshot, CoverageCategory::Forecast, identifiers::FORECAST_SU30_RCP26)
            .unwrap();
        assert_eq!(coverage.configuration, configurations::FORECAST_SU30);
        assert_eq!(coverage.token("scenario"), Some("rcp26"));
    }

    #[test]
    fn test_historical_prefix_only_and_year_period() {
        let snapshot = snapshot();
        let resolver = FixedSchemaResolver::default();

        let tas = resolver
            .resolve(&snapshot, CoverageCategory::Historical, identifiers::HISTORICAL_TAS)
            .unwrap();
        assert_eq!(tas.configuration, configurations::HISTORICAL_TAS);
        assert_eq!(tas.token("model"), None);

        let pr = resolver
            .resolve(&snapshot, CoverageCategory::Historical, identifiers::HISTORICAL_PR_SUMMER)
            .unwrap();
        assert_eq!(pr.token("year_period"), Some("summer"));
    }

    #[test]
    fn test_too_short_prefix() {
        let snapshot = snapshot();
        let err = FixedSchemaResolver::default()
            .resolve(&snapshot, CoverageCategory::Forecast, "forecast-tas-anomaly-annual")
            .unwrap_err();
        assert_eq!(
            decode_error(err).reason,
            DecodeReason::TooShort {
                expected: 5,
                found: 4
            }
        );
    }

    #[test]
    fn test_too_long() {
        let snapshot = snapshot();
        let id = format!("{}-extra", identifiers::FORECAST_TAS_30YR_RCP85_TW1_WINTER);
        let err = FixedSchemaResolver::default()
            .resolve(&snapshot, CoverageCategory::Forecast, &id)
            .unwrap_err();
        assert_eq!(
            decode_error(err).reason,
            DecodeReason::TooLong {
                expected: 8,
                found: 9
            }
        );
    }

    #[test]
    fn test_unknown_suffix_token_reports_every_length() {
        let snapshot = snapshot();
        let err = FixedSchemaResolver::default()
            .resolve(
                &snapshot,
                CoverageCategory::Forecast,
                "forecast-tas-anomaly-annual-arpa_vfvg-rcp99-winter",
            )
            .unwrap_err();
        let err = decode_error(err);
        assert_eq!(
            err.reason,
            DecodeReason::UnknownToken {
                token: "rcp99".to_string()
            }
        );
        assert_eq!(err.attempted_lengths, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_suffix_matching_no_configuration() {
        let snapshot = snapshot();
        // Both tokens are admissible, but no configuration leaves exactly
        // time window and year period open.
        let err = FixedSchemaResolver::default()
            .resolve(
                &snapshot,
                CoverageCategory::Forecast,
                "forecast-tas-anomaly-30yr-arpa_vfvg-tw1-winter",
            )
            .unwrap_err();
        assert_eq!(
            decode_error(err).reason,
            DecodeReason::NoMatchingConfiguration
        );
    }

    #[test]
    fn test_unknown_indicator_and_region() {
        let snapshot = snapshot();
        let resolver = FixedSchemaResolver::default();
        assert!(matches!(
            resolver.resolve(
                &snapshot,
                CoverageCategory::Forecast,
                "forecast-tasmax-anomaly-annual-arpa_vfvg-rcp85-winter"
            ),
            Err(CoverageError::NotFound {
                kind: EntityKind::ClimaticIndicator,
                ..
            })
        ));
        assert!(matches!(
            resolver.resolve(
                &snapshot,
                CoverageCategory::Forecast,
                "forecast-tas-anomaly-annual-veneto-rcp85-winter"
            ),
            Err(CoverageError::NotFound {
                kind: EntityKind::SpatialRegion,
                ..
            })
        ));
    }

    #[test]
    fn test_category_token_must_match() {
        let snapshot = snapshot();
        let err = FixedSchemaResolver::default()
            .resolve(&snapshot, CoverageCategory::Historical, identifiers::FORECAST_PR_RCA4)
            .unwrap_err();
        assert!(matches!(
            decode_error(err).reason,
            DecodeReason::UnknownToken { .. }
        ));
    }

    #[test]
    fn test_prefix_only_ambiguity() {
        let yaml = r#"
dimensions:
  - name: year_period
    values: [{ name: all_year }]
indicators:
  - { name: tas, measure: absolute, aggregation_period: annual }
regions:
  - { name: arpa_vfvg }
configurations:
  - kind: fixed_schema
    name: first
    category: historical
    indicator: { name: tas, measure: absolute, aggregation_period: annual }
    region: arpa_vfvg
    year_periods: [all_year]
  - kind: fixed_schema
    name: second
    category: historical
    indicator: { name: tas, measure: absolute, aggregation_period: annual }
    region: arpa_vfvg
    year_periods: [all_year]
"#;
        let snapshot = CatalogSnapshot::from_yaml_str(yaml).unwrap();
        let err = FixedSchemaResolver::default()
            .resolve(
                &snapshot,
                CoverageCategory::Historical,
                "historical-tas-absolute-annual-arpa_vfvg",
            )
            .unwrap_err();
        assert_eq!(
            decode_error(err).reason,
            DecodeReason::Ambiguous {
                candidates: vec!["first".to_string(), "second".to_string()]
            }
        );
    }

    #[test]
    fn test_custom_strategy_order() {
        let snapshot = snapshot();
        // Without the single-token strategy one-token identifiers no longer resolve.
        let resolver = FixedSchemaResolver::new(vec![
            Box::new(OrderedSuffixStrategy::new(3)),
            Box::new(OrderedSuffixStrategy::new(2)),
            Box::new(PrefixOnlyStrategy),
        ]);
        let err = resolver
            .resolve(&snapshot, CoverageCategory::Forecast, identifiers::FORECAST_PR_RCA4)
            .unwrap_err();
        let err = decode_error(err);
        assert_eq!(err.reason, DecodeReason::NoMatchingConfiguration);
        assert_eq!(err.attempted_lengths, vec![3, 2, 0]);
        assert_eq!(
            format!("{:?}", resolver),
            "FixedSchemaResolver { strategies: [3, 2, 0] }"
        );
    }
}
