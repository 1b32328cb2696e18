//! Catalog snapshot loader.
//!
//! Reads a snapshot from YAML: dimensions with their values, climatic
//! indicators, spatial regions and configurations. Supports environment
//! variable substitution using `${VAR}` and `${VAR:-default}` syntax.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::catalog::{ClimaticIndicator, Dimension, DimensionCatalog, SpatialRegion, Value};
use crate::configuration::Configuration;
use crate::error::CoverageResult;
use crate::snapshot::CatalogSnapshot;

// ============================================================================
// File layout
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub dimensions: Vec<DimensionEntry>,
    #[serde(default)]
    pub indicators: Vec<ClimaticIndicator>,
    #[serde(default)]
    pub regions: Vec<SpatialRegion>,
    #[serde(default)]
    pub configurations: Vec<Configuration>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DimensionEntry {
    pub name: String,
    pub values: Vec<ValueEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValueEntry {
    pub name: String,
    /// Defaults to `name`.
    #[serde(default)]
    pub internal_value: Option<String>,
    /// Defaults to the declaration index.
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl SnapshotFile {
    /// Validate and turn the file contents into a snapshot.
    pub fn into_snapshot(self) -> CoverageResult<CatalogSnapshot> {
        let mut dimensions = Vec::with_capacity(self.dimensions.len());
        for entry in self.dimensions {
            let values = entry
                .values
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    let internal = v.internal_value.unwrap_or_else(|| v.name.clone());
                    Value::new(v.name, internal, v.sort_order.unwrap_or(i as i32))
                })
                .collect();
            dimensions.push(Dimension::new(entry.name, values)?);
        }

        CatalogSnapshot::new(
            DimensionCatalog::new(dimensions)?,
            self.indicators,
            self.regions,
            self.configurations,
        )
    }
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Parse snapshot YAML after environment variable substitution.
pub fn parse_snapshot_file(content: &str) -> Result<SnapshotFile> {
    let expanded = substitute_env(content)?;
    let file: SnapshotFile =
        serde_yaml::from_str(&expanded).with_context(|| "Failed to parse catalog snapshot YAML")?;

    anyhow::ensure!(
        !file.dimensions.is_empty(),
        "Catalog snapshot declares no dimensions"
    );
    Ok(file)
}

/// Read and parse a snapshot YAML file.
pub fn read_snapshot_file<P: AsRef<Path>>(path: P) -> Result<SnapshotFile> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read catalog snapshot from {:?}", path.as_ref()))?;
    parse_snapshot_file(&content)
        .with_context(|| format!("Invalid catalog snapshot in {:?}", path.as_ref()))
}

/// Read every `.yaml`/`.yml` file in `dir` and merge them, in file name order.
pub fn read_snapshot_dir<P: AsRef<Path>>(dir: P) -> Result<SnapshotFile> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))? {
        let path = entry?.path();
        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            paths.push(path);
        }
    }
    paths.sort();
    anyhow::ensure!(!paths.is_empty(), "No catalog snapshot files in {:?}", dir);

    let mut merged = SnapshotFile {
        dimensions: Vec::new(),
        indicators: Vec::new(),
        regions: Vec::new(),
        configurations: Vec::new(),
    };
    for path in paths {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog snapshot from {:?}", path))?;
        let expanded = substitute_env(&content)?;
        let part: SnapshotFile = serde_yaml::from_str(&expanded)
            .with_context(|| format!("Failed to parse catalog snapshot {:?}", path))?;
        merged.dimensions.extend(part.dimensions);
        merged.indicators.extend(part.indicators);
        merged.regions.extend(part.regions);
        merged.configurations.extend(part.configurations);
    }
    anyhow::ensure!(
        !merged.dimensions.is_empty(),
        "Catalog snapshot declares no dimensions"
    );
    Ok(merged)
}

impl CatalogSnapshot {
    /// Build a snapshot from YAML text.
    pub fn from_yaml_str(content: &str) -> CoverageResult<Self> {
        parse_snapshot_file(content)?.into_snapshot()
    }

    /// Load a snapshot from a YAML file, or from every YAML file of a directory.
    pub fn load<P: AsRef<Path>>(path: P) -> CoverageResult<Self> {
        let file = if path.as_ref().is_dir() {
            read_snapshot_dir(path.as_ref())?
        } else {
            read_snapshot_file(path.as_ref())?
        };
        let snapshot = file.into_snapshot()?;
        info!(
            path = %path.as_ref().display(),
            configurations = snapshot.configurations().len(),
            "Loaded catalog snapshot"
        );
        Ok(snapshot)
    }
}

// ============================================================================
// Environment references in catalog files
// ============================================================================

/// Replace `${VAR}` and `${VAR:-fallback}` references in catalog text.
///
/// Storage roots differ between deployments, so catalog templates usually
/// start with a reference such as `${COVERAGE_DATA_ROOT:-/srv/data}`. Template
/// placeholders like `{scenario}` carry no `$` and pass through untouched.
fn substitute_env(content: &str) -> Result<String> {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let reference = &rest[start + 2..];
        let end = closing_brace(reference)
            .with_context(|| format!("Unclosed environment reference in catalog: ${{{}", reference))?;
        out.push_str(&env_reference(&reference[..end])?);
        rest = &reference[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Offset of the brace closing a reference; fallbacks may nest braces.
fn closing_brace(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Value of one reference. An empty variable falls back like an unset one.
fn env_reference(reference: &str) -> Result<String> {
    match reference.split_once(":-") {
        Some((name, fallback)) => Ok(std::env::var(name.trim())
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| fallback.to_string())),
        None => std::env::var(reference.trim()).with_context(|| {
            format!(
                "Catalog references environment variable {} which is not set",
                reference.trim()
            )
        }),
    }
}
