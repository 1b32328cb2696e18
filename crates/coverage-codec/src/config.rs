//! Codec configuration.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoverageResult;
use crate::snapshot::CatalogSnapshot;

/// Where the catalog snapshot comes from and how strictly it is checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Snapshot YAML file, or a directory of YAML files.
    pub catalog_path: PathBuf,

    /// Reject snapshots whose templates reference placeholders no coverage
    /// can resolve.
    pub strict_templates: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("config/catalog"),
            strict_templates: true,
        }
    }
}

impl CodecConfig {
    /// Load configuration from environment variables, reading `.env` if present.
    ///
    /// - `COVERAGE_CATALOG_PATH` (default `config/catalog`)
    /// - `COVERAGE_STRICT_TEMPLATES` (`true`/`false`, default `true`)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let catalog_path = env::var("COVERAGE_CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.catalog_path);

        let strict_templates = match env::var("COVERAGE_STRICT_TEMPLATES") {
            Ok(v) => v.parse::<bool>().map_err(|_| {
                anyhow::anyhow!("COVERAGE_STRICT_TEMPLATES must be true or false, got '{}'", v)
            })?,
            Err(_) => defaults.strict_templates,
        };

        Ok(Self {
            catalog_path,
            strict_templates,
        })
    }

    /// Load the snapshot this configuration points at.
    pub fn load_snapshot(&self) -> CoverageResult<Arc<CatalogSnapshot>> {
        let snapshot = CatalogSnapshot::load(&self.catalog_path)?;
        if self.strict_templates {
            snapshot.check_templates()?;
        } else if let Err(err) = snapshot.check_templates() {
            warn!(error = %err, "Catalog templates reference unresolvable placeholders");
        }
        Ok(Arc::new(snapshot))
    }
}
