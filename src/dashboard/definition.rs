//! Dashboard definition files.
//!
//! A definition bundles the static lookup tables with the list of charts to
//! compute. It is loaded once at startup and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::aggregation::AggregationShape;
use crate::chart::PresentationConfig;
use crate::errors::{Error, Result};
use crate::labels::StaticTables;

/// One chart: what to aggregate and how to present it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDefinition {
    pub id: String,
    pub shape: AggregationShape,
    pub presentation: PresentationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDefinition {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub tables: StaticTables,
    #[serde(default)]
    pub charts: Vec<ChartDefinition>,
}

impl Default for DashboardDefinition {
    fn default() -> Self {
        Self {
            title: default_title(),
            tables: StaticTables::default(),
            charts: Vec::new(),
        }
    }
}

fn default_title() -> String {
    "Survey results".to_string()
}

impl DashboardDefinition {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let definition: Self = toml::from_str(contents)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(
                format!("cannot read dashboard {}: {e}", path.display()),
                Some(path.to_path_buf()),
            )
        })?;
        let definition = Self::from_toml_str(&contents).map_err(|e| {
            Error::configuration(
                format!("invalid dashboard {}: {e}", path.display()),
                Some(path.to_path_buf()),
            )
        })?;
        log::info!(
            "Loaded dashboard '{}' with {} chart(s)",
            definition.title,
            definition.charts.len()
        );
        Ok(definition)
    }

    /// Ids must be unique and every shape structurally sound.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for chart in &self.charts {
            if chart.id.trim().is_empty() {
                return Err(Error::Validation("chart id must not be empty".to_string()));
            }
            if !seen.insert(chart.id.as_str()) {
                return Err(Error::Validation(format!(
                    "duplicate chart id '{}'",
                    chart.id
                )));
            }
            chart
                .shape
                .validate()
                .map_err(|e| Error::Validation(format!("chart '{}': {e}", chart.id)))?;
        }
        Ok(())
    }

    pub fn chart(&self, id: &str) -> Option<&ChartDefinition> {
        self.charts.iter().find(|c| c.id == id)
    }
}
