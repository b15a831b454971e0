//! Render specs as exportable surfaces.

use super::{RasterImage, RenderSurface};
use crate::chart::{ChartKind, RenderSpec};
use crate::errors::{Error, Result};

const REGULAR_WIDTH: f64 = 800.0;
const COMPACT_WIDTH: f64 = 400.0;
const HEADER_HEIGHT: f64 = 80.0;
const ROW_HEIGHT: f64 = 28.0;
const FIXED_PLOT_HEIGHT: f64 = 320.0;
const EMPTY_STATE_HEIGHT: f64 = 120.0;

/// Exports a chart's render spec as a JSON image payload.
///
/// Sizing approximates what the chart would occupy on screen: tabular and
/// bar charts grow with their row count, the rest use a fixed plot area.
#[derive(Debug, Clone)]
pub struct SpecSurface {
    spec: RenderSpec,
    compact: bool,
}

impl SpecSurface {
    pub fn new(spec: RenderSpec, compact: bool) -> Self {
        Self { spec, compact }
    }

    fn height(&self) -> f64 {
        if self.spec.is_empty() {
            return EMPTY_STATE_HEIGHT;
        }
        let rows = self
            .spec
            .series
            .iter()
            .map(|s| s.points.len())
            .max()
            .unwrap_or(0) as f64;
        match self.spec.kind {
            ChartKind::Bar | ChartKind::StackedBar | ChartKind::Table => {
                HEADER_HEIGHT + rows * ROW_HEIGHT
            }
            ChartKind::Pie
            | ChartKind::Scatter
            | ChartKind::Map
            | ChartKind::Gauge => HEADER_HEIGHT + FIXED_PLOT_HEIGHT,
        }
    }
}

impl RenderSurface for SpecSurface {
    fn rasterize(&self) -> Result<RasterImage> {
        let data = serde_json::to_string(&self.spec)
            .map_err(|e| Error::Export(format!("cannot encode '{}': {e}", self.spec.title)))?;
        Ok(RasterImage {
            width: if self.compact {
                COMPACT_WIDTH
            } else {
                REGULAR_WIDTH
            },
            height: self.height(),
            format: "application/json".to_string(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{count_categorical, Aggregate};
    use crate::chart::{build, PresentationConfig};
    use crate::core::ResponseRecord;
    use crate::labels::CategoryTable;

    #[test]
    fn test_bar_height_grows_with_rows() {
        let records = vec![ResponseRecord::new("a").with_answer("Q", "1")];
        let table = CategoryTable::from_pairs([("1", "A"), ("2", "B"), ("3", "C")]);
        let aggregate = Aggregate::Categories(count_categorical(&records, "Q", &table));
        let spec = build(&aggregate, &PresentationConfig::new(ChartKind::Bar, "Q"));

        let image = SpecSurface::new(spec, false).rasterize().unwrap();
        assert_eq!(image.height, HEADER_HEIGHT + 3.0 * ROW_HEIGHT);
        assert_eq!(image.width, REGULAR_WIDTH);
        assert!(image.data.contains("\"title\":\"Q\""));
    }

    #[test]
    fn test_empty_spec_uses_placeholder_height() {
        let records: Vec<ResponseRecord> = Vec::new();
        let aggregate = Aggregate::Categories(count_categorical(&records, "Q", &CategoryTable::default()));
        let spec = build(&aggregate, &PresentationConfig::new(ChartKind::Pie, "Q"));

        let image = SpecSurface::new(spec, true).rasterize().unwrap();
        assert_eq!(image.height, EMPTY_STATE_HEIGHT);
        assert_eq!(image.width, COMPACT_WIDTH);
    }
}
