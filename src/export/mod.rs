//! Batch export of rendered chart surfaces.
//!
//! Surfaces register under an id and are rasterized together into one
//! paginated document. A surface that fails to rasterize is logged and
//! skipped; the rest of the export still completes.

pub mod document;
pub mod surface;

pub use document::{ExportDocument, Page, PlacedImage};
pub use surface::SpecSurface;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Rasterized output of one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterImage {
    pub width: f64,
    pub height: f64,
    /// Media type of `data`
    pub format: String,
    pub data: String,
}

/// Anything that can be turned into an image for export.
pub trait RenderSurface {
    fn rasterize(&self) -> Result<RasterImage>;
}

/// Vertical page geometry, in the same units as [`RasterImage::height`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub page_height: f64,
    pub margin: f64,
    pub gap: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_height: 1120.0,
            margin: 40.0,
            gap: 16.0,
        }
    }
}

impl PageLayout {
    pub fn usable_height(&self) -> f64 {
        (self.page_height - 2.0 * self.margin).max(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFailure {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<ExportFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub document: ExportDocument,
    pub summary: ExportSummary,
}

/// Registered render surfaces, kept in registration order.
#[derive(Default)]
pub struct ExportRegistry {
    surfaces: Vec<(String, Box<dyn RenderSurface>)>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface, replacing any surface already under `id`.
    pub fn register(&mut self, id: impl Into<String>, surface: Box<dyn RenderSurface>) {
        let id = id.into();
        match self.surfaces.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = surface,
            None => self.surfaces.push((id, surface)),
        }
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.surfaces.len();
        self.surfaces.retain(|(existing, _)| existing != id);
        self.surfaces.len() != before
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.surfaces.iter().map(|(id, _)| id.as_str())
    }

    /// Rasterize every registered surface and lay them out on pages.
    pub fn export_all(
        &self,
        title: &str,
        layout: &PageLayout,
        generated: DateTime<Utc>,
    ) -> ExportOutcome {
        let mut summary = ExportSummary::default();
        let mut images = Vec::new();

        for (id, surface) in &self.surfaces {
            summary.attempted += 1;
            match surface.rasterize() {
                Ok(image) => {
                    summary.succeeded += 1;
                    images.push((id.clone(), image));
                }
                Err(e) => {
                    log::warn!("Skipping surface '{}' in export: {}", id, e);
                    summary.failures.push(ExportFailure {
                        id: id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Exported {}/{} surfaces",
            summary.succeeded,
            summary.attempted
        );

        ExportOutcome {
            document: document::paginate(title, images, layout, generated),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    struct FixedSurface(f64);

    impl RenderSurface for FixedSurface {
        fn rasterize(&self) -> Result<RasterImage> {
            Ok(RasterImage {
                width: 800.0,
                height: self.0,
                format: "image/png".into(),
                data: String::new(),
            })
        }
    }

    struct BrokenSurface;

    impl RenderSurface for BrokenSurface {
        fn rasterize(&self) -> Result<RasterImage> {
            Err(Error::Export("canvas unavailable".into()))
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_failed_surface_does_not_abort_export() {
        let mut registry = ExportRegistry::new();
        registry.register("a", Box::new(FixedSurface(200.0)));
        registry.register("b", Box::new(BrokenSurface));
        registry.register("c", Box::new(FixedSurface(200.0)));

        let outcome = registry.export_all("Survey", &PageLayout::default(), now());

        assert_eq!(outcome.summary.attempted, 3);
        assert_eq!(outcome.summary.succeeded, 2);
        assert_eq!(outcome.summary.failures[0].id, "b");
        assert_eq!(outcome.document.image_count(), 2);
    }

    #[test]
    fn test_register_replaces_and_unregister_removes() {
        let mut registry = ExportRegistry::new();
        registry.register("a", Box::new(BrokenSurface));
        registry.register("a", Box::new(FixedSurface(100.0)));
        assert_eq!(registry.len(), 1);

        let outcome = registry.export_all("Survey", &PageLayout::default(), now());
        assert_eq!(outcome.summary.succeeded, 1);

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_registry_exports_empty_document() {
        let outcome = ExportRegistry::new().export_all("Survey", &PageLayout::default(), now());
        assert_eq!(outcome.summary, ExportSummary::default());
        assert!(outcome.document.pages.is_empty());
    }
}
