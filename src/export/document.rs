//! Export document and vertical pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use super::{PageLayout, RasterImage};
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedImage {
    pub id: String,
    /// Top edge on the page
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub format: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub number: usize,
    pub images: Vec<PlacedImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub title: String,
    pub generated: DateTime<Utc>,
    pub pages: Vec<Page>,
}

impl ExportDocument {
    pub fn image_count(&self) -> usize {
        self.pages.iter().map(|p| p.images.len()).sum()
    }

    pub fn write_json<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Stack images top to bottom, starting a new page when the next one does
/// not fit. Images taller than the usable height are scaled down to fit.
pub(crate) fn paginate(
    title: &str,
    images: Vec<(String, RasterImage)>,
    layout: &PageLayout,
    generated: DateTime<Utc>,
) -> ExportDocument {
    let usable = layout.usable_height();
    let bottom = layout.margin + usable;
    let mut pages: Vec<Page> = Vec::new();
    let mut cursor = layout.margin;

    for (id, image) in images {
        let scale = if image.height > usable {
            usable / image.height
        } else {
            1.0
        };
        let height = image.height * scale;
        let width = image.width * scale;

        let needs_page = match pages.last() {
            None => true,
            Some(page) => !page.images.is_empty() && cursor + height > bottom,
        };
        if needs_page {
            pages.push(Page {
                number: pages.len() + 1,
                images: Vec::new(),
            });
            cursor = layout.margin;
        }

        if let Some(page) = pages.last_mut() {
            page.images.push(PlacedImage {
                id,
                y: cursor,
                width,
                height,
                format: image.format,
                data: image.data,
            });
        }
        cursor += height + layout.gap;
    }

    ExportDocument {
        title: title.to_string(),
        generated,
        pages,
    }
}
