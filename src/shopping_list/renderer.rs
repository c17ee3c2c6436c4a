//! PDF backend for the shopping-list layout.
//!
//! Fonts are read from the font directory on every render and embedded into
//! that one document only; nothing is registered process-wide.

use std::fs;
use std::path::{Path, PathBuf};

use printpdf::{IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use thiserror::Error;
use tracing::debug;

use super::aggregator::ShoppingList;
use super::layout::{layout_shopping_list, DocumentLayout, DrawOp, PageLayout, PAGE_HEIGHT, PAGE_WIDTH};

const LAYER_NAME: &str = "Layer 1";
const RULE_THICKNESS: f32 = 1.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to load font '{font}' from {}: {source}", .path.display())]
    FontLoad {
        font: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Font '{font}' could not be embedded: {message}")]
    FontEmbed { font: String, message: String },

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Directory holding `<name>.ttf` font files.
#[derive(Debug, Clone)]
pub struct FontSource {
    dir: PathBuf,
}

impl FontSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, font: &str) -> PathBuf {
        self.dir.join(format!("{font}.ttf"))
    }

    pub fn load(&self, font: &str) -> Result<Vec<u8>, RenderError> {
        let path = self.path_for(font);
        fs::read(&path).map_err(|source| RenderError::FontLoad {
            font: font.to_string(),
            path,
            source,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
    pub title: &'a str,
    pub font: &'a str,
    pub font_size: f32,
    pub year: i32,
}

fn pt_to_mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn draw_page(layer: &PdfLayerReference, page: &PageLayout, font: &IndirectFontRef) {
    for op in &page.ops {
        match op {
            DrawOp::Text { x, y, size, text } => {
                layer.use_text(text.as_str(), *size, pt_to_mm(*x), pt_to_mm(*y), font);
            }
            DrawOp::Rule { x1, x2, y } => {
                layer.set_outline_thickness(RULE_THICKNESS);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(pt_to_mm(*x1), pt_to_mm(*y)), false),
                        (Point::new(pt_to_mm(*x2), pt_to_mm(*y)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}

/// Writes a laid-out document to PDF bytes using the given TrueType font data.
pub fn render_pdf(layout: &DocumentLayout, font_name: &str, font_data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let width = pt_to_mm(PAGE_WIDTH);
    let height = pt_to_mm(PAGE_HEIGHT);
    let (doc, first_page, first_layer) = PdfDocument::new(layout.title.as_str(), width, height, LAYER_NAME);

    let font = doc
        .add_external_font(font_data)
        .map_err(|err| RenderError::FontEmbed {
            font: font_name.to_string(),
            message: format!("{err:?}"),
        })?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        draw_page(&layer, page, &font);
    }

    doc.save_to_bytes().map_err(|err| RenderError::Pdf(format!("{err:?}")))
}

/// Renders a shopping list to a complete PDF.
///
/// The font is loaded before anything is drawn; a missing or broken font
/// fails the whole render.
pub fn render_shopping_list(
    list: &ShoppingList,
    fonts: &FontSource,
    options: &RenderOptions<'_>,
) -> Result<Vec<u8>, RenderError> {
    let font_data = fonts.load(options.font)?;
    let layout = layout_shopping_list(list, options.title, options.font_size, options.year);
    debug!(
        "Rendering shopping list with {} items on {} page(s)",
        list.len(),
        layout.pages.len()
    );
    render_pdf(&layout, options.font, &font_data)
}
