//! Page layout of the shopping-list document, independent of the PDF backend.
//!
//! All coordinates are PDF points with the origin at the bottom-left corner
//! of an A4 page.

use super::aggregator::ShoppingList;

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

const TOP: f32 = 800.0;
const BOTTOM_MARGIN: f32 = 40.0;
const LINE_STEP: f32 = 30.0;
const TITLE_X: f32 = 50.0;
const ITEM_X: f32 = 75.0;
const RULE_START_X: f32 = 50.0;
const RULE_END_X: f32 = 550.0;
const SIGNATURE_GAP: f32 = 10.0;
const FOOTER_SIZE_DELTA: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text { x: f32, y: f32, size: f32, text: String },
    Rule { x1: f32, x2: f32, y: f32 },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    /// All text drawn, in drawing order across pages.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.pages.iter().flat_map(|page| {
            page.ops.iter().filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Rule { .. } => None,
            })
        })
    }
}

pub fn signature(year: i32) -> String {
    format!("Thank you for using Foodgram Project © {year}")
}

pub fn item_line(index: usize, name: &str, amount: u64, measurement_unit: &str) -> String {
    format!("{index}. {name} - {amount} {measurement_unit}")
}

struct Cursor {
    pages: Vec<PageLayout>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
            y: TOP,
        }
    }

    /// Starts a new page when `needed` points below the cursor would cross the bottom margin.
    fn reserve(&mut self, needed: f32) {
        if self.y - needed < BOTTOM_MARGIN {
            self.pages.push(PageLayout::default());
            self.y = TOP;
        }
    }

    fn draw(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

/// Lays out the title, one numbered line per ingredient and the signature
/// footer, breaking onto new pages instead of running off the bottom edge.
pub fn layout_shopping_list(list: &ShoppingList, title: &str, font_size: f32, year: i32) -> DocumentLayout {
    let mut cursor = Cursor::new();

    cursor.draw(DrawOp::Text {
        x: TITLE_X,
        y: cursor.y,
        size: font_size,
        text: format!("{title}:"),
    });
    cursor.y -= LINE_STEP;

    for (index, item) in list.iter().enumerate() {
        cursor.reserve(0.0);
        cursor.draw(DrawOp::Text {
            x: ITEM_X,
            y: cursor.y,
            size: font_size,
            text: item_line(index + 1, &item.name, item.amount, &item.measurement_unit),
        });
        cursor.y -= LINE_STEP;
    }

    // Rule and signature stay together on one page.
    cursor.reserve(SIGNATURE_GAP);
    cursor.draw(DrawOp::Rule {
        x1: RULE_START_X,
        x2: RULE_END_X,
        y: cursor.y,
    });
    cursor.y -= SIGNATURE_GAP;
    cursor.draw(DrawOp::Text {
        x: TITLE_X,
        y: cursor.y,
        size: (font_size - FOOTER_SIZE_DELTA).max(1.0),
        text: signature(year),
    });

    DocumentLayout {
        title: title.to_string(),
        pages: cursor.pages,
    }
}
