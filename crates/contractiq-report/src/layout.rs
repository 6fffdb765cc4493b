//! Fixed-size page layout for blocks of text whose height is only known
//! after wrapping.
//!
//! A vertical cursor starts at the top margin. Each block is an optional
//! header followed by a body, both wrapped to the block's width. Before a
//! block is written the paginator checks that its content fits above the
//! bottom threshold and breaks the page if it does not. A block taller than a
//! whole page is split at line boundaries, but its header always travels with
//! at least the first body line.
//!
//! Text passes through [`wrap_text`], so the laid-out lines are the
//! whitespace-normalised input: runs of spaces and tabs inside a paragraph
//! become one space. Words and their order are kept exactly.

use serde::Serialize;
use tracing::debug;

use crate::wrap::wrap_text;

/// Page dimensions and spacing, in abstract layout units (millimetres for the
/// default A4 geometry).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub top_margin: f32,
    /// No line may extend below this y coordinate.
    pub bottom_threshold: f32,
    pub left_margin: f32,
    pub line_height: f32,
    pub block_gap: f32,
    /// Width of one character column, used to turn widths into columns.
    pub char_width: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            top_margin: 20.0,
            bottom_threshold: 270.0,
            left_margin: 20.0,
            line_height: 5.0,
            block_gap: 5.0,
            char_width: 2.0,
        }
    }
}

impl PageGeometry {
    /// Vertical space available for content on one page.
    pub fn usable_height(&self) -> f32 {
        self.bottom_threshold - self.top_margin
    }

    /// Number of character columns that fit in `width`.
    pub fn columns(&self, width: f32) -> usize {
        ((width / self.char_width).floor() as usize).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Title,
    Subtitle,
    Heading,
    BlockHeader,
    Body,
}

/// One unit of content to lay out.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub header: Option<String>,
    pub header_style: TextStyle,
    pub body: String,
    pub body_style: TextStyle,
    /// Absolute x of body lines.
    pub body_x: f32,
    /// Wrap width of header and body lines.
    pub width: f32,
    pub gap_after: f32,
    /// Refuse to end a page between this block and the next one's first line.
    pub keep_with_next: bool,
}

impl Block {
    pub fn new(body: impl Into<String>, geometry: &PageGeometry) -> Self {
        Self {
            header: None,
            header_style: TextStyle::BlockHeader,
            body: body.into(),
            body_style: TextStyle::Body,
            body_x: geometry.left_margin,
            width: geometry.page_width - 2.0 * geometry.left_margin,
            gap_after: geometry.block_gap,
            keep_with_next: false,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>, style: TextStyle) -> Self {
        self.header = Some(header.into());
        self.header_style = style;
        self
    }

    pub fn body_style(mut self, style: TextStyle) -> Self {
        self.body_style = style;
        self
    }

    pub fn at(mut self, x: f32, width: f32) -> Self {
        self.body_x = x;
        self.width = width;
        self
    }

    pub fn gap(mut self, gap_after: f32) -> Self {
        self.gap_after = gap_after;
        self
    }

    pub fn keep_with_next(mut self) -> Self {
        self.keep_with_next = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub runs: Vec<TextRun>,
}

impl Page {
    fn new(number: usize) -> Self {
        Self {
            number,
            runs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.runs.iter().map(|r| r.text.as_str())
    }
}

/// A block after wrapping, ready to be placed.
struct Measured<'a> {
    block: &'a Block,
    header: Vec<String>,
    lines: Vec<String>,
}

impl Measured<'_> {
    fn header_lines(&self) -> usize {
        self.header.len()
    }

    /// Height of header plus body, excluding the trailing gap.
    fn content_height(&self, lh: f32) -> f32 {
        (self.header_lines() + self.lines.len()) as f32 * lh
    }

    /// Height that must stay together at the start of the block.
    fn lead_height(&self, lh: f32) -> f32 {
        (self.header_lines() + self.lines.len().min(1)) as f32 * lh
    }
}

/// Lays blocks out onto pages. Identical input always yields identical pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator {
    geometry: PageGeometry,
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
    top: f32,
}

impl Cursor {
    fn page(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn fresh(&self) -> bool {
        self.pages.last().is_none_or(Page::is_empty)
    }

    fn break_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(Page::new(number));
        self.y = self.top;
    }

    fn write(&mut self, x: f32, text: &str, style: TextStyle, lh: f32) {
        let y = self.y;
        self.page().runs.push(TextRun {
            x,
            y,
            text: text.to_string(),
            style,
        });
        self.y += lh;
    }
}

impl Paginator {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn paginate(&self, blocks: &[Block]) -> Vec<Page> {
        let g = &self.geometry;
        let lh = g.line_height;
        let usable = g.usable_height();

        let measured: Vec<Measured<'_>> = blocks
            .iter()
            .map(|block| {
                let columns = g.columns(block.width);
                Measured {
                    block,
                    header: block
                        .header
                        .as_deref()
                        .map(|h| wrap_text(h, columns))
                        .unwrap_or_default(),
                    lines: wrap_text(&block.body, columns),
                }
            })
            .filter(|m| m.header_lines() + m.lines.len() > 0)
            .collect();

        let mut cursor = Cursor {
            pages: vec![Page::new(1)],
            y: g.top_margin,
            top: g.top_margin,
        };

        for (i, m) in measured.iter().enumerate() {
            let content = m.content_height(lh);
            let mut needed = if content <= usable {
                content
            } else {
                m.lead_height(lh)
            };
            if m.block.keep_with_next
                && let Some(next) = measured.get(i + 1)
            {
                needed += m.block.gap_after + next.lead_height(lh);
            }

            let overflow =
                cursor.y > g.bottom_threshold || cursor.y + needed > g.bottom_threshold;
            if overflow && !cursor.fresh() {
                debug!(block = i, y = cursor.y, needed, "page break before block");
                cursor.break_page();
            }

            for header in &m.header {
                cursor.write(g.left_margin, header, m.block.header_style, lh);
            }
            for line in &m.lines {
                if cursor.y + lh > g.bottom_threshold && !cursor.fresh() {
                    debug!(block = i, "splitting block across pages");
                    cursor.break_page();
                }
                cursor.write(m.block.body_x, line, m.block.body_style, lh);
            }
            cursor.y += m.block.gap_after;
        }

        cursor.pages
    }
}
