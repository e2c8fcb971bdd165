//! Fixed-layout document model.
//!
//! Coordinates are millimetres from the top-left corner of the page. The PDF
//! writer flips them to the bottom-left origin PDF expects.

/// Average Helvetica glyph width as a fraction of the font size.
const AVERAGE_GLYPH_WIDTH: f32 = 0.5;

/// Millimetres per typographic point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Approximate width in millimetres of `glyphs` characters set at `size` points.
pub fn approx_text_width(glyphs: usize, size: f32) -> f32 {
    let glyphs = u16::try_from(glyphs).unwrap_or(u16::MAX);

    f32::from(glyphs) * size * AVERAGE_GLYPH_WIDTH * MM_PER_PT
}

/// Font weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    /// Regular body text.
    Regular,

    /// Bold text for titles, labels and totals.
    Bold,
}

/// Horizontal anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// `x` is the left edge.
    Left,

    /// `x` is the right edge.
    Right,
}

/// A single line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Anchor x position.
    pub x: f32,

    /// Baseline y position.
    pub y: f32,

    /// Font size in points.
    pub size: f32,

    /// Font weight.
    pub weight: FontWeight,

    /// Horizontal anchor.
    pub align: Align,

    /// Text content.
    pub content: String,
}

impl TextRun {
    /// Approximate rendered width in millimetres.
    pub fn approx_width_mm(&self) -> f32 {
        approx_text_width(self.content.chars().count(), self.size)
    }

    /// Left edge of the run once alignment is applied.
    pub fn left_x(&self) -> f32 {
        match self.align {
            Align::Left => self.x,
            Align::Right => self.x - self.approx_width_mm(),
        }
    }
}

/// A straight line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    /// Start point `(x, y)`.
    pub from: (f32, f32),

    /// End point `(x, y)`.
    pub to: (f32, f32),
}

/// Something drawn on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Text run.
    Text(TextRun),

    /// Line segment.
    Rule(Rule),
}

/// One page of the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    elements: Vec<Element>,
}

impl Page {
    /// Elements in draw order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Text runs in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text(text) => Some(text),
            Element::Rule(_) => None,
        })
    }

    /// Rules in draw order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.elements.iter().filter_map(|element| match element {
            Element::Rule(rule) => Some(rule),
            Element::Text(_) => None,
        })
    }

    /// Add a text run.
    pub fn text(
        &mut self,
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        align: Align,
        content: impl Into<String>,
    ) {
        self.elements.push(Element::Text(TextRun {
            x,
            y,
            size,
            weight,
            align,
            content: content.into(),
        }));
    }

    /// Add a horizontal rule from `x1` to `x2` at `y`.
    pub fn hrule(&mut self, x1: f32, x2: f32, y: f32) {
        self.elements.push(Element::Rule(Rule {
            from: (x1, y),
            to: (x2, y),
        }));
    }
}

/// A fixed-size multi-page document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    title: String,
    width_mm: f32,
    height_mm: f32,
    pages: Vec<Page>,
}

impl Document {
    /// Create a document with a single empty page.
    pub fn new(title: impl Into<String>, width_mm: f32, height_mm: f32) -> Self {
        Self {
            title: title.into(),
            width_mm,
            height_mm,
            pages: vec![Page::default()],
        }
    }

    /// Document title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Page width.
    pub fn width_mm(&self) -> f32 {
        self.width_mm
    }

    /// Page height.
    pub fn height_mm(&self) -> f32 {
        self.height_mm
    }

    /// Pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a new empty page.
    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
    }

    /// Add a text run to the last page.
    pub fn text(
        &mut self,
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        align: Align,
        content: impl Into<String>,
    ) {
        if let Some(page) = self.pages.last_mut() {
            page.text(x, y, size, weight, align, content);
        }
    }

    /// Add a horizontal rule to the last page.
    pub fn hrule(&mut self, x1: f32, x2: f32, y: f32) {
        if let Some(page) = self.pages.last_mut() {
            page.hrule(x1, x2, y);
        }
    }

    /// All text runs across all pages.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.pages.iter().flat_map(Page::texts)
    }

    /// Returns true if any text run contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text.content.contains(needle))
    }

    /// Number of text runs whose content equals `content` exactly.
    pub fn count_text(&self, content: &str) -> usize {
        self.texts().filter(|text| text.content == content).count()
    }
}
