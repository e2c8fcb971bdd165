//! PDF output
//!
//! Serialises a laid-out [`Document`] with the built-in Helvetica faces, so no
//! font files need to ship with the crate.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
};
use thiserror::Error;

use crate::invoice::document::{Document, Element, FontWeight, Rule, TextRun};

/// Stroke width for table rules, in points.
const RULE_THICKNESS_PT: f32 = 0.4;

/// Errors raised while writing a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The PDF library rejected the document.
    #[error("failed to build PDF: {0}")]
    Build(#[from] printpdf::Error),

    /// The output buffer could not be flushed.
    #[error("failed to flush PDF output: {0}")]
    Io(#[from] std::io::Error),
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Write `document` as PDF bytes.
///
/// # Errors
///
/// Returns a [`PdfError`] if the fonts cannot be registered or the document
/// cannot be serialised.
pub fn write_pdf(document: &Document) -> Result<Vec<u8>, PdfError> {
    let (width, height) = (Mm(document.width_mm()), Mm(document.height_mm()));
    let (pdf, first_page, first_layer) =
        PdfDocument::new(document.title(), width, height, "Invoice");

    let fonts = Fonts {
        regular: pdf.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: pdf.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };

    for (idx, page) in document.pages().iter().enumerate() {
        let layer = if idx == 0 {
            pdf.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = pdf.add_page(width, height, "Invoice");

            pdf.get_page(page).get_layer(layer)
        };

        layer.set_outline_thickness(RULE_THICKNESS_PT);

        for element in page.elements() {
            match element {
                Element::Text(text) => draw_text(&layer, &fonts, text, document.height_mm()),
                Element::Rule(rule) => draw_rule(&layer, rule, document.height_mm()),
            }
        }
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    pdf.save(&mut writer)?;

    writer
        .into_inner()
        .map_err(|err| PdfError::Io(err.into_error()))
}

/// Document coordinates grow downwards; PDF coordinates grow upwards.
fn draw_text(layer: &PdfLayerReference, fonts: &Fonts, text: &TextRun, page_height: f32) {
    layer.use_text(
        text.content.as_str(),
        text.size,
        Mm(text.left_x()),
        Mm(page_height - text.y),
        fonts.get(text.weight),
    );
}

fn draw_rule(layer: &PdfLayerReference, rule: &Rule, page_height: f32) {
    let (x1, y1) = rule.from;
    let (x2, y2) = rule.to;

    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(page_height - y1)), false),
            (Point::new(Mm(x2), Mm(page_height - y2)), false),
        ],
        is_closed: false,
    });
}
