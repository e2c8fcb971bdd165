//! Invoice paginator
//!
//! Lays a priced order out on A4 pages split into two half-invoice regions. Each
//! half is independently headed and walks through the states
//! `Empty -> HeaderDrawn -> RowsFilling -> TotalsDrawn -> Closed`.
//!
//! Before every item row the paginator checks that the row plus the reserved
//! footer block still fits. If it doesn't, the current half gets its totals block
//! and the next half (bottom of the page, or top of a new page) is opened.
//!
//! ```rust,no_run
//! use papyrus::{config::InvoiceConfig, invoice::InvoiceRenderer, observer::TracingObserver};
//! # use papyrus::fixtures::Fixture;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let fixture = Fixture::from_set("standard")?;
//! # let order = fixture.order()?;
//! # let customers = fixture.customers();
//!
//! let renderer = InvoiceRenderer::new(InvoiceConfig::default());
//! let pdf = renderer.render_invoice_for(&order, customers, &mut TracingObserver)?;
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

use crate::{
    config::{InvoiceConfig, LayoutConfig},
    customers::{Customer, CustomerFetchError, CustomerSource},
    items::LineItem,
    observer::Observer,
    orders::{Order, OrderError, OrderTotals},
    pdf::{PdfError, write_pdf},
    pricing::{PriceCalculator, PricedItem, format_amount},
};

pub mod columns;
pub mod cursor;
pub mod document;

use columns::{Column, ColumnLayout};
use cursor::PageLayoutCursor;
use document::{Align, Document, FontWeight, approx_text_width};

/// Smallest row height the paginator accepts.
const MIN_ROW_HEIGHT_MM: f32 = 1.0;

/// Gap between a row's top edge and its text baseline, relative to the row height.
const BASELINE_OFFSET: f32 = 0.7;

/// Largest page side a PDF viewer has to accept (14 400 pt).
const MAX_PAGE_SIDE_MM: f32 = 5080.0;

/// Vertical step between stacked lines of body text.
const LINE_STEP_MM: f32 = 4.0;

/// Room left below the last baseline of a block for descenders.
const TEXT_DESCENT_MM: f32 = 2.0;

/// Baseline of the "Bill to" line, from the top of the half.
const CUSTOMER_BLOCK_OFFSET_MM: f32 = 23.0;

/// Signature rules, from the top of the footer block; labels sit one line below.
const SIGNATURE_RULE_OFFSET_MM: f32 = 36.0;

/// Header block height needed for the customer name and contact lines.
const MIN_HEADER_HEIGHT_MM: f32 = CUSTOMER_BLOCK_OFFSET_MM + 2.0 * LINE_STEP_MM + TEXT_DESCENT_MM;

/// Footer block height needed for the signature labels.
const MIN_FOOTER_HEIGHT_MM: f32 = SIGNATURE_RULE_OFFSET_MM + LINE_STEP_MM + TEXT_DESCENT_MM;

/// Text shown in place of item rows when an order has none.
pub const NO_ITEMS_PLACEHOLDER: &str = "No items on this order";

/// Errors that can occur while rendering an invoice.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Order totals could not be computed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The customer could not be fetched; nothing was rendered.
    #[error("failed to fetch customer: {0}")]
    CustomerFetch(#[from] CustomerFetchError),

    /// The configured geometry leaves no room for a single item row.
    #[error("layout leaves no room for item rows (row height {row_height_mm} mm)")]
    LayoutTooSmall {
        /// Configured row height.
        row_height_mm: f32,
    },

    /// A layout dimension cannot hold what is drawn in it.
    #[error("invalid layout: {field} = {value} ({reason})")]
    InvalidLayout {
        /// Name of the offending [`LayoutConfig`] field.
        field: &'static str,
        /// Configured value.
        value: f32,
        /// Constraint that was violated.
        reason: String,
    },

    /// PDF serialisation failed.
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

/// Lifecycle of one half-invoice region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfState {
    /// Nothing drawn yet.
    Empty,

    /// Company, invoice and customer blocks drawn.
    HeaderDrawn,

    /// Column header drawn; item rows being added.
    RowsFilling,

    /// Subtotal, discount, total, warranty and signatures drawn.
    TotalsDrawn,

    /// Finished.
    Closed,
}

impl HalfState {
    fn can_advance_to(self, next: HalfState) -> bool {
        matches!(
            (self, next),
            (HalfState::Empty, HalfState::HeaderDrawn)
                | (HalfState::HeaderDrawn, HalfState::RowsFilling)
                | (HalfState::RowsFilling, HalfState::TotalsDrawn)
                | (HalfState::TotalsDrawn, HalfState::Closed)
        )
    }
}

/// Invoice renderer
#[derive(Debug, Clone, Default)]
pub struct InvoiceRenderer {
    config: InvoiceConfig,
    calculator: PriceCalculator,
}

impl InvoiceRenderer {
    /// Create a renderer; items are priced under `config.pricing`.
    pub fn new(config: InvoiceConfig) -> Self {
        let calculator = PriceCalculator::new(config.pricing);

        Self { config, calculator }
    }

    /// Configuration in use.
    pub fn config(&self) -> &InvoiceConfig {
        &self.config
    }

    /// Number of item rows that fit in one half-invoice.
    ///
    /// # Errors
    ///
    /// - [`InvoiceError::InvalidLayout`] if a dimension is not finite, is negative, or
    ///   leaves the header or footer too short for its text.
    /// - [`InvoiceError::LayoutTooSmall`] if not even one row fits.
    pub fn rows_per_half(&self) -> Result<usize, InvoiceError> {
        let layout = &self.config.layout;

        check_layout(layout)?;

        let too_small = InvoiceError::LayoutTooSmall {
            row_height_mm: layout.row_height_mm,
        };

        if !layout.row_height_mm.is_finite() || layout.row_height_mm < MIN_ROW_HEIGHT_MM {
            return Err(too_small);
        }

        let mut cursor = PageLayoutCursor::new(layout);
        cursor.advance(layout.header_height_mm + layout.table_header_height_mm);

        let mut rows = 0;

        while cursor.fits(layout.row_height_mm, layout.footer_height_mm) {
            rows += 1;
            cursor.advance(layout.row_height_mm);
        }

        if rows == 0 { Err(too_small) } else { Ok(rows) }
    }

    /// Lay out `order` for `customer`.
    ///
    /// An order without items still renders: one half with the header, an empty
    /// table, a placeholder line and a single total line using the stored total.
    ///
    /// # Errors
    ///
    /// - [`InvoiceError::Order`] if the order totals cannot be computed.
    /// - [`InvoiceError::InvalidLayout`] / [`InvoiceError::LayoutTooSmall`] if the
    ///   configured geometry is unusable.
    pub fn render(
        &self,
        order: &Order<'_>,
        customer: &Customer,
        observer: &mut dyn Observer,
    ) -> Result<Document, InvoiceError> {
        let totals = order.totals(&self.calculator, observer)?;
        let capacity = self.rows_per_half()?;
        let sheets = order.items().len().div_ceil(capacity).max(1);

        let mut pass = LayoutPass::new(self, order, customer, &totals, sheets, observer);

        pass.open_half();

        if order.items().is_empty() {
            pass.draw_placeholder();
            pass.draw_total_only(order.stored_total().unwrap_or(totals.total()).to_string());
        } else {
            for (idx, (item, priced)) in order
                .items()
                .iter()
                .zip(totals.priced_items())
                .enumerate()
            {
                if !pass.row_fits() {
                    pass.overflow(idx);
                }

                pass.draw_row(item, priced);
            }

            pass.draw_totals();
        }

        Ok(pass.finish())
    }

    /// Lay out `order` and serialise it to PDF bytes.
    ///
    /// # Errors
    ///
    /// See [`InvoiceRenderer::render`]; additionally [`InvoiceError::Pdf`] if the
    /// document cannot be written.
    pub fn render_pdf(
        &self,
        order: &Order<'_>,
        customer: &Customer,
        observer: &mut dyn Observer,
    ) -> Result<Vec<u8>, InvoiceError> {
        let document = self.render(order, customer, observer)?;

        Ok(write_pdf(&document)?)
    }

    /// Fetch the order's customer from `source`, then render the PDF.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::CustomerFetch`] without rendering anything if the
    /// customer cannot be fetched; otherwise see [`InvoiceRenderer::render_pdf`].
    pub fn render_invoice_for(
        &self,
        order: &Order<'_>,
        source: &dyn CustomerSource,
        observer: &mut dyn Observer,
    ) -> Result<Vec<u8>, InvoiceError> {
        let customer = source.fetch(order.customer_id())?;

        self.render_pdf(order, &customer, observer)
    }
}

/// Reject geometry the paginator cannot draw into.
fn check_layout(layout: &LayoutConfig) -> Result<(), InvoiceError> {
    let invalid = |field, value, reason: String| InvoiceError::InvalidLayout {
        field,
        value,
        reason,
    };

    let sizes = [
        ("page_width_mm", layout.page_width_mm),
        ("page_height_mm", layout.page_height_mm),
        ("font_size_pt", layout.font_size_pt),
        ("title_font_size_pt", layout.title_font_size_pt),
    ];
    let blocks = [
        ("margin_mm", layout.margin_mm),
        ("header_height_mm", layout.header_height_mm),
        ("table_header_height_mm", layout.table_header_height_mm),
        ("row_height_mm", layout.row_height_mm),
        ("footer_height_mm", layout.footer_height_mm),
    ];

    for (field, value) in sizes.into_iter().chain(blocks) {
        if !value.is_finite() {
            return Err(invalid(field, value, String::from("must be finite")));
        }
    }

    for (field, value) in sizes {
        if value <= 0.0 {
            return Err(invalid(field, value, String::from("must be positive")));
        }
    }

    for (field, value) in [
        ("page_width_mm", layout.page_width_mm),
        ("page_height_mm", layout.page_height_mm),
    ] {
        if value > MAX_PAGE_SIDE_MM {
            return Err(invalid(
                field,
                value,
                format!("must be at most {MAX_PAGE_SIDE_MM} mm"),
            ));
        }
    }

    for (field, value) in blocks {
        if value < 0.0 {
            return Err(invalid(field, value, String::from("must not be negative")));
        }
    }

    if layout.table_width_mm() <= 0.0 {
        return Err(invalid(
            "margin_mm",
            layout.margin_mm,
            String::from("leaves no width for the item table"),
        ));
    }

    for (field, value, minimum) in [
        ("header_height_mm", layout.header_height_mm, MIN_HEADER_HEIGHT_MM),
        ("footer_height_mm", layout.footer_height_mm, MIN_FOOTER_HEIGHT_MM),
    ] {
        if value < minimum {
            return Err(invalid(
                field,
                value,
                format!("must be at least {minimum} mm"),
            ));
        }
    }

    Ok(())
}

/// Bookkeeping for the half currently being filled.
#[derive(Debug)]
struct HalfRegion {
    page: usize,
    half: cursor::Half,
    state: HalfState,
    rows: usize,
}

impl HalfRegion {
    fn advance(&mut self, next: HalfState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid half-invoice transition {:?} -> {:?}",
            self.state,
            next
        );

        self.state = next;
    }
}

/// State for a single render: the document being built and where we are in it.
struct LayoutPass<'r, 'o, 'a> {
    config: &'r InvoiceConfig,
    order: &'r Order<'a>,
    customer: &'r Customer,
    totals: &'r OrderTotals<'a>,
    observer: &'o mut dyn Observer,
    document: Document,
    cursor: PageLayoutCursor,
    region: HalfRegion,
    columns: ColumnLayout,
    sheet: usize,
    sheets: usize,
}

impl<'r, 'o, 'a> LayoutPass<'r, 'o, 'a> {
    fn new(
        renderer: &'r InvoiceRenderer,
        order: &'r Order<'a>,
        customer: &'r Customer,
        totals: &'r OrderTotals<'a>,
        sheets: usize,
        observer: &'o mut dyn Observer,
    ) -> Self {
        let layout = &renderer.config.layout;
        let cursor = PageLayoutCursor::new(layout);

        Self {
            config: &renderer.config,
            order,
            customer,
            totals,
            observer,
            document: Document::new(order.number(), layout.page_width_mm, layout.page_height_mm),
            cursor,
            region: HalfRegion {
                page: cursor.page(),
                half: cursor.half(),
                state: HalfState::Empty,
                rows: 0,
            },
            columns: ColumnLayout::allocate(layout.margin_mm, layout.table_width_mm()),
            sheet: 0,
            sheets,
        }
    }

    fn layout(&self) -> &LayoutConfig {
        &self.config.layout
    }

    fn left(&self) -> f32 {
        self.layout().margin_mm
    }

    fn right(&self) -> f32 {
        self.layout().page_width_mm - self.layout().margin_mm
    }

    /// `Empty -> HeaderDrawn -> RowsFilling` for the half under the cursor.
    fn open_half(&mut self) {
        self.sheet += 1;
        self.region = HalfRegion {
            page: self.cursor.page(),
            half: self.cursor.half(),
            state: HalfState::Empty,
            rows: 0,
        };
        self.observer
            .on_half_opened(self.region.page, self.region.half);

        self.draw_header();
        self.region.advance(HalfState::HeaderDrawn);

        self.columns = self.draw_table_header();
        self.region.advance(HalfState::RowsFilling);
    }

    fn draw_header(&mut self) {
        let layout = *self.layout();
        let (left, right) = (self.left(), self.right());
        let size = layout.font_size_pt;
        let top = self.cursor.y();
        let company = &self.config.company;

        let mut y = top + 5.0;
        self.document.text(
            left,
            y,
            layout.title_font_size_pt,
            FontWeight::Bold,
            Align::Left,
            &company.name,
        );

        for line in company.address.iter().take(2) {
            y += LINE_STEP_MM;
            self.document
                .text(left, y, size, FontWeight::Regular, Align::Left, line);
        }

        if let Some(phone) = &company.phone {
            y += LINE_STEP_MM;
            self.document.text(
                left,
                y,
                size,
                FontWeight::Regular,
                Align::Left,
                format!("Tel. {phone}"),
            );
        }

        let invoice_lines = [
            format!("No. {}", self.order.number()),
            format!("Date: {}", self.order.issued_on().strftime("%d %b %Y")),
            format!("Sheet {} of {}", self.sheet, self.sheets),
        ];

        self.document.text(
            right,
            top + 5.0,
            layout.title_font_size_pt,
            FontWeight::Bold,
            Align::Right,
            "INVOICE",
        );

        let mut y = top + 5.0;

        for line in invoice_lines {
            y += 4.5;
            self.document
                .text(right, y, size, FontWeight::Regular, Align::Right, line);
        }

        let customer_top = top + CUSTOMER_BLOCK_OFFSET_MM;
        let contact = [self.customer.address.as_deref(), self.customer.phone.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ");

        self.document.text(
            left,
            customer_top,
            size,
            FontWeight::Bold,
            Align::Left,
            "Bill to",
        );
        self.document.text(
            left,
            customer_top + LINE_STEP_MM,
            size,
            FontWeight::Regular,
            Align::Left,
            &self.customer.name,
        );

        if !contact.is_empty() {
            self.document.text(
                left,
                customer_top + 2.0 * LINE_STEP_MM,
                size,
                FontWeight::Regular,
                Align::Left,
                contact,
            );
        }

        self.cursor.advance(layout.header_height_mm);
    }

    /// Draw the column header grid and return the column offsets used for the rows.
    fn draw_table_header(&mut self) -> ColumnLayout {
        let layout = *self.layout();
        let columns = ColumnLayout::allocate(self.left(), layout.table_width_mm());
        let top = self.cursor.y();
        let baseline = top + layout.table_header_height_mm * BASELINE_OFFSET;

        self.document.hrule(columns.left(), columns.right(), top);

        for span in columns.spans() {
            let (x, align) = cell_anchor(span.column, span.x, span.right());

            self.document.text(
                x,
                baseline,
                layout.font_size_pt,
                FontWeight::Bold,
                align,
                span.column.label(),
            );
        }

        self.document.hrule(
            columns.left(),
            columns.right(),
            top + layout.table_header_height_mm,
        );
        self.cursor.advance(layout.table_header_height_mm);

        columns
    }

    fn row_fits(&self) -> bool {
        let layout = self.layout();

        self.cursor
            .fits(layout.row_height_mm, layout.footer_height_mm)
    }

    /// Close the full half and open the next one.
    fn overflow(&mut self, next_item_idx: usize) {
        self.observer
            .on_half_overflow(self.region.page, self.region.half, next_item_idx);

        self.draw_totals();

        if self.cursor.next_half() {
            self.document.add_page();
        }

        self.open_half();
    }

    fn draw_row(&mut self, item: &LineItem<'_>, priced: &PricedItem) {
        let layout = *self.layout();
        let size = layout.font_size_pt;
        let baseline = self.cursor.y() + layout.row_height_mm * BASELINE_OFFSET;
        let specification = item.specification().describe();

        for span in *self.columns.spans() {
            let content = match span.column {
                Column::Product => item.description().to_string(),
                Column::Specification if specification.is_empty() => String::from("-"),
                Column::Specification => specification.clone(),
                Column::Quantity => item.quantity().to_string(),
                Column::Price => item.unit_price().to_string(),
                Column::Tax => format!("{}%", item.tax_percent_points().normalize()),
                Column::Amount => format_amount(priced.amount(), self.order.currency()),
            };
            let (x, align) = cell_anchor(span.column, span.x, span.right());

            self.document.text(
                x,
                baseline,
                size,
                FontWeight::Regular,
                align,
                fit_to_width(&content, span.width - 2.0, size),
            );
        }

        self.cursor.advance(layout.row_height_mm);
        self.region.rows += 1;
    }

    fn draw_placeholder(&mut self) {
        let layout = *self.layout();
        let baseline = self.cursor.y() + layout.row_height_mm * BASELINE_OFFSET;

        self.document.text(
            self.left() + 1.0,
            baseline,
            layout.font_size_pt,
            FontWeight::Regular,
            Align::Left,
            NO_ITEMS_PLACEHOLDER,
        );
        self.cursor.advance(layout.row_height_mm);
    }

    /// `RowsFilling -> TotalsDrawn -> Closed` with the full footer block.
    fn draw_totals(&mut self) {
        let layout = *self.layout();
        let size = layout.font_size_pt;
        let (left, right) = (self.left(), self.right());
        let top = self.cursor.y();
        let label_x = self.columns.span(Column::Tax).right() - 1.0;
        let value_x = self.columns.right() - 1.0;

        self.document.hrule(left, right, top);

        let lines = [
            ("Subtotal", self.totals.subtotal_display(), FontWeight::Regular),
            (
                "Discount",
                self.totals.applied_discount_display(),
                FontWeight::Regular,
            ),
            ("Total", self.totals.total().to_string(), FontWeight::Bold),
        ];

        let mut y = top;

        for (label, value, weight) in lines {
            y += 5.0;
            self.document
                .text(label_x, y, size, weight, Align::Right, label);
            self.document
                .text(value_x, y, size, weight, Align::Right, value);
        }

        let company = &self.config.company;

        for line in company.warranty.iter().take(2) {
            y += LINE_STEP_MM;
            self.document
                .text(left, y, size - 1.0, FontWeight::Regular, Align::Left, line);
        }

        let signature_line = top + SIGNATURE_RULE_OFFSET_MM;
        let signature_width = 50.0;

        for (x, label) in [left, right - signature_width]
            .into_iter()
            .zip(&company.signatures)
        {
            self.document
                .hrule(x, x + signature_width, signature_line);
            self.document.text(
                x,
                signature_line + LINE_STEP_MM,
                size,
                FontWeight::Regular,
                Align::Left,
                label,
            );
        }

        self.close_region();
    }

    /// `RowsFilling -> TotalsDrawn -> Closed` with only a total line.
    fn draw_total_only(&mut self, total: String) {
        let layout = *self.layout();
        let top = self.cursor.y();
        let y = top + 5.0;

        self.document.hrule(self.left(), self.right(), top);
        self.document.text(
            self.columns.span(Column::Tax).right() - 1.0,
            y,
            layout.font_size_pt,
            FontWeight::Bold,
            Align::Right,
            "Total",
        );
        self.document.text(
            self.columns.right() - 1.0,
            y,
            layout.font_size_pt,
            FontWeight::Bold,
            Align::Right,
            total,
        );

        self.close_region();
    }

    fn close_region(&mut self) {
        self.region.advance(HalfState::TotalsDrawn);
        self.region.advance(HalfState::Closed);
        self.observer
            .on_half_closed(self.region.page, self.region.half, self.region.rows);
    }

    fn finish(self) -> Document {
        self.document
    }
}

/// Text anchor for a cell: numeric columns are right aligned against the cell edge.
fn cell_anchor(column: Column, left: f32, right: f32) -> (f32, Align) {
    if column.is_numeric() {
        (right - 1.0, Align::Right)
    } else {
        (left + 1.0, Align::Left)
    }
}

/// Trim `content` with a trailing `...` so it fits in `width` millimetres.
fn fit_to_width(content: &str, width: f32, size: f32) -> String {
    if approx_text_width(content.chars().count(), size) <= width {
        return content.to_string();
    }

    let mut fitted = String::new();

    for ch in content.chars() {
        if approx_text_width(fitted.chars().count() + 4, size) > width {
            break;
        }

        fitted.push(ch);
    }

    fitted.push_str("...");
    fitted
}
