//! Order summary
//!
//! Terminal rendition of a priced order: one table row per line item followed by
//! the subtotal, applied discount and total. Degraded amounts are highlighted and
//! carry a note saying what was defaulted.

use std::io;

use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    orders::{Order, OrderTotals},
    pricing::{PricedItem, format_amount},
};

/// Column holding the amount; highlighted for degraded rows.
const AMOUNT_COLUMN: usize = 6;

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The output stream rejected a write.
    #[error("failed to write order summary")]
    Io(#[from] io::Error),
}

/// Write a table of `order`'s items and its `totals` to `out`.
///
/// # Errors
///
/// Returns [`SummaryError::Io`] if writing fails.
pub fn write_summary(
    mut out: impl io::Write,
    order: &Order<'_>,
    totals: &OrderTotals<'_>,
) -> Result<(), SummaryError> {
    let mut builder = Builder::default();

    builder.push_record([
        "", "Product", "Specification", "Qty", "Price", "Tax", "Amount", "Note",
    ]);

    let mut degraded_rows: SmallVec<[usize; 8]> = SmallVec::new();

    for (idx, (item, priced)) in order.items().iter().zip(totals.priced_items()).enumerate() {
        let note = match priced {
            PricedItem::Complete(_) => String::new(),
            PricedItem::Degraded { reason, .. } => {
                degraded_rows.push(idx + 1);
                reason.to_string()
            }
        };

        builder.push_record([
            format!("#{:<3}", idx + 1),
            item.description().to_string(),
            item.specification().describe(),
            item.quantity().to_string(),
            item.unit_price().to_string(),
            format!("{}%", item.tax_percent_points().normalize()),
            format_amount(priced.amount(), order.currency()),
            note,
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..7), Alignment::right());

    for row in degraded_rows {
        table.modify((row, AMOUNT_COLUMN), Color::FG_YELLOW);
    }

    writeln!(out, "\n{} ({}, {})", order.number(), order.issued_on(), order.customer_id())?;
    writeln!(out, "{table}")?;

    let lines = [
        ("Subtotal:", totals.subtotal_display()),
        ("Discount:", totals.applied_discount_display()),
        ("Total:", totals.total().to_string()),
    ];
    let value_width = lines
        .iter()
        .map(|(_, value)| value.len())
        .max()
        .unwrap_or(0);

    for (label, value) in lines {
        writeln!(out, " {label:<10}{value:>value_width$}")?;
    }

    if let Err(mismatch) = order.reconcile(totals) {
        writeln!(out, " {mismatch}")?;
    }

    writeln!(out)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::civil::Date;
    use rust_decimal::Decimal;
    use rusty_money::{
        Money,
        iso::{IDR, USD},
    };
    use testresult::TestResult;

    use crate::{
        items::LineItem,
        observer::NoopObserver,
        pricing::{PriceCalculator, money_from_decimal},
        products::ProductKind,
    };

    use super::*;

    fn idr(major: i64) -> Result<Money<'static, rusty_money::iso::Currency>, rust_decimal::Error> {
        money_from_decimal(Decimal::from(major), IDR)
    }

    #[test]
    fn lists_items_and_totals() -> TestResult {
        let film = LineItem::new("DTF Film A3", ProductKind::DtfFilm, idr(50_000)?)?
            .with_quantity(2)?
            .with_tax_percent(Decimal::from(11))?;
        let order = Order::new("INV-7", Date::constant(2024, 5, 14), "c-9", IDR)
            .with_items([film])?
            .with_discount(idr(1_000)?)?;
        let totals = order.totals(&PriceCalculator::default(), &mut NoopObserver)?;

        let mut out = Vec::new();
        write_summary(&mut out, &order, &totals)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("INV-7"));
        assert!(output.contains("DTF Film A3"));
        assert!(output.contains("11%"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains(&totals.total().to_string()));
        assert!(!output.contains("does not match"));

        Ok(())
    }

    #[test]
    fn stored_total_equal_to_rounded_total_is_not_flagged() -> TestResult {
        let ink = LineItem::new("Ink sample", ProductKind::Ink, Money::from_minor(1, USD))?
            .with_quantity(2)?
            .with_tax_percent(Decimal::from(50))?;
        let order = Order::new("INV-9", Date::constant(2024, 5, 14), "c-9", USD)
            .with_items([ink])?
            .with_stored_total(Money::from_minor(3, USD))?;
        let totals = order.totals(&PriceCalculator::default(), &mut NoopObserver)?;

        let mut out = Vec::new();
        write_summary(&mut out, &order, &totals)?;

        let output = String::from_utf8(out)?;

        assert!(!output.contains("does not match"));

        Ok(())
    }

    #[test]
    fn notes_degraded_items_and_stored_total_mismatch() -> TestResult {
        let mystery = LineItem::new("Mystery roll", ProductKind::Unclassified(None), idr(10)?)?;
        let order = Order::new("INV-8", Date::constant(2024, 5, 14), "c-9", IDR)
            .with_items([mystery])?
            .with_stored_total(idr(99)?)?;
        let totals = order.totals(&PriceCalculator::default(), &mut NoopObserver)?;

        let mut out = Vec::new();
        write_summary(&mut out, &order, &totals)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("no product type"));
        assert!(output.contains("stored total"));
        assert!(output.contains("does not match computed total"));

        Ok(())
    }
}
