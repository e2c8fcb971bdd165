//! Observer
//!
//! Callbacks fired while items are priced and an invoice is laid out. The
//! calculator and paginator stay pure; anything that wants diagnostics (logs,
//! metrics, test assertions) implements [`Observer`] and is passed in.

use tracing::{debug, info, warn};

use crate::{
    invoice::cursor::Half,
    items::LineItem,
    orders::OrderTotals,
    pricing::{Degradation, PricedItem},
};

/// Observer trait for pricing and pagination events.
///
/// Every method has an empty default so implementors only override what they need.
pub trait Observer {
    /// Called once per line item after its amount has been computed.
    ///
    /// # Parameters
    ///
    /// - `item_idx`: Index of the item in its order
    /// - `item`: The line item that was priced
    /// - `priced`: The computed amount, possibly degraded
    fn on_item_priced(&mut self, _item_idx: usize, _item: &LineItem<'_>, _priced: &PricedItem) {}

    /// Called when order totals have been aggregated.
    fn on_order_totals(&mut self, _totals: &OrderTotals<'_>) {}

    /// Called when the paginator opens a half-invoice region.
    fn on_half_opened(&mut self, _page: usize, _half: Half) {}

    /// Called when the next row would not fit and the current half is closed early.
    fn on_half_overflow(&mut self, _page: usize, _half: Half, _next_item_idx: usize) {}

    /// Called after the totals block has been drawn and a half is closed.
    fn on_half_closed(&mut self, _page: usize, _half: Half, _rows: usize) {}
}

/// No-op observer (default).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Observer that forwards events to `tracing`.
///
/// Degraded items are logged at `warn`, everything else at `debug`/`info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_item_priced(&mut self, item_idx: usize, item: &LineItem<'_>, priced: &PricedItem) {
        let currency = item.unit_price().currency().iso_alpha_code;

        match priced {
            PricedItem::Complete(amount) => {
                debug!(
                    item_idx,
                    product = %item.product(),
                    amount = %amount,
                    currency,
                    "priced line item"
                );
            }
            PricedItem::Degraded {
                amount,
                reason: Degradation::MissingDimensions(missing),
            } => {
                let missing = missing
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");

                warn!(
                    item_idx,
                    product = %item.product(),
                    amount = %amount,
                    currency,
                    missing = %missing,
                    "line item is missing dimensions; treated as zero"
                );
            }
            PricedItem::Degraded {
                amount,
                reason: Degradation::UnclassifiedProduct(label),
            } => {
                warn!(
                    item_idx,
                    label = label.as_deref().unwrap_or("<none>"),
                    amount = %amount,
                    currency,
                    "unclassified product priced as unit price x quantity"
                );
            }
        }
    }

    fn on_order_totals(&mut self, totals: &OrderTotals<'_>) {
        info!(
            subtotal = %totals.subtotal_display(),
            discount = %totals.applied_discount_display(),
            total = %totals.total(),
            degraded_items = totals.degraded_items().count(),
            "computed order totals"
        );
    }

    fn on_half_opened(&mut self, page: usize, half: Half) {
        debug!(page, half = %half, "opened half-invoice");
    }

    fn on_half_overflow(&mut self, page: usize, half: Half, next_item_idx: usize) {
        debug!(page, half = %half, next_item_idx, "half-invoice full; continuing");
    }

    fn on_half_closed(&mut self, page: usize, half: Half, rows: usize) {
        debug!(page, half = %half, rows, "closed half-invoice");
    }
}
