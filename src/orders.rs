//! Orders
//!
//! Aggregates priced line items into order totals with a capped discount.

use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    items::LineItem,
    observer::Observer,
    pricing::{
        PriceCalculator, PricedItem, PricingError, decimal_from_money, format_amount,
        money_from_decimal,
    },
};

/// Errors related to order construction or totals.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// Discount cannot be negative.
    #[error("discount cannot be negative: {0}")]
    NegativeDiscount(String),

    /// A money value's currency differs from the order currency (what, value currency, order currency).
    #[error("{0} has currency {1}, but order has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// The stored total disagrees with the recomputed total.
    #[error("stored total {stored} does not match computed total {computed}")]
    TotalMismatch {
        /// Total persisted alongside the order.
        stored: String,
        /// Total recomputed from items and discount.
        computed: String,
    },

    /// Error pricing one of the items.
    #[error("failed to price item {0}: {1}")]
    Pricing(usize, #[source] PricingError),

    /// Totals could not be represented.
    #[error("order totals overflowed: {0}")]
    Overflow(String),
}

/// Totals derived from an order's items and discount.
///
/// Item amounts, the subtotal and the applied discount are exact. Only the
/// payable total is rounded to the currency's minor units.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals<'a> {
    priced: SmallVec<[PricedItem; 8]>,
    subtotal: Decimal,
    applied_discount: Decimal,
    total: Money<'a, Currency>,
}

impl<'a> OrderTotals<'a> {
    /// Per-item amounts, in item order.
    pub fn priced_items(&self) -> &[PricedItem] {
        &self.priced
    }

    /// Exact tax-inclusive sum of all item amounts.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Discount actually applied, never more than the subtotal.
    pub fn applied_discount(&self) -> Decimal {
        self.applied_discount
    }

    /// Payable total rounded to minor units, never negative.
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency of the totals.
    pub fn currency(&self) -> &'a Currency {
        self.total.currency()
    }

    /// Subtotal as displayed money.
    pub fn subtotal_display(&self) -> String {
        format_amount(self.subtotal, self.currency())
    }

    /// Applied discount as displayed money.
    pub fn applied_discount_display(&self) -> String {
        format_amount(self.applied_discount, self.currency())
    }

    /// Indexes of items whose amount was degraded.
    pub fn degraded_items(&self) -> impl Iterator<Item = usize> + '_ {
        self.priced
            .iter()
            .enumerate()
            .filter(|(_, priced)| priced.is_degraded())
            .map(|(idx, _)| idx)
    }
}

/// Compute order totals: subtotal, clamped discount and payable total.
///
/// `subtotal` is the exact sum of every item amount, `applied_discount` is
/// `min(discount, subtotal)` and `total` is `subtotal - applied_discount` rounded
/// to the currency's minor units (midpoint away from zero). No other value is
/// rounded.
///
/// # Errors
///
/// - [`OrderError::NegativeDiscount`] if `discount` is below zero.
/// - [`OrderError::CurrencyMismatch`] if an item's currency differs from the discount's.
/// - [`OrderError::Pricing`] if an item cannot be priced under the calculator's policy.
/// - [`OrderError::Overflow`] if the sum cannot be represented.
pub fn compute_order_total<'a>(
    items: &[LineItem<'a>],
    discount: Money<'a, Currency>,
    calculator: &PriceCalculator,
    observer: &mut dyn Observer,
) -> Result<OrderTotals<'a>, OrderError> {
    ensure_non_negative_discount(discount)?;

    let currency = discount.currency();
    let mut priced: SmallVec<[PricedItem; 8]> = SmallVec::with_capacity(items.len());
    let mut subtotal = Decimal::ZERO;

    for (idx, item) in items.iter().enumerate() {
        ensure_currency(&format!("item {idx}"), item.unit_price(), currency)?;

        let priced_item = calculator
            .price(idx, item, observer)
            .map_err(|err| OrderError::Pricing(idx, err))?;

        subtotal = subtotal
            .checked_add(priced_item.amount())
            .ok_or_else(|| OrderError::Overflow(format!("subtotal at item {idx}")))?;

        priced.push(priced_item);
    }

    let requested = decimal_from_money(&discount)
        .map_err(|err| OrderError::Overflow(format!("discount ({err})")))?;
    let applied_discount = requested.min(subtotal);

    let total = money_from_decimal(subtotal - applied_discount, currency)
        .map_err(|err| OrderError::Overflow(format!("total ({err})")))?;

    let totals = OrderTotals {
        priced,
        subtotal,
        applied_discount,
        total,
    };

    observer.on_order_totals(&totals);

    Ok(totals)
}

fn ensure_non_negative_discount(discount: Money<'_, Currency>) -> Result<(), OrderError> {
    if discount.to_minor_units() < 0 {
        Err(OrderError::NegativeDiscount(discount.to_string()))
    } else {
        Ok(())
    }
}

fn ensure_currency(
    what: &str,
    money: &Money<'_, Currency>,
    currency: &Currency,
) -> Result<(), OrderError> {
    if money.currency() == currency {
        Ok(())
    } else {
        Err(OrderError::CurrencyMismatch(
            what.to_string(),
            money.currency().iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}

/// An order (or the invoice generated from it).
#[derive(Debug, Clone)]
pub struct Order<'a> {
    number: String,
    issued_on: Date,
    customer_id: String,
    items: Vec<LineItem<'a>>,
    discount: Money<'a, Currency>,
    stored_total: Option<Money<'a, Currency>>,
    currency: &'static Currency,
}

impl<'a> Order<'a> {
    /// Create an empty order with no discount.
    pub fn new(
        number: impl Into<String>,
        issued_on: Date,
        customer_id: impl Into<String>,
        currency: &'static Currency,
    ) -> Self {
        Self {
            number: number.into(),
            issued_on,
            customer_id: customer_id.into(),
            items: Vec::new(),
            discount: Money::from_minor(0, currency),
            stored_total: None,
            currency,
        }
    }

    /// Replace the order's items.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::CurrencyMismatch`] if an item is priced in another currency.
    pub fn with_items(mut self, items: impl Into<Vec<LineItem<'a>>>) -> Result<Self, OrderError> {
        let items = items.into();

        for (idx, item) in items.iter().enumerate() {
            self.ensure_currency(&format!("item {idx}"), item.unit_price())?;
        }

        self.items = items;

        Ok(self)
    }

    /// Set the requested discount.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NegativeDiscount`] or [`OrderError::CurrencyMismatch`].
    pub fn with_discount(mut self, discount: Money<'a, Currency>) -> Result<Self, OrderError> {
        ensure_non_negative_discount(discount)?;
        self.ensure_currency("discount", &discount)?;
        self.discount = discount;

        Ok(self)
    }

    /// Attach the total persisted for this order by the storage layer.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::CurrencyMismatch`] if the total is in another currency.
    pub fn with_stored_total(mut self, total: Money<'a, Currency>) -> Result<Self, OrderError> {
        self.ensure_currency("stored total", &total)?;
        self.stored_total = Some(total);

        Ok(self)
    }

    fn ensure_currency(&self, what: &str, money: &Money<'_, Currency>) -> Result<(), OrderError> {
        ensure_currency(what, money, self.currency)
    }

    /// Invoice number.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Issue date.
    pub fn issued_on(&self) -> Date {
        self.issued_on
    }

    /// Identifier of the customer the order belongs to.
    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Line items.
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// Requested (unclamped) discount.
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Total persisted by the storage layer, if known.
    pub fn stored_total(&self) -> Option<Money<'a, Currency>> {
        self.stored_total
    }

    /// Order currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Compute the order totals.
    ///
    /// # Errors
    ///
    /// See [`compute_order_total`].
    pub fn totals(
        &self,
        calculator: &PriceCalculator,
        observer: &mut dyn Observer,
    ) -> Result<OrderTotals<'a>, OrderError> {
        compute_order_total(&self.items, self.discount, calculator, observer)
    }

    /// Check the stored total against freshly computed totals.
    ///
    /// Orders without a stored total always reconcile.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::TotalMismatch`] if the values differ.
    pub fn reconcile(&self, totals: &OrderTotals<'_>) -> Result<(), OrderError> {
        match self.stored_total {
            Some(stored) if stored.to_minor_units() != totals.total().to_minor_units() => {
                Err(OrderError::TotalMismatch {
                    stored: stored.to_string(),
                    computed: totals.total().to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
