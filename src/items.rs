//! Items

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::products::{ProductKind, Specification};

/// Errors raised while building a line item.
#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    /// Quantity must be at least one.
    #[error("quantity must be positive")]
    ZeroQuantity,

    /// Unit price cannot be negative.
    #[error("unit price cannot be negative: {0}")]
    NegativePrice(String),

    /// Tax rate cannot be negative.
    #[error("tax rate cannot be negative")]
    NegativeTaxRate,
}

/// One purchasable unit within an order or invoice.
///
/// Line items are read-only inputs to the pricing engine. Builders validate the
/// non-negative/positive invariants up front so the calculator never has to.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    description: String,
    product: ProductKind,
    specification: Specification,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    tax_rate: Percentage,
}

impl<'a> LineItem<'a> {
    /// Creates a line item with a quantity of one and no tax.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::NegativePrice`] if `unit_price` is below zero.
    pub fn new(
        description: impl Into<String>,
        product: ProductKind,
        unit_price: Money<'a, Currency>,
    ) -> Result<Self, ItemError> {
        if unit_price.to_minor_units() < 0 {
            return Err(ItemError::NegativePrice(unit_price.to_string()));
        }

        Ok(Self {
            description: description.into(),
            product,
            specification: Specification::default(),
            quantity: 1,
            unit_price,
            tax_rate: Percentage::from(Decimal::ZERO),
        })
    }

    /// Sets the unit count.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::ZeroQuantity`] if `quantity` is zero.
    pub fn with_quantity(mut self, quantity: u32) -> Result<Self, ItemError> {
        if quantity == 0 {
            return Err(ItemError::ZeroQuantity);
        }

        self.quantity = quantity;

        Ok(self)
    }

    /// Sets the tax rate.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::NegativeTaxRate`] if the rate is below zero.
    pub fn with_tax_rate(mut self, tax_rate: Percentage) -> Result<Self, ItemError> {
        if tax_rate * Decimal::ONE < Decimal::ZERO {
            return Err(ItemError::NegativeTaxRate);
        }

        self.tax_rate = tax_rate;

        Ok(self)
    }

    /// Sets the tax rate from percent points, e.g. `10` for 10%.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::NegativeTaxRate`] if the rate is below zero.
    pub fn with_tax_percent(self, points: Decimal) -> Result<Self, ItemError> {
        self.with_tax_rate(Percentage::from(points / Decimal::ONE_HUNDRED))
    }

    /// Attaches specification dimensions.
    #[must_use]
    pub fn with_specification(mut self, specification: Specification) -> Self {
        self.specification = specification;
        self
    }

    /// Display name of the item.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Product kind, which selects the pricing formula.
    pub fn product(&self) -> &ProductKind {
        &self.product
    }

    /// Specification dimensions.
    pub fn specification(&self) -> &Specification {
        &self.specification
    }

    /// Unit count.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per pricing unit (metre², kilogram, roll or bottle).
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Tax rate as a fraction.
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// Tax rate in percent points, e.g. `10` for 10%.
    pub fn tax_percent_points(&self) -> Decimal {
        (self.tax_rate * Decimal::ONE_HUNDRED).normalize()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::IDR;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_item_defaults_to_single_untaxed_unit() -> TestResult {
        let item = LineItem::new("Ink Cyan", ProductKind::Ink, Money::from_minor(100, IDR))?;

        assert_eq!(item.quantity(), 1);
        assert_eq!(item.tax_percent_points(), Decimal::ZERO);
        assert_eq!(item.description(), "Ink Cyan");

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected() -> TestResult {
        let item = LineItem::new("Ink", ProductKind::Ink, Money::from_minor(100, IDR))?;

        assert_eq!(item.with_quantity(0), Err(ItemError::ZeroQuantity));

        Ok(())
    }

    #[test]
    fn negative_price_is_rejected() {
        let result = LineItem::new("Ink", ProductKind::Ink, Money::from_minor(-1, IDR));

        assert!(matches!(result, Err(ItemError::NegativePrice(_))));
    }

    #[test]
    fn negative_tax_is_rejected() -> TestResult {
        let item = LineItem::new("Ink", ProductKind::Ink, Money::from_minor(100, IDR))?;

        assert_eq!(
            item.with_tax_percent(Decimal::from(-5)),
            Err(ItemError::NegativeTaxRate)
        );

        Ok(())
    }

    #[test]
    fn tax_percent_round_trips_through_fraction() -> TestResult {
        let item = LineItem::new("Ink", ProductKind::Ink, Money::from_minor(100, IDR))?
            .with_tax_percent(Decimal::from(11))?;

        assert_eq!(item.tax_percent_points(), Decimal::from(11));

        Ok(())
    }
}
