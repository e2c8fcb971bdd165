//! Order Fixtures

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, IDR, USD},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    items::LineItem,
    orders::Order,
    pricing::money_from_decimal,
    products::{ProductKind, Specification},
};

/// Wrapper for an order in YAML
#[derive(Debug, Deserialize)]
pub struct OrderFile {
    /// The order
    pub order: OrderFixture,
}

/// Order Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct OrderFixture {
    /// Invoice number
    pub number: String,

    /// Issue date (e.g., `2024-05-14`)
    pub issued_on: Date,

    /// Key into the customers fixture
    pub customer: String,

    /// ISO currency code (e.g., `IDR`)
    pub currency: String,

    /// Requested discount (e.g., "20000 IDR")
    #[serde(default)]
    pub discount: Option<String>,

    /// Total recorded by the order system, if any
    #[serde(default)]
    pub stored_total: Option<String>,

    /// Line items
    #[serde(default)]
    pub items: Vec<LineItemFixture>,
}

/// Line Item Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemFixture {
    /// Description
    pub description: String,

    /// Product type label (e.g., "Sublimation Paper")
    #[serde(default)]
    pub product_type: Option<String>,

    /// Roll format label (e.g., "Jumbo Roll")
    #[serde(default)]
    pub sub_variant: Option<String>,

    /// Paper weight
    #[serde(default)]
    pub gsm: Option<u32>,

    /// Roll width in millimetres
    #[serde(default)]
    pub width_mm: Option<Decimal>,

    /// Roll length in metres
    #[serde(default)]
    pub length_m: Option<Decimal>,

    /// Weight in kilograms
    #[serde(default)]
    pub weight_kg: Option<Decimal>,

    /// Unit count
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Unit price (e.g., "10000 IDR")
    pub price: String,

    /// Tax rate (e.g., "11%")
    #[serde(default)]
    pub tax: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl LineItemFixture {
    /// Build a line item, checking its price is in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the price or tax cannot be parsed, the price is in
    /// another currency, or the item is invalid.
    pub fn into_line_item(
        self,
        currency: &'static Currency,
    ) -> Result<LineItem<'static>, FixtureError> {
        let price = parse_money_in(&self.price, currency)?;
        let product =
            ProductKind::from_labels(self.product_type.as_deref(), self.sub_variant.as_deref());
        let specification = Specification {
            gsm: self.gsm,
            width_mm: self.width_mm,
            length_m: self.length_m,
            weight_kg: self.weight_kg,
        };
        let item_error = |source| FixtureError::Item {
            item: self.description.clone(),
            source,
        };

        let mut item = LineItem::new(self.description.clone(), product, price)
            .and_then(|item| item.with_quantity(self.quantity))
            .map_err(item_error)?
            .with_specification(specification);

        if let Some(tax) = &self.tax {
            item = item
                .with_tax_rate(parse_percentage(tax)?)
                .map_err(item_error)?;
        }

        Ok(item)
    }
}

impl TryFrom<OrderFixture> for Order<'static> {
    type Error = FixtureError;

    fn try_from(fixture: OrderFixture) -> Result<Self, Self::Error> {
        let currency = parse_currency(&fixture.currency)?;
        let items = fixture
            .items
            .into_iter()
            .map(|item| item.into_line_item(currency))
            .collect::<Result<Vec<_>, _>>()?;

        let mut order = Order::new(fixture.number, fixture.issued_on, fixture.customer, currency)
            .with_items(items)?;

        if let Some(discount) = &fixture.discount {
            order = order.with_discount(parse_money_in(discount, currency)?)?;
        }

        if let Some(total) = &fixture.stored_total {
            order = order.with_stored_total(parse_money_in(total, currency)?)?;
        }

        Ok(order)
    }
}

/// Parse a currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes other than IDR, USD, EUR or GBP.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "IDR" => Ok(IDR),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        "GBP" => Ok(GBP),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "10000 IDR") into money.
///
/// The amount is rounded to the currency's minor units.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if
/// the amount is not a decimal number, or if the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;
    let currency = parse_currency(code)?;

    money_from_decimal(amount, currency).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))
}

fn parse_money_in(
    s: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, FixtureError> {
    let money = parse_price(s)?;

    if money.currency() != currency {
        return Err(FixtureError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            money.currency().iso_alpha_code.to_string(),
        ));
    }

    Ok(money)
}

/// Parse percentage string (e.g., "11%" or "0.11")
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a decimal number.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / Decimal::ONE_HUNDRED))
    } else {
        let value = trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::products::RollFormat;

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("10000IDR");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_uses_currency_minor_units() -> TestResult {
        let usd = parse_price("1.25 USD")?;

        assert_eq!(usd.to_minor_units(), 125);
        assert_eq!(usd.currency(), USD);

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        assert_eq!(parse_percentage("11%")?, parse_percentage("0.11")?);
        assert!(matches!(
            parse_percentage("eleven"),
            Err(FixtureError::InvalidPercentage(_))
        ));

        Ok(())
    }

    #[test]
    fn line_item_fixture_classifies_and_measures() -> TestResult {
        let fixture: LineItemFixture = serde_norway::from_str(
            "
description: Sublimation Roll 100gsm
product_type: Sublimation Paper
sub_variant: Roll
gsm: 100
width_mm: 1118
length_m: 100
quantity: 2
price: 10000 IDR
tax: 11%
",
        )?;

        let item = fixture.into_line_item(IDR)?;

        assert_eq!(
            item.product(),
            &ProductKind::SublimationPaper(RollFormat::Roll)
        );
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.specification().gsm, Some(100));
        assert_eq!(item.tax_percent_points(), Decimal::from(11));

        Ok(())
    }

    #[test]
    fn line_item_in_other_currency_is_rejected() -> TestResult {
        let fixture: LineItemFixture =
            serde_norway::from_str("{ description: Ink, product_type: Ink, price: 5 USD }")?;

        let result = fixture.into_line_item(IDR);

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }
}
