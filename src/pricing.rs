//! Pricing
//!
//! The single home of the per-item pricing formula. Order totals, the terminal
//! summary and the invoice paginator all price items through [`PriceCalculator`].
//!
//! | product                       | pre-tax subtotal                                   |
//! |-------------------------------|----------------------------------------------------|
//! | Sublimation Paper, Jumbo Roll | `unit_price * weight_kg`                           |
//! | Sublimation Paper, Roll       | `unit_price * width_mm / 1000 * length_m * qty`    |
//! | Protect Paper                 | `unit_price * weight_kg`                           |
//! | DTF Film, Ink                 | `unit_price * qty`                                 |
//! | Unclassified                  | `unit_price * qty` (fallback)                      |
//!
//! Tax is applied last: `amount = subtotal * (1 + tax_rate)`.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    items::LineItem,
    observer::{NoopObserver, Observer},
    products::{Dimension, ProductKind, RollFormat},
};

/// Errors that can occur while pricing a line item.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Decimal arithmetic overflowed or the result does not fit in minor units.
    #[error("amount overflowed while pricing item {0}")]
    Overflow(String),

    /// Required dimensions were missing and the policy rejects degraded items.
    #[error("item {item} is missing required dimensions: {missing:?}")]
    MissingDimensions {
        /// Item description.
        item: String,
        /// Dimensions that were absent.
        missing: SmallVec<[Dimension; 3]>,
    },

    /// Item has no recognised product type and the policy rejects the fallback.
    #[error("item {item} has an unclassified product type ({label:?})")]
    UnclassifiedProduct {
        /// Item description.
        item: String,
        /// Raw product type label, if any.
        label: Option<String>,
    },
}

/// Why an item amount could not be computed from complete data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// These dimensions were absent and treated as zero.
    MissingDimensions(SmallVec<[Dimension; 3]>),

    /// No known product type; priced as `unit_price * quantity`.
    UnclassifiedProduct(Option<String>),
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::MissingDimensions(missing) => {
                f.write_str("missing ")?;

                for (idx, dimension) in missing.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }

                    write!(f, "{dimension}")?;
                }

                Ok(())
            }
            Degradation::UnclassifiedProduct(Some(label)) => {
                write!(f, "unclassified product type {label:?}")
            }
            Degradation::UnclassifiedProduct(None) => f.write_str("no product type"),
        }
    }
}

/// Exact tax-inclusive amount of one line item, in major currency units.
///
/// Amounts are not rounded; only the order total is rounded to money.
#[derive(Debug, Clone, PartialEq)]
pub enum PricedItem {
    /// Amount computed from complete data.
    Complete(Decimal),

    /// Amount computed after a silent default; callers decide whether to warn or reject.
    Degraded {
        /// Computed amount.
        amount: Decimal,

        /// What was defaulted.
        reason: Degradation,
    },
}

impl PricedItem {
    /// Tax-inclusive amount, degraded or not.
    pub fn amount(&self) -> Decimal {
        match self {
            PricedItem::Complete(amount) | PricedItem::Degraded { amount, .. } => *amount,
        }
    }

    /// Returns true if the amount was computed from defaulted data.
    pub fn is_degraded(&self) -> bool {
        matches!(self, PricedItem::Degraded { .. })
    }

    /// Degradation reason, if any.
    pub fn degradation(&self) -> Option<&Degradation> {
        match self {
            PricedItem::Complete(_) => None,
            PricedItem::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// What to do when a required dimension is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDimensionPolicy {
    /// Treat the dimension as zero and report the item as degraded.
    #[default]
    Degrade,

    /// Fail with [`PricingError::MissingDimensions`].
    Reject,
}

/// What to do with an item whose product type is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnclassifiedPolicy {
    /// Price as `unit_price * quantity` and report the item as degraded.
    #[default]
    Fallback,

    /// Fail with [`PricingError::UnclassifiedProduct`].
    Reject,
}

/// Pricing policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Handling of missing dimensions.
    pub missing_dimensions: MissingDimensionPolicy,

    /// Handling of unclassified products.
    pub unclassified: UnclassifiedPolicy,
}

impl PricingPolicy {
    /// Policy that rejects every degraded item.
    pub fn strict() -> Self {
        Self {
            missing_dimensions: MissingDimensionPolicy::Reject,
            unclassified: UnclassifiedPolicy::Reject,
        }
    }
}

/// Per-item amount calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceCalculator {
    policy: PricingPolicy,
}

impl PriceCalculator {
    /// Create a calculator with the given policy.
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    /// Policy in effect.
    pub fn policy(&self) -> PricingPolicy {
        self.policy
    }

    /// Compute the exact tax-inclusive amount of `item`.
    ///
    /// The observer is notified once with the result (complete or degraded). Rejected
    /// items are not reported.
    ///
    /// # Errors
    ///
    /// - [`PricingError::MissingDimensions`] / [`PricingError::UnclassifiedProduct`] when the
    ///   policy rejects a degraded item.
    /// - [`PricingError::Overflow`] if the arithmetic cannot be represented.
    pub fn price(
        &self,
        item_idx: usize,
        item: &LineItem<'_>,
        observer: &mut dyn Observer,
    ) -> Result<PricedItem, PricingError> {
        let degradation = self.degradation(item)?;
        let amount = tax_inclusive(item)?;

        let priced = match degradation {
            None => PricedItem::Complete(amount),
            Some(reason) => PricedItem::Degraded { amount, reason },
        };

        observer.on_item_priced(item_idx, item, &priced);

        Ok(priced)
    }

    fn degradation(&self, item: &LineItem<'_>) -> Result<Option<Degradation>, PricingError> {
        if let ProductKind::Unclassified(label) = item.product() {
            return match self.policy.unclassified {
                UnclassifiedPolicy::Fallback => {
                    Ok(Some(Degradation::UnclassifiedProduct(label.clone())))
                }
                UnclassifiedPolicy::Reject => Err(PricingError::UnclassifiedProduct {
                    item: item.description().to_string(),
                    label: label.clone(),
                }),
            };
        }

        let missing = item.specification().missing_for(item.product());

        if missing.is_empty() {
            return Ok(None);
        }

        match self.policy.missing_dimensions {
            MissingDimensionPolicy::Degrade => Ok(Some(Degradation::MissingDimensions(missing))),
            MissingDimensionPolicy::Reject => Err(PricingError::MissingDimensions {
                item: item.description().to_string(),
                missing,
            }),
        }
    }
}

/// Compute an item amount with the default policy and no observer.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the arithmetic cannot be represented.
pub fn compute_item_amount(item: &LineItem<'_>) -> Result<PricedItem, PricingError> {
    PriceCalculator::default().price(0, item, &mut NoopObserver)
}

/// Exact pre-tax subtotal of an item in major currency units.
///
/// Missing dimensions are read as zero.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the arithmetic cannot be represented.
pub fn pre_tax_subtotal(item: &LineItem<'_>) -> Result<Decimal, PricingError> {
    let price = decimal_from_money(item.unit_price()).map_err(|err| overflow(item, &err))?;
    let quantity = Decimal::from(item.quantity());
    let dimension = |dimension| {
        item.specification()
            .value(dimension)
            .unwrap_or(Decimal::ZERO)
    };

    let factors: SmallVec<[Decimal; 4]> = match item.product() {
        ProductKind::SublimationPaper(RollFormat::JumboRoll) | ProductKind::ProtectPaper => {
            SmallVec::from_slice(&[price, dimension(Dimension::WeightKg)])
        }
        ProductKind::SublimationPaper(RollFormat::Roll) => {
            let width_m = dimension(Dimension::WidthMm) / Decimal::ONE_THOUSAND;

            SmallVec::from_slice(&[price, width_m, dimension(Dimension::LengthM), quantity])
        }
        ProductKind::DtfFilm | ProductKind::Ink | ProductKind::Unclassified(_) => {
            SmallVec::from_slice(&[price, quantity])
        }
    };

    factors
        .into_iter()
        .try_fold(Decimal::ONE, Decimal::checked_mul)
        .ok_or_else(|| PricingError::Overflow(item.description().to_string()))
}

/// Exact tax-inclusive amount of an item in major currency units.
fn tax_inclusive(item: &LineItem<'_>) -> Result<Decimal, PricingError> {
    let factor = Decimal::ONE + item.tax_rate() * Decimal::ONE;

    pre_tax_subtotal(item)?
        .checked_mul(factor)
        .ok_or_else(|| PricingError::Overflow(item.description().to_string()))
}

fn overflow(item: &LineItem<'_>, err: &rust_decimal::Error) -> PricingError {
    PricingError::Overflow(format!("{} ({err})", item.description()))
}

/// Convert money to a decimal amount in major units.
///
/// # Errors
///
/// Returns an error if the currency exponent exceeds the decimal scale limit.
pub fn decimal_from_money(money: &Money<'_, Currency>) -> Result<Decimal, rust_decimal::Error> {
    Decimal::try_new(money.to_minor_units(), money.currency().exponent)
}

/// Round a decimal amount to the currency's minor units (midpoint away from zero).
///
/// # Errors
///
/// Returns an error if the rounded amount does not fit in `i64` minor units.
pub fn money_from_decimal(
    amount: Decimal,
    currency: &Currency,
) -> Result<Money<'_, Currency>, rust_decimal::Error> {
    let mut rounded =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(currency.exponent);

    let minor = i64::try_from(rounded.mantissa())
        .map_err(|_err| rust_decimal::Error::ExceedsMaximumPossibleValue)?;

    Ok(Money::from_minor(minor, currency))
}

/// Display an exact amount as money in `currency`, rounded to its minor units.
///
/// Amounts too large for minor units are shown unrounded with the currency code.
pub fn format_amount(amount: Decimal, currency: &Currency) -> String {
    money_from_decimal(amount, currency).map_or_else(
        |_err| format!("{} {}", amount.normalize(), currency.iso_alpha_code),
        |money| money.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{IDR, USD};
    use testresult::TestResult;

    use crate::products::Specification;

    use super::*;

    fn idr(major: i64) -> Result<Money<'static, Currency>, rust_decimal::Error> {
        money_from_decimal(Decimal::from(major), IDR)
    }

    fn roll(width_mm: i64, length_m: i64) -> Specification {
        Specification {
            gsm: Some(100),
            width_mm: Some(Decimal::from(width_mm)),
            length_m: Some(Decimal::from(length_m)),
            weight_kg: None,
        }
    }

    fn weight(kg: i64) -> Specification {
        Specification {
            weight_kg: Some(Decimal::from(kg)),
            ..Specification::default()
        }
    }

    #[derive(Default)]
    struct Recorder {
        priced: Vec<(usize, bool)>,
    }

    impl Observer for Recorder {
        fn on_item_priced(&mut self, item_idx: usize, _item: &LineItem<'_>, priced: &PricedItem) {
            self.priced.push((item_idx, priced.is_degraded()));
        }
    }

    #[test]
    fn roll_is_priced_by_area_and_quantity() -> TestResult {
        let item = LineItem::new(
            "Sublimation 100gsm",
            ProductKind::SublimationPaper(RollFormat::Roll),
            idr(10_000)?,
        )?
        .with_specification(roll(1000, 50))
        .with_quantity(2)?
        .with_tax_percent(Decimal::from(10))?;

        assert_eq!(pre_tax_subtotal(&item)?, Decimal::from(1_000_000));
        assert_eq!(
            compute_item_amount(&item)?,
            PricedItem::Complete(Decimal::from(1_100_000))
        );

        Ok(())
    }

    #[test]
    fn jumbo_roll_is_priced_by_weight() -> TestResult {
        let item = LineItem::new(
            "Jumbo 70gsm",
            ProductKind::SublimationPaper(RollFormat::JumboRoll),
            idr(5_000)?,
        )?
        .with_specification(weight(20))
        .with_quantity(3)?;

        // Quantity does not take part in the weight formula.
        assert_eq!(compute_item_amount(&item)?.amount(), Decimal::from(100_000));

        Ok(())
    }

    #[test]
    fn protect_paper_is_priced_by_weight_with_tax() -> TestResult {
        let item = LineItem::new("Protect 30gsm", ProductKind::ProtectPaper, idr(12_000)?)?
            .with_specification(weight(15))
            .with_tax_percent(Decimal::from(11))?;

        assert_eq!(compute_item_amount(&item)?.amount(), Decimal::from(199_800));

        Ok(())
    }

    #[test]
    fn film_and_ink_are_priced_per_unit() -> TestResult {
        for kind in [ProductKind::DtfFilm, ProductKind::Ink] {
            let item = LineItem::new("unit", kind, idr(250_000)?)?
                .with_quantity(4)?
                .with_tax_percent(Decimal::from(10))?;

            assert_eq!(
                compute_item_amount(&item)?,
                PricedItem::Complete(Decimal::from(1_100_000))
            );
        }

        Ok(())
    }

    #[test]
    fn missing_dimension_degrades_to_zero() -> TestResult {
        let item = LineItem::new(
            "Roll without length",
            ProductKind::SublimationPaper(RollFormat::Roll),
            idr(10_000)?,
        )?
        .with_specification(Specification {
            width_mm: Some(Decimal::from(1000)),
            ..Specification::default()
        });

        let priced = compute_item_amount(&item)?;

        assert_eq!(priced.amount(), Decimal::ZERO);
        assert_eq!(
            priced.degradation(),
            Some(&Degradation::MissingDimensions(SmallVec::from_slice(&[
                Dimension::LengthM
            ])))
        );

        Ok(())
    }

    #[test]
    fn missing_weight_is_rejected_under_strict_policy() -> TestResult {
        let item = LineItem::new("Protect", ProductKind::ProtectPaper, idr(12_000)?)?;
        let calculator = PriceCalculator::new(PricingPolicy::strict());

        let result = calculator.price(0, &item, &mut NoopObserver);

        assert!(matches!(
            result,
            Err(PricingError::MissingDimensions { ref missing, .. }) if missing.as_slice() == [Dimension::WeightKg]
        ));

        Ok(())
    }

    #[test]
    fn unclassified_item_falls_back_to_unit_price_times_quantity() -> TestResult {
        let item = LineItem::new("Mystery", ProductKind::Unclassified(None), idr(7_500)?)?
            .with_quantity(4)?
            .with_tax_percent(Decimal::from(10))?;

        let priced = compute_item_amount(&item)?;

        assert_eq!(priced.amount(), Decimal::from(33_000));
        assert_eq!(
            priced.degradation(),
            Some(&Degradation::UnclassifiedProduct(None))
        );

        Ok(())
    }

    #[test]
    fn unclassified_item_is_rejected_under_strict_policy() -> TestResult {
        let item = LineItem::new(
            "Vinyl",
            ProductKind::Unclassified(Some("Vinyl".to_string())),
            idr(7_500)?,
        )?;
        let calculator = PriceCalculator::new(PricingPolicy::strict());

        assert_eq!(
            calculator.price(0, &item, &mut NoopObserver),
            Err(PricingError::UnclassifiedProduct {
                item: "Vinyl".to_string(),
                label: Some("Vinyl".to_string()),
            })
        );

        Ok(())
    }

    #[test]
    fn fractional_amounts_are_kept_exact() -> TestResult {
        // 0.05 USD * 1118 mm / 1000 * 1 m = 0.0559
        let item = LineItem::new(
            "Sample",
            ProductKind::SublimationPaper(RollFormat::Roll),
            Money::from_minor(5, USD),
        )?
        .with_specification(roll(1118, 1));

        let amount = compute_item_amount(&item)?.amount();

        assert_eq!(amount, Decimal::new(559, 4));
        assert_eq!(format_amount(amount, USD), Money::from_minor(6, USD).to_string());

        Ok(())
    }

    #[test]
    fn oversized_amount_is_displayed_unrounded() {
        let amount = Decimal::MAX;

        assert!(format_amount(amount, IDR).ends_with(" IDR"));
    }

    #[test]
    fn observer_is_notified_for_each_priced_item() -> TestResult {
        let calculator = PriceCalculator::default();
        let mut recorder = Recorder::default();
        let complete = LineItem::new("Ink", ProductKind::Ink, idr(1)?)?;
        let degraded = LineItem::new("Protect", ProductKind::ProtectPaper, idr(1)?)?;

        calculator.price(0, &complete, &mut recorder)?;
        calculator.price(1, &degraded, &mut recorder)?;

        assert_eq!(recorder.priced, vec![(0, false), (1, true)]);

        Ok(())
    }

    #[test]
    fn money_round_trips_through_decimal() -> TestResult {
        let money = Money::from_minor(12_345, USD);
        let amount = decimal_from_money(&money)?;

        assert_eq!(amount, Decimal::new(12_345, 2));
        assert_eq!(money_from_decimal(amount, USD)?, money);

        Ok(())
    }
}
