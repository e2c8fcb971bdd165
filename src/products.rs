//! Products
//!
//! The closed set of product kinds the engine knows how to price, plus the
//! optional specification dimensions a line item may carry.

use std::fmt;

use rust_decimal::Decimal;
use smallvec::SmallVec;

/// How a sublimation paper roll is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollFormat {
    /// Large roll sold by weight.
    JumboRoll,

    /// Standard roll sold by area and roll count.
    Roll,
}

impl RollFormat {
    /// Parse a roll format label such as `"Jumbo Roll"` or `"roll"`.
    pub fn from_label(label: &str) -> Option<Self> {
        match normalise_label(label).as_str() {
            "jumboroll" | "jumbo" => Some(RollFormat::JumboRoll),
            "roll" => Some(RollFormat::Roll),
            _ => None,
        }
    }
}

impl fmt::Display for RollFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollFormat::JumboRoll => f.write_str("Jumbo Roll"),
            RollFormat::Roll => f.write_str("Roll"),
        }
    }
}

/// Product kind of a line item.
///
/// Each kind maps to exactly one pricing formula. Items whose type is missing or
/// unrecognised are carried as [`ProductKind::Unclassified`] so the calculator
/// can report them instead of silently guessing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductKind {
    /// Sublimation paper, priced according to its roll format.
    SublimationPaper(RollFormat),

    /// Protect paper, priced by weight.
    ProtectPaper,

    /// DTF film, priced per unit.
    DtfFilm,

    /// Ink, priced per bottle.
    Ink,

    /// Missing or unrecognised product type, with the raw label if one was given.
    Unclassified(Option<String>),
}

impl ProductKind {
    /// Resolve a product kind from the type and sub-variant labels used by order records.
    ///
    /// Sublimation paper without a recognised roll format cannot be priced, so it
    /// resolves to [`ProductKind::Unclassified`] carrying the original type label.
    pub fn from_labels(product_type: Option<&str>, sub_variant: Option<&str>) -> Self {
        let Some(label) = product_type else {
            return ProductKind::Unclassified(None);
        };

        match normalise_label(label).as_str() {
            "sublimationpaper" => sub_variant
                .and_then(RollFormat::from_label)
                .map_or_else(
                    || ProductKind::Unclassified(Some(label.to_string())),
                    ProductKind::SublimationPaper,
                ),
            "protectpaper" => ProductKind::ProtectPaper,
            "dtffilm" | "dtf" => ProductKind::DtfFilm,
            "ink" => ProductKind::Ink,
            _ => ProductKind::Unclassified(Some(label.to_string())),
        }
    }

    /// Dimensions the pricing formula for this kind reads.
    pub fn required_dimensions(&self) -> &'static [Dimension] {
        match self {
            ProductKind::SublimationPaper(RollFormat::JumboRoll) | ProductKind::ProtectPaper => {
                &[Dimension::WeightKg]
            }
            ProductKind::SublimationPaper(RollFormat::Roll) => {
                &[Dimension::WidthMm, Dimension::LengthM]
            }
            ProductKind::DtfFilm | ProductKind::Ink | ProductKind::Unclassified(_) => &[],
        }
    }

    /// Returns true if the kind has a known pricing formula.
    pub fn is_classified(&self) -> bool {
        !matches!(self, ProductKind::Unclassified(_))
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::SublimationPaper(format) => write!(f, "Sublimation Paper ({format})"),
            ProductKind::ProtectPaper => f.write_str("Protect Paper"),
            ProductKind::DtfFilm => f.write_str("DTF Film"),
            ProductKind::Ink => f.write_str("Ink"),
            ProductKind::Unclassified(Some(label)) => write!(f, "{label}"),
            ProductKind::Unclassified(None) => f.write_str("Unclassified"),
        }
    }
}

/// A numeric specification field read by a pricing formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Roll width in millimetres.
    WidthMm,

    /// Roll length in metres.
    LengthM,

    /// Weight in kilograms.
    WeightKg,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::WidthMm => f.write_str("width (mm)"),
            Dimension::LengthM => f.write_str("length (m)"),
            Dimension::WeightKg => f.write_str("weight (kg)"),
        }
    }
}

/// Optional specification attributes selected from inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Specification {
    /// Paper weight in grams per square metre.
    pub gsm: Option<u32>,

    /// Roll width in millimetres.
    pub width_mm: Option<Decimal>,

    /// Roll length in metres.
    pub length_m: Option<Decimal>,

    /// Weight in kilograms.
    pub weight_kg: Option<Decimal>,
}

impl Specification {
    /// Value of a pricing dimension, if present.
    pub fn value(&self, dimension: Dimension) -> Option<Decimal> {
        match dimension {
            Dimension::WidthMm => self.width_mm,
            Dimension::LengthM => self.length_m,
            Dimension::WeightKg => self.weight_kg,
        }
    }

    /// Dimensions required by `kind` that are absent from this specification.
    pub fn missing_for(&self, kind: &ProductKind) -> SmallVec<[Dimension; 3]> {
        kind.required_dimensions()
            .iter()
            .copied()
            .filter(|dimension| self.value(*dimension).is_none())
            .collect()
    }

    /// Short human readable summary, e.g. `100 gsm, 1000 mm x 50 m`.
    pub fn describe(&self) -> String {
        let mut parts: SmallVec<[String; 3]> = SmallVec::new();

        if let Some(gsm) = self.gsm {
            parts.push(format!("{gsm} gsm"));
        }

        match (self.width_mm, self.length_m) {
            (Some(width), Some(length)) => {
                parts.push(format!("{} mm x {} m", width.normalize(), length.normalize()));
            }
            (Some(width), None) => parts.push(format!("{} mm", width.normalize())),
            (None, Some(length)) => parts.push(format!("{} m", length.normalize())),
            (None, None) => {}
        }

        if let Some(weight) = self.weight_kg {
            parts.push(format!("{} kg", weight.normalize()));
        }

        parts.join(", ")
    }
}

/// Lowercase a label and drop everything that isn't alphanumeric.
fn normalise_label(label: &str) -> String {
    label
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_resolve_to_closed_kinds() {
        assert_eq!(
            ProductKind::from_labels(Some("Sublimation Paper"), Some("Jumbo Roll")),
            ProductKind::SublimationPaper(RollFormat::JumboRoll)
        );
        assert_eq!(
            ProductKind::from_labels(Some("sublimation-paper"), Some("ROLL")),
            ProductKind::SublimationPaper(RollFormat::Roll)
        );
        assert_eq!(
            ProductKind::from_labels(Some("Protect Paper"), None),
            ProductKind::ProtectPaper
        );
        assert_eq!(
            ProductKind::from_labels(Some("DTF Film"), None),
            ProductKind::DtfFilm
        );
        assert_eq!(ProductKind::from_labels(Some("Ink"), None), ProductKind::Ink);
    }

    #[test]
    fn sublimation_without_roll_format_is_unclassified() {
        assert_eq!(
            ProductKind::from_labels(Some("Sublimation Paper"), Some("Sheet")),
            ProductKind::Unclassified(Some("Sublimation Paper".to_string()))
        );
    }

    #[test]
    fn missing_or_unknown_type_is_unclassified() {
        assert_eq!(
            ProductKind::from_labels(None, None),
            ProductKind::Unclassified(None)
        );
        assert_eq!(
            ProductKind::from_labels(Some("Vinyl"), None),
            ProductKind::Unclassified(Some("Vinyl".to_string()))
        );
        assert!(!ProductKind::Unclassified(None).is_classified());
    }

    #[test]
    fn missing_for_lists_absent_required_dimensions() {
        let spec = Specification {
            width_mm: Some(Decimal::from(1000)),
            ..Specification::default()
        };

        let missing = spec.missing_for(&ProductKind::SublimationPaper(RollFormat::Roll));

        assert_eq!(missing.as_slice(), &[Dimension::LengthM]);
        assert!(spec.missing_for(&ProductKind::Ink).is_empty());
    }

    #[test]
    fn describe_joins_present_fields() {
        let spec = Specification {
            gsm: Some(100),
            width_mm: Some(Decimal::from(1118)),
            length_m: Some(Decimal::from(100)),
            weight_kg: None,
        };

        assert_eq!(spec.describe(), "100 gsm, 1118 mm x 100 m");
        assert_eq!(Specification::default().describe(), "");
    }
}
