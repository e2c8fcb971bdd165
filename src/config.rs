//! Invoice configuration
//!
//! Company profile, pricing policy and page geometry. Every field has a default so
//! a partial YAML file (or none at all) is valid.

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::pricing::PricingPolicy;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Top-level invoice configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    /// Seller details printed in every header.
    pub company: CompanyProfile,

    /// How degraded items are handled.
    pub pricing: PricingPolicy,

    /// Page geometry.
    pub layout: LayoutConfig,
}

impl InvoiceConfig {
    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the YAML is malformed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }
}

/// Seller details and fixed footer text.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    /// Company name.
    pub name: String,

    /// Address lines; at most two are printed.
    pub address: Vec<String>,

    /// Contact phone number.
    pub phone: Option<String>,

    /// Warranty notice lines printed above the signatures.
    pub warranty: Vec<String>,

    /// Labels under the two signature placeholders.
    pub signatures: [String; 2],
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: String::from("Papyrus Supplies"),
            address: Vec::new(),
            phone: None,
            warranty: vec![
                String::from("Goods once purchased can only be returned within 7 days with this invoice."),
                String::from("Claims for damaged rolls must include the roll label."),
            ],
            signatures: [String::from("Received by"), String::from("Authorised by")],
        }
    }
}

/// Page geometry in millimetres and font sizes in points.
///
/// Each half-invoice is `page_height_mm / 2` tall. Within a half, the header,
/// table header and footer are fixed blocks; whatever remains holds item rows.
/// The renderer rejects geometry it cannot draw into, such as a footer too
/// short for the signature labels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Page width.
    pub page_width_mm: f32,

    /// Page height.
    pub page_height_mm: f32,

    /// Margin around each half.
    pub margin_mm: f32,

    /// Height of the company/customer header block.
    pub header_height_mm: f32,

    /// Height of the column header grid.
    pub table_header_height_mm: f32,

    /// Height of one item row.
    pub row_height_mm: f32,

    /// Height reserved for totals, warranty and signatures.
    pub footer_height_mm: f32,

    /// Body text size.
    pub font_size_pt: f32,

    /// Title text size.
    pub title_font_size_pt: f32,
}

impl LayoutConfig {
    /// Height of one half-invoice region.
    pub fn half_height_mm(&self) -> f32 {
        self.page_height_mm / 2.0
    }

    /// Width available to the item table.
    pub fn table_width_mm(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 8.0,
            header_height_mm: 34.0,
            table_header_height_mm: 7.0,
            row_height_mm: 6.0,
            footer_height_mm: 42.0,
            font_size_pt: 8.0,
            title_font_size_pt: 13.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::pricing::{MissingDimensionPolicy, UnclassifiedPolicy};

    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() -> TestResult {
        let config = InvoiceConfig::from_yaml_str("{}")?;

        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.pricing, PricingPolicy::default());
        assert_eq!(
            config.company.signatures.first().map(String::as_str),
            Some("Received by")
        );

        Ok(())
    }

    #[test]
    fn partial_yaml_overrides_only_given_fields() -> TestResult {
        let config = InvoiceConfig::from_yaml_str(
            "
company:
  name: CV Kertas Prima
  address: [Jl. Industri 12, Bandung]
pricing:
  unclassified: reject
layout:
  row_height_mm: 5.0
",
        )?;

        assert_eq!(config.company.name, "CV Kertas Prima");
        assert_eq!(config.company.address.len(), 2);
        assert!(!config.company.warranty.is_empty());
        assert_eq!(config.pricing.unclassified, UnclassifiedPolicy::Reject);
        assert_eq!(
            config.pricing.missing_dimensions,
            MissingDimensionPolicy::Degrade
        );
        assert!((config.layout.row_height_mm - 5.0).abs() < f32::EPSILON);
        assert!((config.layout.page_width_mm - 210.0).abs() < f32::EPSILON);

        Ok(())
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = InvoiceConfig::from_yaml_str("layout: [1, 2");

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn derived_dimensions() {
        let layout = LayoutConfig::default();

        assert!((layout.half_height_mm() - 148.5).abs() < f32::EPSILON);
        assert!((layout.table_width_mm() - 194.0).abs() < f32::EPSILON);
    }
}
