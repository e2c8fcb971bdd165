//! Fixtures
//!
//! YAML fixture sets for demos and tests. A set named `standard` is read from
//! `<base>/orders/standard.yml` and `<base>/customers/standard.yml`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    customers::{Customer, CustomerDirectory},
    fixtures::orders::{OrderFile, OrderFixture},
    items::ItemError,
    orders::{Order, OrderError},
};

pub mod orders;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch within an order
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Line item rejected
    #[error("Invalid line item {item}: {source}")]
    Item {
        /// Item description
        item: String,

        /// Validation failure
        #[source]
        source: ItemError,
    },

    /// Order rejected
    #[error("Invalid order: {0}")]
    Order(#[from] OrderError),

    /// No order loaded
    #[error("No order loaded")]
    NoOrder,
}

/// Wrapper for customers in YAML
#[derive(Debug, Deserialize)]
pub struct CustomersFile {
    /// Map of customer id -> customer
    pub customers: FxHashMap<String, Customer>,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Raw order, converted on demand
    order: Option<OrderFixture>,

    /// Customers loaded so far
    customers: CustomerDirectory,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            order: None,
            customers: CustomerDirectory::new(),
        }
    }

    /// Load the order and customers of a fixture set
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_order(name)?.load_customers(name)?;

        Ok(fixture)
    }

    /// Load an order from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_order(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let file: OrderFile = serde_norway::from_str(&contents)?;

        self.order = Some(file.order);

        Ok(self)
    }

    /// Load customers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_customers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("customers").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let file: CustomersFile = serde_norway::from_str(&contents)?;

        for (customer_id, customer) in file.customers {
            self.customers.insert(customer_id, customer);
        }

        Ok(self)
    }

    /// Build the loaded order
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoOrder`] if no order has been loaded, or an error
    /// if any price, tax rate or item in it is invalid.
    pub fn order(&self) -> Result<Order<'static>, FixtureError> {
        let fixture = self.order.as_ref().ok_or(FixtureError::NoOrder)?;

        Order::try_from(fixture.clone())
    }

    /// Customers loaded so far
    pub fn customers(&self) -> &CustomerDirectory {
        &self.customers
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use testresult::TestResult;

    use crate::{customers::CustomerSource, fixtures::orders::parse_price};

    use super::*;

    fn write_set(dir: &TempDir, order: &str, customers: &str) -> TestResult {
        fs::create_dir_all(dir.path().join("orders"))?;
        fs::create_dir_all(dir.path().join("customers"))?;
        fs::write(dir.path().join("orders").join("tiny.yml"), order)?;
        fs::write(dir.path().join("customers").join("tiny.yml"), customers)?;

        Ok(())
    }

    #[test]
    fn loads_order_and_customers_from_a_set() -> TestResult {
        let dir = TempDir::new()?;

        write_set(
            &dir,
            "
order:
  number: INV-T-1
  issued_on: 2024-05-14
  customer: cust-1
  currency: IDR
  discount: 5000 IDR
  items:
    - description: Black ink 1L
      product_type: Ink
      quantity: 3
      price: 150000 IDR
      tax: 11%
",
            "
customers:
  cust-1:
    name: Toko Sablon Jaya
    phone: 022-555-0101
",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_order("tiny")?.load_customers("tiny")?;

        let order = fixture.order()?;
        let customer = fixture.customers().fetch(order.customer_id())?;

        assert_eq!(order.number(), "INV-T-1");
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.discount(), parse_price("5000 IDR")?);
        assert_eq!(customer.name, "Toko Sablon Jaya");
        assert!(customer.address.is_none());

        Ok(())
    }

    #[test]
    fn order_without_loading_is_an_error() {
        let fixture = Fixture::with_base_path("/nonexistent");

        assert!(matches!(fixture.order(), Err(FixtureError::NoOrder)));
    }

    #[test]
    fn missing_set_is_an_io_error() {
        let mut fixture = Fixture::with_base_path("/nonexistent");

        assert!(matches!(
            fixture.load_order("nope"),
            Err(FixtureError::Io(_))
        ));
    }

    #[test]
    fn invalid_item_names_the_item() -> TestResult {
        let dir = TempDir::new()?;

        write_set(
            &dir,
            "
order:
  number: INV-T-2
  issued_on: 2024-05-14
  customer: cust-1
  currency: IDR
  items:
    - description: Zero film
      product_type: DTF Film
      quantity: 0
      price: 1000 IDR
",
            "customers: {}",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_order("tiny")?;

        assert!(matches!(
            fixture.order(),
            Err(FixtureError::Item { item, .. }) if item == "Zero film"
        ));

        Ok(())
    }
}
