//! Customers

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised when a customer record cannot be retrieved.
#[derive(Debug, Error, PartialEq)]
pub enum CustomerFetchError {
    /// No customer with this id exists.
    #[error("customer not found: {0}")]
    NotFound(String),

    /// The backing source could not be reached.
    #[error("customer source unavailable: {0}")]
    Unavailable(String),
}

/// Customer shown in the invoice header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Customer {
    /// Display name.
    pub name: String,

    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,

    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

impl Customer {
    /// Create a customer with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            phone: None,
        }
    }
}

/// Somewhere customers can be fetched from before an invoice is rendered.
///
/// Fetch failures are surfaced to the caller unchanged; nothing retries.
pub trait CustomerSource {
    /// Fetch a customer by id.
    ///
    /// # Errors
    ///
    /// Returns a [`CustomerFetchError`] if the customer cannot be retrieved.
    fn fetch(&self, customer_id: &str) -> Result<Customer, CustomerFetchError>;
}

/// In-memory customer directory keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CustomerDirectory {
    customers: FxHashMap<String, Customer>,
}

impl CustomerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a customer.
    pub fn insert(&mut self, customer_id: impl Into<String>, customer: Customer) {
        self.customers.insert(customer_id.into(), customer);
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Returns true if the directory has no customers.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

impl FromIterator<(String, Customer)> for CustomerDirectory {
    fn from_iter<I: IntoIterator<Item = (String, Customer)>>(iter: I) -> Self {
        Self {
            customers: iter.into_iter().collect(),
        }
    }
}

impl CustomerSource for CustomerDirectory {
    fn fetch(&self, customer_id: &str) -> Result<Customer, CustomerFetchError> {
        self.customers
            .get(customer_id)
            .cloned()
            .ok_or_else(|| CustomerFetchError::NotFound(customer_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn directory_fetches_known_customers() -> TestResult {
        let mut directory = CustomerDirectory::new();
        directory.insert("c-1", Customer::new("Toko Sablon Jaya"));

        assert_eq!(directory.fetch("c-1")?, Customer::new("Toko Sablon Jaya"));
        assert_eq!(directory.len(), 1);

        Ok(())
    }

    #[test]
    fn directory_reports_unknown_customers() {
        let directory = CustomerDirectory::new();

        assert_eq!(
            directory.fetch("missing"),
            Err(CustomerFetchError::NotFound("missing".to_string()))
        );
    }
}
