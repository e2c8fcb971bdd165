//! Papyrus
//!
//! Papyrus prices orders of printing consumables (sublimation paper, protect
//! paper, DTF film and ink), aggregates them into order totals with a capped
//! discount, and lays invoices out as half-page A4 sheets rendered to PDF.

pub mod config;
pub mod customers;
pub mod fixtures;
pub mod invoice;
pub mod items;
pub mod logging;
pub mod observer;
pub mod orders;
pub mod pdf;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod summary;
pub mod utils;
