//! Papyrus prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    config::{CompanyProfile, ConfigError, InvoiceConfig, LayoutConfig},
    customers::{Customer, CustomerDirectory, CustomerFetchError, CustomerSource},
    fixtures::{Fixture, FixtureError},
    invoice::{
        HalfState, InvoiceError, InvoiceRenderer,
        cursor::{Half, PageLayoutCursor},
        document::Document,
    },
    items::{ItemError, LineItem},
    observer::{NoopObserver, Observer, TracingObserver},
    orders::{Order, OrderError, OrderTotals, compute_order_total},
    pdf::{PdfError, write_pdf},
    pricing::{
        Degradation, MissingDimensionPolicy, PriceCalculator, PricedItem, PricingError,
        PricingPolicy, UnclassifiedPolicy, compute_item_amount, format_amount,
    },
    products::{Dimension, ProductKind, RollFormat, Specification},
    summary::{SummaryError, write_summary},
};
