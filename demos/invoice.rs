//! Invoice Example
//!
//! Prices a fixture order, prints a summary table and writes the invoice PDF.
//!
//! Use `-f` to load a fixture set by name
//! Use `-c` to load an invoice configuration file
//! Use `-o` to choose the PDF filename in `target/invoices`
//! Use `--strict` to reject degraded items

use std::{fs, io, path::PathBuf, time::Instant};

use anyhow::Result;

use clap::Parser;
use papyrus::{
    config::InvoiceConfig,
    fixtures::Fixture,
    invoice::InvoiceRenderer,
    logging::init_logging,
    observer::TracingObserver,
    pricing::{PriceCalculator, PricingPolicy},
    summary::write_summary,
    utils::ExampleInvoiceArgs,
};
use tracing::warn;

/// Invoice Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = ExampleInvoiceArgs::parse();

    init_logging(&args.logging)?;

    let mut config = match &args.config {
        Some(path) => InvoiceConfig::load(path)?,
        None => InvoiceConfig::default(),
    };

    if args.strict {
        config.pricing = PricingPolicy::strict();
    }

    let mut fixture = Fixture::with_base_path(&args.fixtures_dir);
    fixture
        .load_order(&args.fixture)?
        .load_customers(&args.fixture)?;

    let order = fixture.order()?;
    let mut observer = TracingObserver;

    let totals = order.totals(&PriceCalculator::new(config.pricing), &mut observer)?;

    if let Err(err) = order.reconcile(&totals) {
        if order.items().is_empty() {
            warn!(%err, "stored total differs; invoice shows the stored total");
        } else {
            warn!(%err, "stored total differs; invoice shows the computed total");
        }
    }

    let stdout = io::stdout();
    write_summary(stdout.lock(), &order, &totals)?;

    let start = Instant::now();

    let renderer = InvoiceRenderer::new(config);
    let pdf = renderer.render_invoice_for(&order, fixture.customers(), &mut observer)?;

    let elapsed = start.elapsed().as_secs_f32();

    let output_dir = PathBuf::from("target").join("invoices");
    fs::create_dir_all(&output_dir)?;

    let output_path = output_dir.join(
        args.out
            .unwrap_or_else(|| PathBuf::from(format!("{}.pdf", order.number()))),
    );

    fs::write(&output_path, &pdf)?;

    println!("Wrote {} ({} bytes) in {elapsed}s", output_path.display(), pdf.len());

    Ok(())
}
