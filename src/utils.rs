//! Utils

use std::path::PathBuf;

use clap::Parser;

use crate::logging::LoggingConfig;

/// Arguments for the invoice demo
#[derive(Debug, Parser)]
pub struct ExampleInvoiceArgs {
    /// Fixture set to render (orders/<set>.yml and customers/<set>.yml)
    #[clap(short, long, default_value = "standard")]
    pub fixture: String,

    /// Directory holding the fixture sets
    #[clap(long, default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Invoice configuration file (YAML)
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Output PDF path; defaults to `<invoice number>.pdf`
    #[clap(short, long)]
    pub out: Option<PathBuf>,

    /// Reject degraded items instead of pricing them with defaults
    #[clap(long)]
    pub strict: bool,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_demo_arguments() -> TestResult {
        let args = ExampleInvoiceArgs::try_parse_from([
            "invoice",
            "--fixture",
            "overflow",
            "--out",
            "out.pdf",
            "--strict",
        ])?;

        assert_eq!(args.fixture, "overflow");
        assert_eq!(args.out, Some(PathBuf::from("out.pdf")));
        assert!(args.strict);
        assert!(args.config.is_none());

        Ok(())
    }
}
