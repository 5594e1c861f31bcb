//! `occi-model`: prints the bootstrapped OCCI model.
//!
//! **Usage:**
//! ```text
//! occi-model [--format text|headers|json] [--extensions]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use anyhow::{Context, Result};
use clap::Parser;
use occi_clients::{base_model, init_tracing, OutputFormat};
use occi_core::renderer::render;

/// Print the core and infrastructure categories.
#[derive(Parser)]
#[command(name = "occi-model", about = "Print the bootstrapped OCCI model")]
struct Args {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Include the extension catalog.
    #[arg(long)]
    extensions: bool,

    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let model = base_model(args.extensions)?;
    let output = render(&model, args.format.into()).context("failed to render the model")?;
    println!("{}", output.trim_end());
    Ok(())
}
