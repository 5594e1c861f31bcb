//! `occi-validate`: parses entities and validates each against the model.
//!
//! **Usage:**
//! ```text
//! occi-validate <file> [--media-type <mt>] [--strict] [--config <file.toml>]
//! ```
//!
//! Exits non-zero if any entity fails validation.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use occi_clients::{base_model, init_tracing, load_options, read_body};
use occi_parser::{media_type, parse_entities};

/// Validate OCCI entities.
#[derive(Parser)]
#[command(name = "occi-validate", about = "Validate OCCI entities against the model")]
struct Args {
    /// Body to validate; `-` reads standard input.
    file: PathBuf,

    /// Media type of the body.
    #[arg(long, default_value = "text/plain")]
    media_type: String,

    /// Reject terms and attribute names with a leading digit.
    #[arg(long)]
    strict: bool,

    /// Parser options file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resolve against the extension catalog too.
    #[arg(long)]
    extensions: bool,

    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let options = load_options(args.config.as_deref(), args.strict)?;
    let media_type = media_type(&args.media_type)?;
    let body = read_body(&args.file)?;
    let model = base_model(args.extensions)?;
    let entities = parse_entities(&body, media_type, &model, &options, None)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    tracing::debug!(count = entities.len(), "parsed entities");

    println!("OCCI Validation Report");
    println!("======================");
    println!();

    let mut failed = 0usize;
    for entity in &entities {
        let subject = entity
            .location()
            .or_else(|| entity.id())
            .unwrap_or("<anonymous>");
        match entity.valid(&model) {
            Ok(()) => println!("[PASS] {} {subject}", entity.kind()),
            Err(e) => {
                failed += 1;
                println!("[FAIL] {} {subject}: {e}", entity.kind());
            }
        }
    }

    println!();
    println!(
        "Summary: {} passed, {} failed",
        entities.len() - failed,
        failed
    );

    if failed > 0 {
        eprintln!("Validation FAILED: {failed} entit(ies) did not validate.");
        process::exit(1);
    }

    println!("Validation PASSED.");
    Ok(())
}
