//! `occi-parse`: parses an OCCI body and renders it again.
//!
//! **Usage:**
//! ```text
//! occi-parse <file> [--media-type <mt>] [--what model|entities|actions|locations]
//!            [--format text|headers|json|uri-list] [--strict] [--config <file.toml>]
//! ```
//!
//! `<file>` may be `-` for standard input. Category bodies are registered on
//! top of the core and infrastructure model, which is then printed whole.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use occi_clients::{base_model, init_tracing, load_options, read_body, OutputFormat};
use occi_core::renderer::{headers, render, text, Format};
use occi_core::Collection;
use occi_parser::{
    media_type, parse_action_instances, parse_entities, parse_locations, parse_model,
};

/// What the body holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum What {
    /// Category definitions.
    Model,
    /// Resources and links.
    Entities,
    /// Action invocations.
    Actions,
    /// Bare locations.
    Locations,
}

/// Parse an OCCI body and render the result.
#[derive(Parser)]
#[command(name = "occi-parse", about = "Parse an OCCI body and render it again")]
struct Args {
    /// Body to parse; `-` reads standard input.
    file: PathBuf,

    /// Media type of the body.
    #[arg(long, default_value = "text/plain")]
    media_type: String,

    /// What the body holds.
    #[arg(long, value_enum, default_value_t = What::Entities)]
    what: What,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

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
    let mut model = base_model(args.extensions)?;
    let format: Format = args.format.into();
    tracing::debug!(what = ?args.what, %media_type, strict = options.strict, "parsing body");

    let output = match args.what {
        What::Model => {
            parse_model(&body, media_type, &mut model, &options)
                .context("failed to parse categories")?;
            render(&model, format)?
        }
        What::Entities => {
            let entities = parse_entities(&body, media_type, &model, &options, None)
                .context("failed to parse entities")?;
            if format == Format::Headers && entities.len() == 1 {
                render(&entities[0], format)?
            } else {
                render(&Collection { entities }, format)?
            }
        }
        What::Actions => {
            let instances = parse_action_instances(&body, media_type, &model, &options)
                .context("failed to parse action instances")?;
            instances
                .iter()
                .map(|instance| render(instance, format))
                .collect::<occi_core::Result<Vec<_>>>()?
                .join("\n")
        }
        What::Locations => {
            let locations = parse_locations(&body, media_type, &options)
                .context("failed to parse locations")?;
            match format {
                Format::Text => text::location_lines(&locations).join("\n"),
                Format::Headers => headers::fold(&text::location_lines(&locations)).join("\n"),
                Format::Json => serde_json::to_string_pretty(&locations)?,
                Format::UriList => locations.join("\n"),
            }
        }
    };
    println!("{}", output.trim_end());
    Ok(())
}
