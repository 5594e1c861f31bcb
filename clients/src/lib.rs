//! Shared plumbing for the OCCI command-line clients.
//!
//! The binaries under `src/bin/` read a body from a file or standard input,
//! hand it to [`occi_parser`], and print the result through the
//! [`occi_core::renderer`]. This module holds what they have in common:
//! logging setup, option loading and the CLI value enums.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use occi_core::renderer::Format;
use occi_core::Model;
use occi_parser::ParserOptions;
use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `warn`);
/// `verbose` forces `debug`. A second call is a no-op.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Reads parser options from an optional TOML file; `strict` overrides the
/// file's setting when set.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid options TOML.
pub fn load_options(config: Option<&Path>, strict: bool) -> Result<ParserOptions> {
    let text = match config {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => String::new(),
    };
    options_from_toml(&text, strict)
}

/// Parses options TOML; see [`load_options`].
///
/// # Errors
///
/// Returns an error for malformed TOML or unknown keys.
pub fn options_from_toml(text: &str, strict: bool) -> Result<ParserOptions> {
    let mut options: ParserOptions = toml::from_str(text).context("invalid parser options")?;
    options.strict |= strict;
    Ok(options)
}

/// Reads a body from `path`, or from standard input when `path` is `-`.
///
/// # Errors
///
/// Returns an error if the body cannot be read.
pub fn read_body(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("failed to read standard input")?;
        return Ok(body);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Bootstrapped registry: core and infrastructure, plus the extension
/// catalog when `extensions` is set.
///
/// # Errors
///
/// Returns an error if a catalog fails to register.
pub fn base_model(extensions: bool) -> Result<Model> {
    let model = if extensions {
        Model::with_extensions()
    } else {
        Model::with_infrastructure()
    };
    model.context("failed to bootstrap the model")
}

/// Output format flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `text/plain`
    Text,
    /// `text/occi`
    Headers,
    /// `application/occi+json`
    Json,
    /// `text/uri-list`
    UriList,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Format::Text,
            OutputFormat::Headers => Format::Headers,
            OutputFormat::Json => Format::Json,
            OutputFormat::UriList => Format::UriList,
        }
    }
}
