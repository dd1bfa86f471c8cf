//! Print the OpenAPI document as JSON, or write it to `--output`.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use shop_items::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Emit the shop items OpenAPI document as pretty-printed JSON",
    version
)]
struct CliArgs {
    /// Write to this file instead of standard output.
    #[arg(long = "output", short = 'o', value_name = "path")]
    output: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|error| io::Error::other(format!("serialise OpenAPI document: {error}")))?;

    match args.output {
        Some(path) => std::fs::write(&path, format!("{json}\n")).map_err(|error| {
            io::Error::other(format!("write {}: {error}", path.display()))
        }),
        None => writeln!(io::stdout().lock(), "{json}"),
    }
}
