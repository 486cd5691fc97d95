//! Writes the checkout API's OpenAPI document as pretty JSON, to stdout or `--output`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use storefront_checkout::gateway::openapi::ApiDoc;
use utoipa::OpenApi;

#[derive(Parser, Debug)]
#[command(name = "export_openapi", about = "Export the checkout OpenAPI document")]
struct Args {
    /// Destination file; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("serializing OpenAPI document")?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("OpenAPI document written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
