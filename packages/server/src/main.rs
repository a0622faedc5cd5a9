#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Glamping map API server binary.

use clap::Parser;

#[derive(Parser)]
#[command(name = "glamping_map_server", about = "Glamping map API server")]
struct Cli {
    /// Prompt for bind address and port before starting.
    #[arg(long, short)]
    interactive: bool,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    if cli.interactive {
        glamping_map_server::interactive::run().await?;
    } else {
        glamping_map_server::run_server().await?;
    }

    Ok(())
}
