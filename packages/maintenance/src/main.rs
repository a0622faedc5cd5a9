#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Maintenance CLI for the glamping map properties table.

use clap::{Parser, Subcommand};
use glamping_map_database::db;

#[derive(Parser)]
#[command(name = "glamping_map_maintenance", about = "Property data upkeep")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign URL slugs to properties that have none
    AssignSlugs {
        /// Write the slugs instead of only reporting them
        #[arg(long)]
        apply: bool,
    },
    /// Fill missing countries from coordinates
    FillCountries {
        /// Write the inferred countries instead of only reporting them
        #[arg(long)]
        apply: bool,
    },
    /// Report state values stored as abbreviations or odd casing
    NormalizeStates,
    /// Count properties by coordinate quality
    AuditCoordinates,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let store = db::connect_from_env()?;
    let store = store.as_ref();

    match cli.command {
        Commands::AssignSlugs { apply } => {
            let report = glamping_map_maintenance::assign_missing_slugs(store, apply).await?;
            for fill in &report.missing {
                println!("  {:>8}  {}", fill.id, fill.value);
            }
            for conflict in &report.conflicts {
                log::warn!(
                    "Property {} has slug {:?}, expected {:?}",
                    conflict.id,
                    conflict.current,
                    conflict.planned
                );
            }
            println!(
                "{} missing, {} conflicting, {} unnamed, {} written",
                report.missing.len(),
                report.conflicts.len(),
                report.unnamed,
                report.written
            );
            if !apply && !report.missing.is_empty() {
                println!("Dry run; pass --apply to write.");
            }
        }
        Commands::FillCountries { apply } => {
            let report = glamping_map_maintenance::fill_missing_countries(store, apply).await?;
            for fill in &report.inferred {
                println!("  {:>8}  {}", fill.id, fill.value);
            }
            for spelling in &report.variant_spellings {
                log::info!(
                    "Property {} stores country {:?}; canonical is {:?}",
                    spelling.id,
                    spelling.current,
                    spelling.canonical
                );
            }
            println!(
                "{} inferred, {} unresolved, {} variant spellings, {} written",
                report.inferred.len(),
                report.unresolved,
                report.variant_spellings.len(),
                report.written
            );
            if !apply && !report.inferred.is_empty() {
                println!("Dry run; pass --apply to write.");
            }
        }
        Commands::NormalizeStates => {
            let suggestions = glamping_map_maintenance::suggest_state_names(store).await?;
            let tally = glamping_map_maintenance::tally_states(&suggestions);
            for ((current, canonical, abbreviation), count) in tally {
                println!("  {current:>24} -> {canonical} [{abbreviation}] ({count})");
            }
            let mismatched = suggestions.iter().filter(|s| s.country_mismatch).count();
            if mismatched > 0 {
                log::warn!("{mismatched} state values disagree with their row's country");
            }
        }
        Commands::AuditCoordinates => {
            let audit = glamping_map_maintenance::audit_coordinates(store).await?;
            println!("Total:        {}", audit.total);
            println!("Valid:        {}", audit.valid);
            println!("Missing:      {}", audit.missing);
            println!("Invalid:      {}", audit.invalid);
            println!("Out of area:  {}", audit.out_of_area);
        }
    }

    Ok(())
}
