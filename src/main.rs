use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use freight_tariffs::{
    config::{
        database::{create_connection, create_tables},
        seed::{apply_seed, load_seed},
        settings::{Settings, load_default_settings},
    },
    core::{
        dashboard::{build_dashboard, format_dashboard_summary},
        directory::SeaDirectory,
        quotes::{QuoteFilter, cheapest_quotes},
        tariff::{archive_tariff, get_tariff, restore_tariff},
        validity::{refresh_states, today},
    },
    entities::EquipmentType,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Freight tariff validity tracking and KPI dashboard
#[derive(Parser)]
#[command(name = "freight-tariffs")]
#[command(version)]
#[command(about = "Freight tariff validity tracking and KPI dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the KPI dashboard
    Dashboard {
        /// Print the payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the cheapest active quotes for a lane
    Cheapest {
        /// Origin port id
        #[arg(long)]
        origin: Option<i64>,
        /// Destination port id
        #[arg(long)]
        destination: Option<i64>,
        /// Equipment code (e.g. 40HC)
        #[arg(long)]
        equipment: Option<EquipmentType>,
        /// Print the quotes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-persist tariff states that drifted since they were written
    RefreshStates,
    /// Load partners and tariffs from a TOML seed file
    Seed {
        /// Path to the seed file
        file: PathBuf,
    },
    /// Archive a tariff
    Archive {
        /// Tariff id
        id: i64,
    },
    /// Restore an archived tariff
    Restore {
        /// Tariff id
        id: i64,
    },
    /// Show a tariff as JSON, archived or not
    Show {
        /// Tariff id
        id: i64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load settings and open the database
    let settings = load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;
    let db = create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    run(cli.command, &db, &settings).await
}

async fn run(command: Command, db: &DatabaseConnection, settings: &Settings) -> Result<()> {
    let directory = SeaDirectory::new(db.clone());
    let today = today();

    match command {
        Command::Dashboard { json } => {
            let dashboard = build_dashboard(db, &directory, &settings.kpi, today).await?;
            if json {
                print_json(&dashboard)?;
            } else {
                print!("{}", format_dashboard_summary(&dashboard));
            }
        }
        Command::Cheapest {
            origin,
            destination,
            equipment,
            json,
        } => {
            let filter = QuoteFilter {
                origin_port_id: origin,
                destination_port_id: destination,
                equipment_type: equipment,
            };
            let quotes = cheapest_quotes(db, &directory, &filter, today).await?;
            if json {
                print_json(&quotes)?;
            } else if quotes.is_empty() {
                println!("No active tariffs match.");
            } else {
                for (rank, quote) in quotes.iter().enumerate() {
                    println!(
                        "{}. #{} {} | {} / {} | ${:.2} | {}d transit",
                        rank + 1,
                        quote.id,
                        quote.label,
                        quote.forwarder_name,
                        quote.carrier_name.as_deref().unwrap_or("-"),
                        quote.all_in_total,
                        quote.transit_time_days
                    );
                }
            }
        }
        Command::RefreshStates => {
            let changed = refresh_states(db, today).await?;
            println!("{changed} tariff state(s) updated.");
        }
        Command::Seed { file } => {
            let seed = load_seed(&file)?;
            let report = apply_seed(db, &directory, seed, settings, today).await?;
            println!(
                "Seeded {} partner(s) and {} tariff(s) from {}.",
                report.partners,
                report.tariffs,
                file.display()
            );
        }
        Command::Archive { id } => {
            let archived = archive_tariff(db, id).await?;
            println!("Archived tariff {} ({}).", archived.id, archived.route_label);
        }
        Command::Restore { id } => {
            let restored = restore_tariff(db, id, today).await?;
            println!(
                "Restored tariff {} ({}, {:?}).",
                restored.id, restored.route_label, restored.state
            );
        }
        Command::Show { id } => {
            let tariff = get_tariff(db, id, today)
                .await?
                .ok_or(Error::TariffNotFound { id })?;
            print_json(&tariff)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
