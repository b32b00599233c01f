//! CarePulse report CLI
//!
//! Runs the status and trend engine against a clinic SQLite store and prints
//! the result as JSON.
//!
//! Usage:
//!   carepulse-report trends --doctor <id>... [--months <n>]
//!   carepulse-report classify --doctor <id>...
//!   carepulse-report compliance --doctor <id>...
//!   carepulse-report appointments (--secretary <id> | --doctor <id>...) [--view today|upcoming]

use std::fs;
use std::path::PathBuf;

use carepulse_lib::config::{self, EngineConfig};
use carepulse_lib::engine::{self, AppointmentView, CancelFlag};
use carepulse_lib::gateway::{DataGateway, SqliteGateway};
use carepulse_lib::models::AppointmentScope;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "carepulse-report")]
#[command(version)]
#[command(about = "Patient status, compliance and trend reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Clinic database (defaults to the application data directory)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// JSON file with engine overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format: json or compact
    #[arg(short, long, default_value = "json", global = true)]
    format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly registration, lab-submission and compliance series
    Trends {
        /// Linked doctor id (repeatable)
        #[arg(long = "doctor", required = true)]
        doctors: Vec<String>,

        /// Number of months, ending with the current one
        #[arg(short, long)]
        months: Option<u32>,
    },

    /// Lab status, profile status and badge for every linked patient
    Classify {
        #[arg(long = "doctor", required = true)]
        doctors: Vec<String>,
    },

    /// Compliance category per linked patient, with totals
    Compliance {
        #[arg(long = "doctor", required = true)]
        doctors: Vec<String>,
    },

    /// Active appointments for today or the upcoming horizon
    Appointments {
        #[arg(long, conflicts_with = "doctors")]
        secretary: Option<String>,

        #[arg(long = "doctor")]
        doctors: Vec<String>,

        /// today or upcoming
        #[arg(long, default_value = "today")]
        view: String,

        /// Reference date (YYYY-MM-DD), defaults to the local date
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn parse_view(raw: &str) -> Result<AppointmentView, Box<dyn std::error::Error>> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(AppointmentView::Today),
        "upcoming" => Ok(AppointmentView::Upcoming),
        other => Err(format!("unknown view '{other}', expected today or upcoming").into()),
    }
}

/// Flip the flag on Ctrl-C so a long aggregation stops without publishing.
fn cancel_on_interrupt() -> CancelFlag {
    let cancel = CancelFlag::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling report");
            trigger.cancel();
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    carepulse_lib::init_tracing();
    let cli = Cli::parse();

    let engine_config = load_config(cli.config.as_ref())?;
    let db_path = cli.database.clone().unwrap_or_else(config::default_database_path);
    tracing::info!(path = %db_path.display(), "Opening clinic database");
    let gateway = SqliteGateway::open(&db_path)?;
    let cancel = cancel_on_interrupt();

    let result: serde_json::Value = match cli.command {
        Commands::Trends { doctors, months } => {
            let months = months.unwrap_or(engine_config.trend_months);
            let now = Local::now().naive_local();
            let outcome =
                engine::aggregate_trends(&gateway, &doctors, months, now, &engine_config, &cancel)
                    .await?;
            serde_json::to_value(outcome)?
        }
        Commands::Classify { doctors } => {
            let patients = gateway.list_patients(&doctors).await?;
            let outcome =
                engine::classify_all(&gateway, &patients, &engine_config, &cancel).await?;
            serde_json::to_value(outcome)?
        }
        Commands::Compliance { doctors } => {
            let patients = gateway.list_patients(&doctors).await?;
            let outcome =
                engine::evaluate_cohort(&gateway, &patients, &engine_config, &cancel).await?;
            serde_json::to_value(outcome)?
        }
        Commands::Appointments {
            secretary,
            doctors,
            view,
            date,
        } => {
            let scope = match secretary {
                Some(id) => AppointmentScope::Secretary(id),
                None => AppointmentScope::Doctors(doctors),
            };
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let appointments = engine::resolve_appointments(
                &gateway,
                &scope,
                parse_view(&view)?,
                today,
                &engine_config,
            )
            .await?;
            serde_json::to_value(appointments)?
        }
    };

    let output_str = match cli.format.as_str() {
        "compact" => serde_json::to_string(&result)?,
        _ => serde_json::to_string_pretty(&result)?,
    };

    if let Some(output_path) = cli.output {
        fs::write(&output_path, &output_str)?;
        eprintln!("Output written to: {}", output_path.display());
    } else {
        println!("{output_str}");
    }

    Ok(())
}
