use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use feedback_reporting::clock::{Clock, SystemClock};
use feedback_reporting::config::Config;
use feedback_reporting::db::{self, PgFeedbackStore};
use feedback_reporting::{report, server, weekly};

#[derive(Parser)]
#[command(name = "feedback-reporting")]
#[command(about = "Feedback totals, type mix and weekly trends", long_about = None)]
struct Cli {
    /// Postgres connection URL
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data spread over the last four weeks
    Seed,
    /// Import feedback from a CSV file with `type,created_at[,source_key]` columns
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long, default_value_t = weekly::CHART_WEEKS)]
        weeks: i64,
    },
    /// Serve the reporting API
    Serve {
        /// Bind address (e.g. 0.0.0.0:8089)
        #[arg(long)]
        bind_address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    server::init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if cli.database_url.is_some() {
        config.database_url = cli.database_url;
    }

    match cli.command {
        Commands::InitDb => {
            let pool = db::create_pool(&config).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = db::create_pool(&config).await?;
            let inserted = db::seed(&pool).await?;
            println!("Seed data inserted ({inserted} new records).");
        }
        Commands::Import { csv } => {
            let pool = db::create_pool(&config).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} feedback records from {}.", csv.display());
        }
        Commands::Report { out, weeks } => {
            let pool = db::create_pool(&config).await?;
            let store = PgFeedbackStore::new(pool);
            let today = SystemClock.today();
            let start = today - chrono::Duration::weeks(weeks.max(1) - 1);

            let summary = report::summarize_by_type(&store).await?;
            let buckets = weekly::weekly_breakdown(&store, start, today).await?;
            let report = report::build_report(today, &summary, &buckets);

            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Serve { bind_address } => {
            if let Some(address) = bind_address {
                config.bind_address = address;
            }
            server::serve(&config).await?;
        }
    }

    Ok(())
}
