use anyhow::Result;
use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use shared::services::{deal_sync, price_refresh};
use shared::telemetry::init_tracing;
use shared::Config;

mod scheduler;
mod state;

use state::AppState;

/// Background jobs for the signal dashboard: CMP refresh and deal reconciliation.
#[derive(Parser, Debug)]
#[command(name = "worker")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduler until Ctrl-C (default)
    Run,
    /// Re-project every signal once and exit
    Reconcile,
    /// Refresh prices of open signals once and exit
    RefreshPrices,
    /// Apply pending database migrations
    Migrate,
    /// Print build information
    Version,
}

fn print_version() {
    println!("worker {}", env!("CARGO_PKG_VERSION"));
    println!("commit:  {}", env!("GIT_HASH"));
    println!("branch:  {}", env!("GIT_BRANCH"));
    println!("tag:     {}", env!("GIT_TAG"));
    println!("built:   {}", env!("BUILD_TIME"));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    if matches!(command, Commands::Version) {
        print_version();
        return Ok(());
    }

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let state = AppState::new(config).await?;

    if state.config.auto_migrate || matches!(command, Commands::Migrate) {
        Migrator::up(state.db.as_ref(), None).await?;
        tracing::info!("Migrations applied");
    }

    match command {
        Commands::Run => {
            tracing::info!(commit = env!("GIT_HASH"), "Starting worker...");
            scheduler::run(state).await?;
        }
        Commands::Reconcile => {
            let report = deal_sync::reconcile(state.db.as_ref(), &state.prices).await?;
            tracing::info!(?report, "Reconciliation done");
        }
        Commands::RefreshPrices => {
            let report =
                price_refresh::refresh_open_signals(&state.signals, &state.prices, state.config.price_request_delay)
                    .await?;
            tracing::info!(?report, "Price refresh done");
        }
        Commands::Migrate | Commands::Version => {}
    }

    Ok(())
}
