mod db;
mod errors;
mod models;
mod operations;
mod ui;

use crate::errors::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fintrack", about = "Personal finance tracker with a terminal UI")]
struct Args {
    /// Path to the SQLite database file.
    #[arg(long, env = "FINTRACK_DB", default_value = "finance_tracker.db")]
    database: String,
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so they never land inside the UI; silent
    // unless RUST_LOG asks for more.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let conn = db::connection::establish_connection(&args.database)?;
    info!(database = %args.database, "database ready");

    if operations::categories::seed_defaults_if_empty(&conn)? {
        info!("default categories created");
    }

    ui::run_shell(&conn)
}
