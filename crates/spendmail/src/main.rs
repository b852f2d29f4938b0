//! `SpendMail` - turns bank notification emails into ledger entries.
//!
//! The daemon connects the pieces: repositories on one `SQLite` database, a
//! Gmail client behind the mail-provider boundary, a scanner, and the
//! process-wide scheduler that sweeps every connected account on a fixed
//! cadence.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use spendmail_core::{AccountRepository, Scanner, Scheduler, TransactionRepository};
use spendmail_gmail::GmailClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "spendmail=debug,spendmail_core=debug,spendmail_gmail=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(database = %config.database_path, "Starting SpendMail");

    let accounts = Arc::new(AccountRepository::new(&config.database_path).await?);
    let transactions = Arc::new(TransactionRepository::new(&config.database_path).await?);
    let mail = Arc::new(GmailClient::new(config.page_size, config.fetch_timeout)?);

    let scanner = Arc::new(
        Scanner::new(accounts, transactions, mail).with_fetch_timeout(config.fetch_timeout),
    );
    let scheduler = Scheduler::start(scanner, config.scan_interval);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    scheduler.stop();

    Ok(())
}
