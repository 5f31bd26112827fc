//! registry-filer binary.
//!
//! Reads `registry.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and either serves the API with its filing worker
//! or runs one of the batch jobs.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use registry_core::store::RegistryStore;
use registry_filer::{FilerConfig, publish::TracingPublisher, reminder, worker};
use registry_store_sqlite::SqliteStore;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Business registry filer")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "registry.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API and process queued filings (the default).
  Serve,
  /// Publish annual report reminders for businesses due on a day.
  Remind {
    /// Day to send reminders for, as YYYY-MM-DD. Defaults to today (UTC).
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  /// List businesses, dissolved ones included, that should carry a tax id but
  /// have none.
  MissingTaxIds,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = FilerConfig::load(cli.config).context("failed to load configuration")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(cfg, store).await,
    Command::Remind { date } => {
      let today = date.unwrap_or_else(|| Utc::now().date_naive());
      reminder::send_ar_reminders(&store, &TracingPublisher, &cfg.reminder, today)
        .await
        .context("AR reminder job failed")?;
      Ok(())
    }
    Command::MissingTaxIds => {
      let businesses = store
        .businesses_without_tax_id()
        .await
        .context("failed to list businesses without a tax id")?;
      for b in businesses {
        println!("{}\t{}\t{}", b.identifier(), b.legal_type, b.legal_name);
      }
      Ok(())
    }
  }
}

async fn serve(cfg: FilerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let store = Arc::new(store);
  let (queue_tx, queue_rx) = mpsc::channel(cfg.queue_capacity.max(1));

  let worker_store = store.clone();
  let worker = tokio::spawn(async move {
    let publisher = TracingPublisher;
    worker::run(worker_store.as_ref(), &publisher, queue_rx).await;
  });

  let app = registry_filer::router(store, queue_tx);
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
      }
    })
    .await
    .context("server error")?;

  // The router held the last queue sender; the worker drains what is left and stops.
  worker.await.context("filing worker panicked")?;
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
