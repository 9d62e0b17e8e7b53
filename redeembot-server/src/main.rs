use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use redeembot_common::models::StorageKind;

mod context;
mod server;

#[derive(Parser, Debug, Clone)]
#[command(name = "redeembot")]
#[command(author, version, about = "Redemption code (CDK) manager with file, SQLite and MySQL storage")]
pub struct Args {
    /// Directory holding config.yml, cdk.yml, data.db and the log files.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Overrides storage.mode from config.yml for this run.
    #[arg(long)]
    pub storage: Option<StorageKind>,

    /// User the console acts as for `use`, `verify` and `history`.
    #[arg(long, default_value = "console")]
    pub actor: String,

    /// Run without the interactive console; only the expiry sweep runs until Ctrl-C.
    #[arg(long)]
    pub headless: bool,

    /// tracing filter, e.g. "redeembot=debug,sqlx=warn". Falls back to RUST_LOG.
    #[arg(long)]
    pub log_filter: Option<String>,
}

fn init_tracing(log_filter: Option<&str>) {
    let filter = match log_filter.map(EnvFilter::try_new) {
        Some(Ok(filter)) => filter,
        Some(Err(e)) => {
            eprintln!("Ignoring invalid --log-filter: {e}");
            default_filter()
        }
        None => default_filter(),
    };
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

fn default_filter() -> EnvFilter {
    EnvFilter::from_default_env()
        .add_directive("redeembot=info".parse().unwrap_or_default())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.log_filter.as_deref());
    info!(
        "redeembot starting. data_dir={}, headless={}, actor={}",
        args.data_dir.display(),
        args.headless,
        args.actor
    );

    if let Err(e) = server::run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    Ok(())
}
