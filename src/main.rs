//! Storage dapp command-line client.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   locate    ┌───────────────────┐
//!   │ HostEnv      │────────────▶│ ProviderLocator   │
//!   │ (DevWallet)  │             └─────────┬─────────┘
//!   └──────┬───────┘                       │ ProviderHandle
//!          │ accountsChanged               ▼
//!          │ chainChanged        ┌───────────────────┐  ensure chain  ┌──────────────────┐
//!          └────────────────────▶│ ConnectionManager │───────────────▶│ NetworkReconciler│
//!                                └─────────┬─────────┘                └──────────────────┘
//!                                          │ commit
//!                                          ▼
//!   ┌─────────────────┐ update ┌───────────────────┐
//!   │ ContractGateway │───────▶│   SessionStore    │───▶ CLI output / notices
//!   └─────────────────┘        └───────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};

use storage_dapp::config::{load_config, DappConfig};
use storage_dapp::lifecycle::signals::shutdown_signal;
use storage_dapp::observability::{logging, metrics};
use storage_dapp::provider::{DevWallet, HostEnvironment};
use storage_dapp::session::{Notice, SessionState};
use storage_dapp::DappClient;

#[derive(Parser)]
#[command(name = "storage-dapp")]
#[command(about = "Read and write a stored value through a wallet provider", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, default_value = "dapp.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show wallet and session status
    Status,
    /// Connect the wallet and switch to the target network
    Connect,
    /// Read the stored value
    Read,
    /// Store a new value
    Write {
        /// Non-negative integer to store
        value: String,
    },
    /// Connect and follow wallet events until interrupted
    Watch,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(
        config = %cli.config.display(),
        version = env!("CARGO_PKG_VERSION"),
        "storage-dapp starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::install_exporter(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let env = host_environment(&config);
    let client = DappClient::new(&config, &env)?;
    let mut notices = client.notices();
    client.start().await;
    settle(&client, &mut notices).await;

    match cli.command {
        Commands::Status => {}
        Commands::Connect => {
            if let Err(e) = client.connect().await {
                eprintln!("Connection error: {e}");
            }
        }
        Commands::Read => {
            client.refresh().await;
        }
        Commands::Write { value } => match client.submit_value(&value).await {
            Ok(pending) => {
                println!("Transaction sent: {}", pending.tx_hash());
                if let Err(e) = pending.confirmed().await {
                    eprintln!("{e}");
                }
            }
            Err(e) => eprintln!("{e}"),
        },
        Commands::Watch => {
            watch(&client, &mut notices).await;
        }
    }

    settle(&client, &mut notices).await;
    print_state(&client.state());
    client.stop_watching();
    Ok(())
}

fn host_environment(config: &DappConfig) -> HostEnvironment {
    match DevWallet::from_env(&config.wallet) {
        Ok(wallet) => HostEnvironment::with_provider(Arc::new(wallet)),
        Err(e) => {
            tracing::warn!(error = %e, "Dev wallet unavailable");
            HostEnvironment::empty()
        }
    }
}

/// Print queued notices, performing a reload if one was requested.
async fn settle(client: &DappClient, notices: &mut broadcast::Receiver<Notice>) {
    loop {
        match notices.try_recv() {
            Ok(notice) => handle_notice(client, notice).await,
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Dropped notices");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

async fn watch(client: &DappClient, notices: &mut broadcast::Receiver<Notice>) {
    if !client.state().session.connected {
        if let Err(e) = client.connect().await {
            eprintln!("Connection error: {e}");
            return;
        }
    }
    print_state(&client.state());

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            received = notices.recv() => match received {
                Ok(notice) => handle_notice(client, notice).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Dropped notices");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = &mut shutdown => break,
        }
    }
}

async fn handle_notice(client: &DappClient, notice: Notice) {
    println!("[{:?}] {}: {}", notice.severity(), notice.title(), notice.description());
    if let Notice::ReloadRequired { .. } = notice {
        client.reload().await;
        print_state(&client.state());
    }
}

fn print_state(state: &SessionState) {
    let account = state
        .session
        .short_account()
        .unwrap_or_else(|| "-".to_string());
    println!(
        "status={:?} account={} connected={} value={} pending={:?}",
        state.status(),
        account,
        state.session.connected,
        state.stored_value,
        state.pending_operation()
    );
}
