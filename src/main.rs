//! onchain CLI
//!
//! Runs the ledger as an HTTP service or drives it directly from the
//! command line.

use clap::{Parser, Subcommand};
use onchain::api::{create_router, ApiState};
use onchain::core::Ledger;
use onchain::crypto::Difficulty;
use onchain::mining::CancelFlag;
use onchain::storage::SqliteStore;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "onchain")]
#[command(version = "0.1.0")]
#[command(about = "A tamper-evident proof-of-work transaction ledger", long_about = None)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, default_value = ".onchain_data")]
    data_dir: PathBuf,

    /// Mining difficulty (number of leading zero hex characters)
    #[arg(long, default_value_t = onchain::DEFAULT_DIFFICULTY)]
    difficulty: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        addr: String,
    },

    /// Mine new blocks from the pending buffer
    Mine {
        /// Number of blocks to mine
        #[arg(short, long, default_value = "1")]
        count: u32,
    },

    /// Display the committed chain
    Chain,

    /// Validate the committed chain
    Validate,
}

fn open_ledger(cli: &Cli) -> Result<Ledger, Box<dyn std::error::Error>> {
    fs::create_dir_all(&cli.data_dir)?;
    let store = SqliteStore::open(cli.data_dir.join("ledger.db"))?;
    let ledger = Ledger::open(Box::new(store), Difficulty(cli.difficulty))?;
    Ok(ledger)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { ref addr } => {
            let ledger = Arc::new(open_ledger(&cli)?);
            let shutdown = CancelFlag::new();
            let state = ApiState {
                ledger,
                shutdown: shutdown.clone(),
            };

            let router = create_router(state);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            log::info!("listening on {}", addr);

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = tokio::signal::ctrl_c().await;
                    log::info!("shutting down, aborting any in-flight mining");
                    shutdown.cancel();
                })
                .await?;
        }

        Commands::Mine { count } => {
            let ledger = open_ledger(&cli)?;
            let cancel = CancelFlag::new();
            for _ in 0..count {
                let block = ledger.mine_block(&cancel)?;
                println!(
                    "mined block {} with {} transaction(s): {}",
                    block.index,
                    block.transactions.len(),
                    block.hash
                );
            }
        }

        Commands::Chain => {
            let ledger = open_ledger(&cli)?;
            for block in ledger.current_chain() {
                println!(
                    "#{}  nonce={}  txs={}  hash={}  prev={}",
                    block.index,
                    block.nonce,
                    block.transactions.len(),
                    block.hash,
                    block.previous_hash
                );
            }
        }

        Commands::Validate => {
            let ledger = open_ledger(&cli)?;
            match ledger.validate() {
                Ok(()) => println!("ledger is valid ({} blocks)", ledger.height()),
                Err(e) => {
                    eprintln!("ledger is INVALID: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
