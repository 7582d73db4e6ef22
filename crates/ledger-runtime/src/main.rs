//! # civic-ledger
//!
//! Operator CLI for the civic ledger.
//!
//! ```text
//! civic-ledger init
//! civic-ledger keygen alice@example.org --register
//! civic-ledger append alice@example.org '{"action": "vote"}'
//! civic-ledger validate
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cl_03_ledger::{Block, LedgerApi, Tier};
use ledger_runtime::commands;
use ledger_runtime::{LedgerContainer, RuntimeConfig};

/// civic-ledger: hierarchical append-only ledger with validator signing
#[derive(Parser, Debug)]
#[command(name = "civic-ledger", version)]
#[command(about = "Operate a hierarchical append-only civic ledger")]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config and environment)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the genesis page if the chain is empty
    Init,
    /// Generate a key pair and store the private key
    Keygen {
        identity: String,
        /// Also register the public key as an active validator
        #[arg(long)]
        register: bool,
    },
    /// Manage the validator registry
    Validator {
        #[command(subcommand)]
        action: ValidatorCommand,
    },
    /// Append a page
    Append {
        /// Author identity (a validator, SYSTEM or GENESIS)
        identity: String,
        /// Record as a JSON object
        record: String,
        /// Pre-computed base64 signature
        #[arg(long)]
        signature: Option<String>,
    },
    /// Run due rollups without appending a page
    Rollup,
    /// Check hash links and page signatures
    Validate {
        /// Print every fault instead of only the verdict
        #[arg(long)]
        report: bool,
    },
    /// Print the blocks of a tier as JSON
    Show {
        /// page, chapter, book, part or series
        tier: Tier,
        #[arg(long)]
        index: Option<u64>,
    },
    /// Length and head hash of every tier
    Summary,
}

#[derive(Subcommand, Debug)]
enum ValidatorCommand {
    /// Register a validator from a PEM public key file
    Add { identity: String, public_key: PathBuf },
    /// Deactivate a validator
    Remove { identity: String },
    /// List registered validators
    List,
}

fn init_logging(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .context("invalid log filter")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = RuntimeConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    init_logging(&config.log)?;

    let container = LedgerContainer::open(config).context("failed to open ledger")?;
    run(&container, args.command)
}

fn run(container: &LedgerContainer, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            let _lock = commands::lock(container)?;
            match container.ledger.initialize_genesis()? {
                Some(genesis) => println!("genesis {}", genesis.hash()),
                None => println!("chain already initialized"),
            }
        }
        Command::Keygen { identity, register } => {
            let key = commands::keygen(container, &identity, register)?;
            info!("Private key written to {}", key.private_key_path.display());
            if register && !key.registered {
                warn!("{} was already registered; registry unchanged", identity);
            }
            print!("{}", key.public_key_pem);
        }
        Command::Validator { action } => run_validator(container, action)?,
        Command::Append {
            identity,
            record,
            signature,
        } => {
            let page = commands::append(container, &identity, &record, signature.as_deref())?;
            print_json(&page)?;
        }
        Command::Rollup => {
            let _lock = commands::lock(container)?;
            let outcome = container.ledger.run_rollups()?;
            for block in &outcome.created {
                println!("{} #{} ({} children)", block.tier(), block.index(), block.children().len());
            }
            for error in &outcome.errors {
                warn!("{}", error);
            }
            if outcome.is_empty() {
                println!("no rollup due");
            }
        }
        Command::Validate { report } => {
            let chain_report = container.ledger.chain_report()?;
            if report {
                for fault in &chain_report.faults {
                    println!("{}", fault);
                }
            }
            if !container.ledger.validate_chain() {
                bail!("chain is INVALID ({} faults)", chain_report.faults.len());
            }
            println!(
                "chain is valid: {} blocks, {} signatures verified",
                chain_report.blocks_checked, chain_report.signatures_verified
            );
        }
        Command::Show { tier, index } => {
            let blocks: Vec<Block> = commands::show(container, tier, index)?;
            print_json(&blocks)?;
        }
        Command::Summary => {
            for tier in container.ledger.summary()?.tiers {
                let head = tier
                    .head
                    .map(|hash| hash.to_hex())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<8} {:>6}  {}", tier.tier.name(), tier.length, head);
            }
        }
    }
    Ok(())
}

fn run_validator(container: &LedgerContainer, action: ValidatorCommand) -> Result<()> {
    match action {
        ValidatorCommand::Add {
            identity,
            public_key,
        } => {
            let pem = std::fs::read_to_string(&public_key)
                .with_context(|| format!("cannot read {}", public_key.display()))?;
            if container.registry.add(&identity, &pem)? {
                println!("{} registered", identity);
            } else {
                println!("{} already registered; not changed", identity);
            }
        }
        ValidatorCommand::Remove { identity } => match container.registry.remove(&identity)? {
            0 => println!("{} is not an active validator", identity),
            _ => println!("{} deactivated", identity),
        },
        ValidatorCommand::List => {
            for entry in container.registry.entries() {
                let state = if entry.active { "active" } else { "inactive" };
                println!("{:<40} {:<8} {}", entry.identity, state, entry.added_at);
            }
        }
    }
    Ok(())
}
