//! zwap-cli
//!
//! Operator tool for the ZWAP reward programme. Reports epoch and emission
//! figures, aggregates liquidity snapshots, checks Merkle claims and builds
//! the exact `Claim` contract call for a wallet to sign. Never signs or
//! broadcasts.
//!
//! Usage:
//!   zwap-cli epoch    [--now <unix_ts>] [--epoch-info <file>] [--watch]
//!   zwap-cli tvl      --snapshot <file> [--prices <file>]
//!   zwap-cli publish  --leaves <file>
//!   zwap-cli verify   --claim <file> --root <hex>
//!   zwap-cli claim    --claim <file> --root <hex> --network <mainnet|testnet>
//!                     --address <hex> [--contract <hex>] [--min-gas-price <qa>]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use zwap_claim::{ClaimContext, ClaimRequestBuilder};
use zwap_core::leaf::{DistributionLeaf, MerkleProof};
use zwap_core::network::Network;
use zwap_core::types::{decode_hash32, Address, Balance, Timestamp};
use zwap_crypto::{MerkleClaimVerifier, MerkleTree};
use zwap_pools::{aggregate, LiquiditySnapshot, PriceTable};
use zwap_rewards::{
    overview, tick, ClockReading, EpochClock, EpochInfo, RewardSchedule, RewardScheduleParams,
    RewardsOverview, ScheduleStatus,
};

mod config;
use config::ZwapConfig;

mod rpc_client;
use rpc_client::ChainRpcClient;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "zwap-cli",
    version,
    about = "ZWAP rewards: epochs, liquidity and claim requests"
)]
struct Args {
    /// Path to the config file (JSON). Missing file means defaults.
    #[arg(long, global = true, default_value = "~/.zwap/config.json")]
    config: PathBuf,

    /// Override the genesis timestamp (Unix seconds).
    #[arg(long, global = true)]
    genesis: Option<Timestamp>,

    /// Override the epoch duration (seconds).
    #[arg(long, global = true)]
    epoch_duration: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current epoch, countdown and total rewards distributed.
    Epoch {
        /// Evaluate at this Unix timestamp instead of now.
        #[arg(long)]
        now: Option<Timestamp>,
        /// Use an epoch record published by the distributor (JSON).
        #[arg(long)]
        epoch_info: Option<PathBuf>,
        /// Refresh the countdown every second until Ctrl-C.
        #[arg(long, default_value_t = false)]
        watch: bool,
    },

    /// Total value locked and its 24h change.
    Tvl {
        /// Liquidity snapshot (JSON map of asset id to pool position).
        #[arg(long)]
        snapshot: PathBuf,
        /// USD price table (JSON map of asset id to price).
        #[arg(long)]
        prices: Option<PathBuf>,
    },

    /// Build the Merkle tree for one epoch's leaves and print the root and
    /// every claim.
    Publish {
        /// JSON array of distribution leaves.
        #[arg(long)]
        leaves: PathBuf,
    },

    /// Check a claim file against a published root.
    Verify {
        /// Claim file: `{ "leaf": {...}, "proof": [...] }`.
        #[arg(long)]
        claim: PathBuf,
        /// Epoch root (hex, 32 bytes).
        #[arg(long)]
        root: String,
    },

    /// Verify a claim and print the contract call that redeems it.
    Claim {
        #[arg(long)]
        claim: PathBuf,
        #[arg(long)]
        root: String,
        #[arg(long)]
        network: Network,
        /// Connected wallet address (hex, 20 bytes).
        #[arg(long)]
        address: String,
        /// Distributor contract, overriding the config file.
        #[arg(long)]
        contract: Option<String>,
        /// Minimum gas price in Qa. Fetched from the network when omitted.
        #[arg(long)]
        min_gas_price: Option<Balance>,
    },
}

/// One leaf and its proof, as handed out by the distributor.
#[derive(Debug, Serialize, Deserialize)]
struct ClaimFile {
    leaf: DistributionLeaf,
    proof: MerkleProof,
}

#[derive(Debug, Serialize)]
struct PublishedTree {
    root: String,
    depth: usize,
    claims: Vec<ClaimFile>,
}

// ── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,zwap_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut cfg = ZwapConfig::load(&expand_tilde(&args.config))?;
    if let Some(genesis) = args.genesis {
        cfg.genesis_timestamp = genesis;
    }
    if let Some(duration) = args.epoch_duration {
        cfg.epoch_duration_secs = duration;
    }

    match args.command {
        Command::Epoch {
            now,
            epoch_info,
            watch,
        } => {
            let clock = cfg.clock()?;
            let info = epoch_info
                .as_deref()
                .map(read_json::<EpochInfo>)
                .transpose()?;
            if watch {
                let schedule = RewardSchedule::new(cfg.schedule.clone())?;
                return cmd_watch(&clock, &schedule, info.as_ref()).await;
            }
            let now = now.unwrap_or_else(|| chrono::Utc::now().timestamp());
            match info {
                Some(info) => {
                    let o = overview(Some(&info), now, cfg.schedule.mining_cap)?;
                    print_overview(&o, info.next_epoch_at);
                }
                None => {
                    let o = local_overview(&clock, &cfg.schedule, now)?;
                    print_overview(&o, clock.next_boundary(now));
                }
            }
            Ok(())
        }

        Command::Tvl { snapshot, prices } => {
            let snapshot: LiquiditySnapshot = read_json(&snapshot)?;
            let prices: PriceTable = match prices {
                Some(path) => read_json(&path)?,
                None => PriceTable::default(),
            };
            let summary = aggregate(&snapshot, &prices)?;
            println!("Pools:           {}", snapshot.0.len());
            println!("Total liquidity: ${}", summary.total_liquidity.format_dp(2));
            println!("24h baseline:    ${}", summary.prior_liquidity.format_dp(2));
            println!("24h change:      {}%", summary.change_percent.format_dp(2));
            Ok(())
        }

        Command::Publish { leaves } => {
            let leaves: Vec<DistributionLeaf> = read_json(&leaves)?;
            let tree = MerkleTree::from_leaves(leaves).context("building merkle tree")?;
            let claims = (0..tree.leaves().len())
                .map(|i| {
                    let proof = tree
                        .proof(i)
                        .with_context(|| format!("no proof for leaf {i}"))?;
                    Ok(ClaimFile {
                        leaf: tree.leaves()[i],
                        proof,
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let out = PublishedTree {
                root: format!("0x{}", hex::encode(tree.root())),
                depth: tree.depth(),
                claims,
            };
            info!(root = %out.root, leaves = out.claims.len(), "tree built");
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }

        Command::Verify { claim, root } => {
            let file: ClaimFile = read_json(&claim)?;
            let root = decode_hash32(&root).context("parsing --root")?;
            let verified = MerkleClaimVerifier::new(root)
                .verify(file.leaf, file.proof)
                .context("claim does not match root")?;
            let leaf = verified.leaf();
            println!("Valid claim");
            println!("  Epoch:   {}", leaf.epoch);
            println!("  Address: {}", leaf.address);
            println!("  Amount:  {} ZWAP ({} base units)", leaf.amount_tokens()?, leaf.amount);
            Ok(())
        }

        Command::Claim {
            claim,
            root,
            network,
            address,
            contract,
            min_gas_price,
        } => {
            let mut networks = cfg.networks.clone();
            if let Some(contract) = contract {
                let contract = Address::from_hex(&contract).context("parsing --contract")?;
                networks.set_distributor(network, contract)?;
            }
            let signer = Address::from_hex(&address).context("parsing --address")?;

            let file: ClaimFile = read_json(&claim)?;
            let root = decode_hash32(&root).context("parsing --root")?;
            let verified = MerkleClaimVerifier::new(root)
                .verify(file.leaf, file.proof)
                .context("claim does not match root")?;

            let min_gas_price = match min_gas_price {
                Some(price) => price,
                None => {
                    let entry = networks
                        .get(network)
                        .with_context(|| format!("no RPC endpoint configured for {network}"))?;
                    ChainRpcClient::new(&entry.rpc_url)
                        .get_minimum_gas_price()
                        .await?
                }
            };

            let tx = ClaimRequestBuilder::new(&networks, cfg.gas).build(
                &verified,
                &ClaimContext::connected(network, signer),
                min_gas_price,
            )?;
            let out = serde_json::json!({
                "transaction": tx,
                "call_params": tx.call_params(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Redraw the epoch line every second until Ctrl-C or until the programme
/// has distributed everything.
async fn cmd_watch(
    clock: &EpochClock,
    schedule: &RewardSchedule,
    info: Option<&EpochInfo>,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = chrono::Utc::now().timestamp();
                let (line, status) = watch_line(clock, schedule, info, now);
                print!("\r{line}");
                std::io::stdout().flush()?;
                if status.is_some_and(|s| !s.is_active()) {
                    println!();
                    info!("reward programme finished, watch stopped");
                    return Ok(());
                }
            }
            res = &mut ctrl_c => {
                res.context("waiting for Ctrl-C")?;
                println!();
                return Ok(());
            }
        }
    }
}

/// One frame of the watch display. A published epoch record takes
/// precedence over the local clock. Status is `None` when no epoch is known.
fn watch_line(
    clock: &EpochClock,
    schedule: &RewardSchedule,
    info: Option<&EpochInfo>,
    now: Timestamp,
) -> (String, Option<ScheduleStatus>) {
    let (epoch, status, countdown) = match info {
        Some(info) => (info.current, info.status(), info.countdown(now)),
        None => match tick(Some(clock), now) {
            ClockReading::Running { epoch, countdown, .. } => {
                (epoch.index, schedule.status(epoch.index), countdown)
            }
            ClockReading::Unavailable => {
                return ("Epoch  --   next in --:--:--:--".to_string(), None);
            }
        },
    };
    let line = if status.is_active() {
        format!("Epoch {epoch:>4}   next in {countdown}")
    } else {
        format!("Epoch {epoch:>4}   {status}")
    };
    (line, Some(status))
}

/// Overview from the configured schedule when no published epoch record is
/// supplied.
fn local_overview(
    clock: &EpochClock,
    params: &RewardScheduleParams,
    now: Timestamp,
) -> anyhow::Result<RewardsOverview> {
    let schedule = RewardSchedule::new(params.clone())?;
    let epoch = clock.epoch_index_at(now);
    if let Some(overrun) = schedule.supply_overrun(epoch)? {
        warn!(epoch, overrun = %overrun, "schedule formula exceeds total supply");
    }
    let status = schedule.status(epoch);
    Ok(RewardsOverview {
        epoch,
        total_rewards: schedule.total_distributed(epoch)?,
        status,
        countdown: status.is_active().then(|| clock.countdown(now)),
    })
}

fn print_overview(o: &RewardsOverview, next_epoch_at: Timestamp) {
    println!("Epoch:          {}", o.epoch);
    println!("Total rewards:  {} ZWAP", o.total_rewards.format_dp(2));
    println!("Status:         {}", o.status);
    if let Some(countdown) = o.countdown {
        println!("Next epoch at:  {}", format_time(next_epoch_at));
        println!("Countdown:      {}", countdown);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

fn format_time(ts: Timestamp) -> String {
    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ts.to_string(),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

fn expand_tilde(path: &Path) -> PathBuf {
    expand_tilde_with(path, home_dir())
}

fn expand_tilde_with(path: &Path, home: Option<PathBuf>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(stripped), Some(home)) => home.join(stripped),
        _ => path.to_path_buf(),
    }
}
