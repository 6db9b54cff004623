//! Vesta escrow engine command-line tool.
//!
//! Inspects the redemption curve, validates engine configuration files, and
//! runs a scripted escrow scenario over in-memory collaborators, printing the
//! resulting events as JSON lines.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use vesta_core::clock::ManualClock;
use vesta_core::constants::SECONDS_PER_DAY;
use vesta_core::curve::{compensation_for, payout_for_duration, redeem_ratio};
use vesta_core::directory::MemoryDirectory;
use vesta_core::error::PluginError;
use vesta_core::liquid::MemoryLiquidAsset;
use vesta_core::traits::{LiquidAsset, UsagePlugin};
use vesta_core::types::{Address, Amount, Timestamp};
use vesta_engine::{EngineConfig, EscrowEngine};

const DEMO_OWNER: Address = Address([0x0A; 20]);
const DEMO_CUSTODY: Address = Address([0xEE; 20]);
const DEMO_HOLDER: Address = Address([0x01; 20]);
const DEMO_PLUGIN: Address = Address([0xD1; 20]);

#[derive(Parser)]
#[command(name = "vesta-cli")]
#[command(version, about = "Escrow engine inspection and simulation")]
struct Cli {
    /// Engine config file (default: <config dir>/vesta/engine.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Liquid payout for redeeming an amount over a duration.
    Payout(PayoutArgs),
    /// Print the redemption ratio curve.
    Curve(CurveArgs),
    /// Load and validate a config file, then print it with effective settings.
    CheckConfig,
    /// Run a convert/allocate/redeem/finalize scenario in memory.
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct PayoutArgs {
    /// Escrow amount to redeem.
    #[arg(short, long)]
    amount: Amount,

    /// Vesting duration in seconds.
    #[arg(short, long)]
    duration: u64,
}

#[derive(Args)]
struct CurveArgs {
    /// Number of intervals between zero and the maximum duration.
    #[arg(short, long, default_value_t = 12)]
    steps: u64,
}

#[derive(Args)]
struct SimulateArgs {
    /// Liquid amount the demo holder converts.
    #[arg(short, long, default_value_t = 1_000)]
    amount: Amount,

    /// Vesting duration in days.
    #[arg(short, long, default_value_t = 45)]
    days: u64,

    /// Escrow allocated to, then withdrawn from, the demo plugin first.
    #[arg(long, default_value_t = 100)]
    allocate: Amount,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let required = matches!(cli.command, Commands::CheckConfig);
    let config = resolve_config(cli.config.as_deref(), required)?;
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logging(&level, &cli.log_format);

    match cli.command {
        Commands::Payout(args) => payout(&config, args),
        Commands::Curve(args) => curve(&config, args),
        Commands::CheckConfig => check_config(&config),
        Commands::Simulate(args) => simulate(config, args),
    }
}

/// Initialize tracing with the given level filter and output format.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Explicit path, else the default path if it exists, else demo parameters.
fn resolve_config(path: Option<&Path>, required: bool) -> Result<EngineConfig> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = EngineConfig::default_path();
            default.exists().then_some(default)
        }
    };

    match path {
        Some(path) => EngineConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None if required => bail!(
            "no --config given and {} does not exist",
            EngineConfig::default_path().display()
        ),
        None => {
            let mut config = EngineConfig::new(DEMO_OWNER, DEMO_CUSTODY);
            config.compensation_plugin = Some(DEMO_PLUGIN);
            Ok(config)
        }
    }
}

fn payout(config: &EngineConfig, args: PayoutArgs) -> Result<()> {
    let settings = config.effective_redeem_settings();
    if args.duration < settings.min_redeem_duration {
        bail!(
            "duration {}s is below the minimum of {}s",
            args.duration,
            settings.min_redeem_duration
        );
    }
    let payout = payout_for_duration(&settings, args.amount, args.duration)?;

    println!("Ratio:        {}%", redeem_ratio(&settings, args.duration));
    println!("Payout:       {payout}");
    println!("Burnt:        {}", args.amount - payout);
    println!(
        "Compensation: {}",
        compensation_for(args.amount, settings.compensation_adjustment)?
    );
    Ok(())
}

fn curve(config: &EngineConfig, args: CurveArgs) -> Result<()> {
    let settings = config.effective_redeem_settings();
    let steps = args.steps.max(1);
    let interval = settings.max_redeem_duration / steps;

    println!("{:>12}  {:>6}  {:>5}", "seconds", "days", "ratio");
    // One sample past the maximum shows saturation.
    for i in 0..=steps + 1 {
        let duration = interval * i;
        println!(
            "{:>12}  {:>6}  {:>4}%",
            duration,
            duration / SECONDS_PER_DAY,
            redeem_ratio(&settings, duration)
        );
    }
    Ok(())
}

fn check_config(config: &EngineConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    println!(
        "effective redeem settings: {}",
        serde_json::to_string(&config.effective_redeem_settings())?
    );
    Ok(())
}

/// Usage plugin that only logs its callbacks.
struct TracePlugin {
    address: Address,
}

impl UsagePlugin for TracePlugin {
    fn allocate(&self, owner: Address, amount: Amount, data: &[u8]) -> Result<(), PluginError> {
        info!(plugin = %self.address, %owner, amount, data_len = data.len(), "allocate callback");
        Ok(())
    }

    fn deallocate(&self, owner: Address, amount: Amount, data: &[u8]) -> Result<(), PluginError> {
        info!(plugin = %self.address, %owner, amount, data_len = data.len(), "deallocate callback");
        Ok(())
    }
}

fn simulate(config: EngineConfig, args: SimulateArgs) -> Result<()> {
    let liquid = Arc::new(MemoryLiquidAsset::new());
    let directory = Arc::new(MemoryDirectory::new());
    let clock = Arc::new(ManualClock::new(chrono::Utc::now().timestamp().max(0) as u64));

    let mut plugins = vec![DEMO_PLUGIN];
    plugins.extend(config.compensation_plugin);
    for address in plugins {
        directory.register_plugin(address, Arc::new(TracePlugin { address }));
    }

    let engine = EscrowEngine::new(config, liquid.clone(), directory, clock.clone())
        .context("failed to build engine")?;
    let custody = engine.custody();

    liquid.mint(DEMO_HOLDER, args.amount)?;
    liquid.approve(DEMO_HOLDER, custody, args.amount)?;
    engine.convert(DEMO_HOLDER, args.amount)?;

    if args.allocate > 0 {
        engine.approve_usage(DEMO_HOLDER, DEMO_PLUGIN, args.allocate)?;
        engine.allocate(DEMO_HOLDER, DEMO_PLUGIN, args.allocate, b"simulate")?;
        engine.deallocate(DEMO_HOLDER, DEMO_PLUGIN, args.allocate, b"simulate")?;
    }

    let balance = engine.balance_of(&DEMO_HOLDER);
    if let Some(index) = engine.redeem(DEMO_HOLDER, balance, args.days * SECONDS_PER_DAY)? {
        let entry = engine.redeem_entry(&DEMO_HOLDER, index)?;
        info!(index, maturity = %format_time(entry.maturity_time), "advancing to maturity");
        clock.set(entry.maturity_time);
        engine.finalize_redeem(DEMO_HOLDER, index)?;
    }

    for event in engine.events() {
        println!("{}", serde_json::to_string(&event)?);
    }

    println!("\n=== SIMULATION RESULT ===");
    println!("Converted:        {}", args.amount);
    println!("Liquid received:  {}", liquid.balance_of(&DEMO_HOLDER));
    println!("Liquid supply:    {}", liquid.total_supply());
    println!("Escrow supply:    {}", engine.total_supply());
    println!("Custody backing:  {}", liquid.balance_of(&custody));
    Ok(())
}

fn format_time(ts: Timestamp) -> String {
    chrono::DateTime::from_timestamp(ts as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
