use anyhow::{Context, Result};
use clap::Parser;
use commonware_runtime::{deterministic, Runner as _};
use std::path::PathBuf;
use tracing::info;
use veilhilo_simulator::{Scenario, Simulator, SimulatorConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulator config (YAML).
    #[arg(long)]
    config: PathBuf,

    /// Validate config and scenario, print them, and exit.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Overrides `log_level` from the config.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = SimulatorConfig::load(&args.config)?;
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    let level = config.validate().context("Invalid config")?;
    let scenario_path = config.scenario_path(&args.config);
    let scenario = Scenario::load(&scenario_path)?;
    scenario.validate().context("Invalid scenario")?;

    if args.dry_run {
        println!("{config:#?}");
        println!(
            "scenario {}: {} blocks, {} transactions",
            scenario_path.display(),
            scenario.blocks.len(),
            scenario
                .blocks
                .iter()
                .map(|block| block.transactions.len())
                .sum::<usize>()
        );
        println!("config ok");
        return Ok(());
    }

    tracing_subscriber::fmt().with_max_level(level).init();
    info!(?config, "loaded config file");

    let executor = deterministic::Runner::default();
    let summary = executor.start(|_| async move {
        let mut simulator = Simulator::new(config.engine);
        simulator.run(&scenario).await
    })?;

    info!(
        blocks = summary.blocks,
        transactions = summary.transactions,
        events = summary.events,
        rejections = summary.rejections,
        "scenario complete"
    );
    for account in &summary.accounts {
        info!(
            seed = account.seed,
            plain_balance = account.plain_balance,
            has_deposited = account.has_deposited,
            confidential_balance = ?account.confidential_balance,
            confidential_score = ?account.confidential_score,
            "account"
        );
    }
    Ok(())
}
