#![forbid(unsafe_code)]
//! WorkChain command-line driver

use clap::{Parser, Subcommand};
use colored::*;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use workchain::certificate::{CertificateIssuer, SimulatedValidator};
use workchain::config::{load_config, Config};
use workchain::stake::StakeLedger;
use workchain::WorkChain;

const USERS: [&str; 5] = ["Alice", "Bob", "Charlie", "Dave", "Eve"];

#[derive(Parser)]
#[command(name = "workchain", version, about = "Task-certified blockchain driver")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the configured proof-of-work difficulty
    #[arg(short, long)]
    difficulty: Option<usize>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Complete simulated tasks, mine blocks and print the resulting ledger
    Demo {
        /// Number of blocks to mine
        #[arg(long, default_value_t = 2)]
        blocks: usize,
        /// Give up on a block after this many seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
        /// Probability that a simulated task passes validation
        #[arg(long, default_value_t = 0.7)]
        success_rate: f64,
    },
    /// Stake tokens and sample validator selection
    Stake {
        /// Stakes as NAME=AMOUNT
        #[arg(required = true)]
        stakes: Vec<String>,
        /// Number of selections to sample
        #[arg(long, default_value_t = 10_000)]
        rounds: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = load_config(&cli.config)?;
    if let Some(difficulty) = cli.difficulty {
        config.chain.difficulty = difficulty;
        config.validate()?;
    }

    match cli.command {
        Command::Demo { blocks, timeout_secs, success_rate } => {
            run_demo(config, blocks, Duration::from_secs(timeout_secs), success_rate).await
        }
        Command::Stake { stakes, rounds } => run_stake(config, &stakes, rounds),
    }
}

async fn run_demo(
    config: Config,
    blocks: usize,
    timeout: Duration,
    success_rate: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    if success_rate <= 0.0 {
        return Err("success rate must be positive or no certificate will ever be issued".into());
    }
    let chain = Arc::new(WorkChain::new(config.chain.clone())?);
    let issuer = CertificateIssuer::new();
    let validator = SimulatedValidator::new(success_rate);
    println!("{}", "WorkChain initialized with genesis block.".bright_cyan().bold());

    let mut next_task = 0usize;
    for round in 0..blocks {
        // Keep completing tasks until enough certificates are pending.
        while chain.pending_certificates().len() < config.chain.min_task_certificates_per_block {
            let user = USERS.choose(&mut rand::thread_rng()).copied().unwrap_or(USERS[0]);
            let task_id = format!("task_{}", next_task);
            let task_data = format!("Data for {}", task_id);
            next_task += 1;
            match issuer.complete_task(&task_id, user, &task_data, &validator) {
                Some(cert) => chain.submit_certificate(cert),
                None => println!("  {} {} by {}", "rejected".red(), task_id, user),
            }
        }

        let from = USERS[round % USERS.len()];
        let to = USERS[(round + 1) % USERS.len()];
        chain.submit_transaction(from, to, 50 / (round as u64 + 1));

        let miner = format!("miner{}", round + 1);
        let block = chain.clone().mine_with_timeout(miner.clone(), timeout).await?;
        println!(
            "{} #{} by {} ({})",
            "Mined block".bright_green().bold(),
            block.index,
            miner,
            block.hash
        );
    }

    println!();
    let valid = chain.validate();
    let verdict = if valid { "yes".bright_green() } else { "no".red() };
    println!("Is blockchain valid? {}", verdict);

    println!("\n{}", "Balances:".bright_green().underline());
    for (address, balance) in chain.balances() {
        println!("  {:<10} {:>8} tokens", address, balance);
    }

    println!("\n{}", "Blockchain state:".bright_green().underline());
    for block in chain.blocks() {
        println!("Block #{}:", block.index);
        println!("  Hash:              {}", block.hash);
        println!("  Previous Hash:     {}", block.previous_hash);
        println!("  Transactions:      {}", block.transactions.len());
        println!("  Task Certificates: {}", block.task_certificates.len());
    }
    Ok(())
}

fn run_stake(config: Config, stakes: &[String], rounds: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = StakeLedger::new(&config.stake);
    for entry in stakes {
        let (name, amount) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=AMOUNT, got {}", entry))?;
        ledger.deposit(name, amount.parse()?)?;
    }

    let mut picks: BTreeMap<String, usize> = BTreeMap::new();
    for _ in 0..rounds {
        *picks.entry(ledger.select_validator()?).or_insert(0) += 1;
    }

    println!("{}", "Validator selection".bright_cyan().bold());
    for (identity, stake) in ledger.stakers() {
        let count = picks.get(identity).copied().unwrap_or(0);
        println!(
            "  {:<10} stake {:>8}  selected {:>6} ({:>5.1}%)  reward {:.2}",
            identity,
            stake,
            count,
            100.0 * count as f64 / rounds.max(1) as f64,
            ledger.reward(identity)
        );
    }
    Ok(())
}
