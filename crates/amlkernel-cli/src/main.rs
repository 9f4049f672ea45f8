//! AmlKernels CLI tool.
//!
//! Runs the analysis over a JSON ledger export and inspects the kernel
//! catalogue and configuration.

use amlkernel_core::{
    config::AnalysisConfig,
    domain::Domain,
    kernel::{KernelMetadata, KernelMode},
    logging::LogLevel,
    registry::KernelRegistry,
};
use amlkernels::catalog::{DomainInfo, domains, total_kernel_count};
use amlkernels::ledger::table::{RawTable, TransactionTable};
use amlkernels::pipeline::AmlAnalysis;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "amlkernel")]
#[command(version, about = "Anti-money-laundering analytics over transaction ledgers", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a ledger and write the report as JSON
    Analyze {
        /// JSON array of transaction records
        #[arg(short, long)]
        input: PathBuf,

        /// TOML configuration file (defaults plus AMLKERNEL_* variables otherwise)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep only the N highest-ranked accounts and clusters
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Check a ledger file without analyzing it
    Validate {
        /// JSON array of transaction records
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List available kernels
    List {
        /// Filter by domain (e.g., ledger, graph, ml, compliance)
        #[arg(short, long)]
        domain: Option<String>,

        /// Filter by mode (batch/iterative)
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Show kernel information
    Info {
        /// Kernel ID (e.g., graph/pagerank)
        kernel_id: String,
    },

    /// Show kernel registry statistics
    Stats,

    /// Print the effective configuration as TOML
    Config {
        /// Write the configuration here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Analyze { config, .. } => config.as_deref(),
        _ => None,
    };
    let config = load_config(config_path)?;

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging = logging.with_level(LogLevel::Debug);
    }
    if cli.json_logs {
        logging = logging.with_structured(true);
    }
    logging.init()?;

    match cli.command {
        Commands::Analyze {
            input,
            output,
            top,
            ..
        } => {
            cmd_analyze(config, &input, output.as_deref(), top).await?;
        }

        Commands::Validate { input } => {
            cmd_validate(&input)?;
        }

        Commands::List { domain, mode } => {
            cmd_list(domain, mode)?;
        }

        Commands::Info { kernel_id } => {
            cmd_info(&kernel_id)?;
        }

        Commands::Stats => {
            cmd_stats()?;
        }

        Commands::Config { output } => {
            cmd_config(&config, output.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    let config = match path {
        Some(path) => {
            let config = AnalysisConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.validate()?;
            config
        }
        None => AnalysisConfig::from_env()?,
    };
    Ok(config)
}

fn load_table(input: &Path) -> anyhow::Result<TransactionTable> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let raw = RawTable::from_json(&text)?;
    let table = TransactionTable::from_raw(&raw)
        .with_context(|| format!("validating {}", input.display()))?;
    info!(
        path = %input.display(),
        transactions = table.len(),
        accounts = table.accounts().len(),
        "Loaded ledger"
    );
    Ok(table)
}

async fn cmd_analyze(
    config: AnalysisConfig,
    input: &Path,
    output: Option<&Path>,
    top: Option<usize>,
) -> anyhow::Result<()> {
    let table = load_table(input)?;

    let mut report = AmlAnalysis::new(config).run_with_timeout(&table).await?;
    if let Some(n) = top {
        report.truncate(n);
    }

    let json = report.to_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_validate(input: &Path) -> anyhow::Result<()> {
    let table = load_table(input)?;

    println!("✓ {} is a valid ledger", input.display());
    println!("  Transactions: {}", table.len());
    println!("  Accounts:     {}", table.accounts().len());
    println!("  Total amount: {:.2}", table.total_amount());
    Ok(())
}

fn populated_registry() -> anyhow::Result<KernelRegistry> {
    let registry = KernelRegistry::new();
    amlkernels::register_all(&registry)?;
    Ok(registry)
}

fn cmd_list(domain_filter: Option<String>, mode_filter: Option<String>) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              AmlKernels Kernel Catalogue                         ║");
    println!("╚══════════════════════════════════════════════════════════════════╝\n");

    let registry = populated_registry()?;
    let all_domains = domains();

    let mode = match mode_filter.as_deref().map(str::to_lowercase).as_deref() {
        None => None,
        Some("batch") => Some(KernelMode::Batch),
        Some("iterative") => Some(KernelMode::Iterative),
        Some(other) => anyhow::bail!("Unknown mode '{}'. Use batch or iterative.", other),
    };

    match domain_filter {
        Some(name) => match name.parse::<Domain>() {
            Ok(domain) => {
                for info in all_domains.iter().filter(|d| d.domain == domain) {
                    print_domain_kernels(&registry, info, mode);
                }
            }
            Err(_) => {
                println!("Unknown domain. Available domains:");
                for d in &all_domains {
                    println!("  - {} ({})", d.name, d.feature);
                }
                return Ok(());
            }
        },
        None => {
            for info in &all_domains {
                print_domain_kernels(&registry, info, mode);
            }
        }
    }

    println!(
        "\nTotal: {} kernels across {} domains",
        total_kernel_count(),
        all_domains.len()
    );

    Ok(())
}

fn print_domain_kernels(registry: &KernelRegistry, info: &DomainInfo, mode: Option<KernelMode>) {
    println!("┌─────────────────────────────────────────────────────────────────┐");
    println!("│ {} ({} kernels)", info.name, info.kernel_count);
    println!("│ {}", info.description);
    println!("├─────────────────────────────────────────────────────────────────┤");

    let mut kernels: Vec<KernelMetadata> = registry
        .by_domain(info.domain)
        .into_iter()
        .filter(|k| mode.is_none_or(|m| k.mode == m))
        .collect();
    kernels.sort_by(|a, b| a.id.cmp(&b.id));

    for kernel in &kernels {
        println!(
            "│  [{:<9}] {:<30} - {}",
            kernel.mode.as_str(),
            kernel.id,
            kernel.description
        );
    }

    println!("└─────────────────────────────────────────────────────────────────┘\n");
}

fn cmd_info(kernel_id: &str) -> anyhow::Result<()> {
    let registry = populated_registry()?;
    let kernel = registry.require(kernel_id)?;

    println!("{}", kernel.qualified_name());
    println!("  ID:          {}", kernel.id);
    println!("  Domain:      {}", kernel.domain);
    println!("  Mode:        {}", kernel.mode);
    println!("  Description: {}", kernel.description);
    println!("  Throughput:  {} items/s", kernel.expected_throughput);
    println!("  Latency:     {:.1} us", kernel.target_latency_us);
    println!("  Version:     {}", kernel.version);
    Ok(())
}

fn cmd_stats() -> anyhow::Result<()> {
    let registry = populated_registry()?;
    let stats = registry.stats();

    println!("Kernel Registry Statistics");
    println!("==========================");
    println!("Total kernels:     {}", stats.total);
    println!("Batch kernels:     {}", stats.batch_kernels);
    println!("Iterative kernels: {}", stats.iterative_kernels);
    println!();
    println!("By domain:");
    for domain in Domain::ALL {
        let count = stats.by_domain.get(domain).copied().unwrap_or(0);
        println!("  {:<16} {}", domain.as_str(), count);
    }
    Ok(())
}

fn cmd_config(config: &AnalysisConfig, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            config.to_file(path)?;
            println!("✓ Configuration written to {}", path.display());
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
