use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use cloudparity::{estimate_cost, Assessment, CostInputs, ResourceModel};
use parity_core::config::{load_core_config, CoreConfig};
use parity_core::serde_utils::{from_json_file, to_pretty_json};
use parity_engine::region::{regions_in, CloudEnvironment};
use serde::de::DeserializeOwned;
use tracing::debug;

mod render;

#[derive(Parser)]
#[command(name = "cloudparity")]
#[command(about = "Service parity and cost assessment for Azure migrations", long_about = None)]
struct Cli {
    /// Default log level when RUST_LOG is not set [default: PARITY_LOG_LEVEL or info]
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, resolve and validate every configured rule set
    Rules(RulesArgs),
    /// Assess resources against a target region
    Parity(ParityArgs),
    /// Estimate the cost of usage in the target environment
    Cost(CostArgs),
    /// List known regions
    Regions {
        #[arg(long, value_enum)]
        environment: Option<EnvironmentArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum EnvironmentArg {
    Global,
    China,
}

#[derive(Args)]
struct StoreArgs {
    /// Root directory of the rule configuration store [default: PARITY_CONFIG_DIR]
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

#[derive(Args)]
struct RulesArgs {
    #[command(flatten)]
    store: StoreArgs,
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args)]
struct ParityArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// JSON array of resources
    #[arg(long)]
    resources: PathBuf,
    /// Region identifier substituted into each resource's location [default: PARITY_TARGET_REGION]
    #[arg(long)]
    target_region: Option<String>,
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args)]
struct CostArgs {
    /// JSON array of usage records
    #[arg(long)]
    usage: PathBuf,
    /// Rate card of the source environment
    #[arg(long)]
    source_meters: PathBuf,
    /// Rate card of the target environment
    #[arg(long)]
    target_meters: PathBuf,
    /// Only price target meters of this region [default: PARITY_TARGET_REGION]
    #[arg(long)]
    target_region: Option<String>,
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_core_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::from(2);
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(err) = parity_core::logging::init_tracing(Some(level)) {
        eprintln!("failed to initialise logging: {}", err);
    }
    debug!(environment = ?config.environment, "configuration loaded");

    match run(cli.command, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the command succeeded from the assessment's point of view.
fn run(command: Commands, config: &CoreConfig) -> Result<bool> {
    match command {
        Commands::Rules(args) => {
            let assessment = load_assessment(&args.store, config)?;
            let rules = assessment.rule_engine().rules();
            match args.format {
                OutputFormat::Text => print!("{}", render::rules(rules)),
                OutputFormat::Json => {
                    let listing: Vec<_> = rules
                        .iter()
                        .map(|rule| {
                            serde_json::json!({
                                "ruleSetId": rule.rule_set_id,
                                "name": rule.name,
                                "severity": rule.severity,
                                "category": rule.category,
                                "brief": rule.brief(),
                            })
                        })
                        .collect();
                    println!("{}", to_pretty_json(&listing)?);
                }
            }
            Ok(true)
        }
        Commands::Parity(args) => {
            let Some(region) = target_region(args.target_region, config) else {
                bail!("target region is required (--target-region or PARITY_TARGET_REGION)");
            };
            let assessment = load_assessment(&args.store, config)?;
            let resources: Vec<ResourceModel> = read_json(&args.resources)?;
            debug!(resources = resources.len(), target_region = %region, "resources loaded");
            let result = assessment.parity(&resources, &region);
            match args.format {
                OutputFormat::Text => print!("{}", render::parity(&result)),
                OutputFormat::Json => println!("{}", to_pretty_json(&result)?),
            }
            Ok(result.pass())
        }
        Commands::Cost(args) => {
            let inputs = CostInputs {
                usage: read_json(&args.usage)?,
                source_meters: read_json(&args.source_meters)?,
                target_meters: read_json(&args.target_meters)?,
                target_region: target_region(args.target_region, config),
            };
            let estimate = estimate_cost(inputs)?;
            match args.format {
                OutputFormat::Text => print!("{}", render::cost(&estimate)),
                OutputFormat::Json => println!("{}", to_pretty_json(&estimate)?),
            }
            Ok(true)
        }
        Commands::Regions { environment } => {
            let text = match environment {
                Some(EnvironmentArg::Global) => render::regions(regions_in(CloudEnvironment::Global)),
                Some(EnvironmentArg::China) => render::regions(regions_in(CloudEnvironment::China)),
                None => render::regions(parity_engine::region::REGIONS),
            };
            print!("{}", text);
            Ok(true)
        }
    }
}

/// Flag first, then the environment configuration.
fn load_assessment(store: &StoreArgs, config: &CoreConfig) -> Result<Assessment> {
    let config_dir = match &store.config_dir {
        Some(dir) => dir.as_path(),
        None => config.require_config_dir()?.as_path(),
    };
    Assessment::from_config_dir(config_dir)
        .with_context(|| format!("failed to load rules from {}", config_dir.display()))
}

fn target_region(flag: Option<String>, config: &CoreConfig) -> Option<String> {
    flag.or_else(|| config.default_target_region.clone())
        .filter(|region| !region.trim().is_empty())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    from_json_file(path).with_context(|| format!("failed to read {}", path.display()))
}
