use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use env_logger::Env;
use log::{info, LevelFilter};
use rand::Rng;
use std::path::PathBuf;

use gossipsim::config::{Experiment, ExperimentConfig, GeneralConfig, TopologyConfig};
use gossipsim::config_loader;
use gossipsim::orchestrator::run_experiment;
use gossipsim::report::{print_report, ReportFormat};
use gossipsim::simulation::{AveragingMode, GossipMode};
use gossipsim::topology::{SchedulingMode, TopologyKind};

/// Gossip protocol simulator over synthetic network topologies
#[derive(Parser, Debug)]
#[command(name = "gossipsim", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Report format written to stdout
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synchronous SI dissemination
    Si {
        #[command(flatten)]
        topology: TopologyArgs,
        #[command(flatten)]
        gossip: GossipArgs,
    },
    /// SI dissemination with delayed delivery
    SiAsync {
        #[command(flatten)]
        topology: TopologyArgs,
        #[command(flatten)]
        gossip: GossipArgs,
    },
    /// SIR rumor mongering with feedback-driven recovery
    Sir {
        #[command(flatten)]
        topology: TopologyArgs,
        #[command(flatten)]
        gossip: GossipArgs,
        /// Expected redundant contacts tolerated before losing interest
        #[arg(short, long, default_value_t = 1.0)]
        k: f64,
    },
    /// Push-Sum or Push-Flow averaging
    Average {
        #[command(flatten)]
        topology: TopologyArgs,
        #[arg(long, value_enum, default_value_t = AveragingMode::PushSum)]
        algorithm: AveragingMode,
        /// Number of rounds to run
        #[arg(short, long, default_value_t = 50)]
        rounds: usize,
        /// Probability that a message is lost
        #[arg(long, default_value_t = 0.0)]
        loss: f64,
        /// Comma-separated initial values, one per node
        #[arg(long, value_delimiter = ',')]
        values: Option<Vec<f64>>,
    },
    /// Run an experiment described in a YAML file
    Run {
        /// Path to the experiment configuration YAML file
        #[arg(short, long)]
        config: PathBuf,
        /// Override the seed from the configuration
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args, Debug, Clone)]
struct TopologyArgs {
    #[arg(long, value_enum, default_value_t = TopologyKind::Complete)]
    topology: TopologyKind,
    /// Number of nodes
    #[arg(short, long, default_value_t = 100)]
    nodes: usize,
    /// Connection radius for geometric topologies
    #[arg(long)]
    radius: Option<f64>,
    #[arg(long, value_enum, default_value_t = SchedulingMode::Fixed)]
    scheduling: SchedulingMode,
    /// Seed for the random source; drawn at startup when absent
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
struct GossipArgs {
    #[arg(long, value_enum, default_value_t = GossipMode::PushPull)]
    mode: GossipMode,
    /// Node holding the rumor at round 0
    #[arg(long, default_value_t = 0)]
    start_node: usize,
    /// Probability that a message is lost
    #[arg(long, default_value_t = 0.0)]
    loss: f64,
}

impl TopologyArgs {
    fn into_config(self, experiment: Experiment) -> ExperimentConfig {
        ExperimentConfig {
            general: GeneralConfig {
                seed: self.seed,
                log_level: None,
            },
            topology: TopologyConfig {
                kind: self.topology,
                nodes: self.nodes,
                radius: self.radius,
                scheduling: self.scheduling,
            },
            experiment,
        }
    }
}

impl Command {
    /// Experiment described by the command line or the referenced file
    fn into_config(self) -> Result<ExperimentConfig> {
        let config = match self {
            Command::Si { topology, gossip } => topology.into_config(Experiment::Si {
                mode: gossip.mode,
                start_node: gossip.start_node,
                loss_probability: gossip.loss,
            }),
            Command::SiAsync { topology, gossip } => topology.into_config(Experiment::SiAsync {
                mode: gossip.mode,
                start_node: gossip.start_node,
                loss_probability: gossip.loss,
            }),
            Command::Sir { topology, gossip, k } => topology.into_config(Experiment::Sir {
                mode: gossip.mode,
                start_node: gossip.start_node,
                k,
                loss_probability: gossip.loss,
            }),
            Command::Average {
                topology,
                algorithm,
                rounds,
                loss,
                values,
            } => topology.into_config(Experiment::Averaging {
                algorithm,
                rounds,
                loss_probability: loss,
                initial_values: values,
            }),
            Command::Run { config, seed } => {
                let mut loaded = config_loader::load_config(&config)?;
                if seed.is_some() {
                    loaded.general.seed = seed;
                }
                loaded
            }
        };
        Ok(config)
    }
}

/// Level requested by the config, "info" when absent
fn config_level(general: &GeneralConfig) -> LevelFilter {
    general
        .log_level
        .as_deref()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();
    let format = cli.format;
    let cli_log_level = cli.log_level;

    // Initialize logging before the config is loaded so the loader's records
    // are kept. Without --log-level or RUST_LOG the level is settled by
    // general.log_level once the config is known.
    let deferred = cli_log_level.is_none() && std::env::var_os("RUST_LOG").is_none();
    let filter = match (&cli_log_level, deferred) {
        (Some(level), _) => level.clone(),
        (None, true) => "trace".to_string(),
        (None, false) => "info".to_string(),
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();
    if deferred {
        log::set_max_level(LevelFilter::Info);
    }

    let config = cli.command.into_config()?;
    if deferred {
        log::set_max_level(config_level(&config.general));
    }

    config.validate()?;

    let seed = match config.general.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::thread_rng().gen();
            info!("No seed given, drew seed {}", seed);
            seed
        }
    };

    info!(
        "Starting {} experiment on {} {} nodes (seed {})",
        config.experiment.protocol(),
        config.topology.nodes,
        config.topology.kind.as_str(),
        seed
    );

    let report = run_experiment(&config, seed)?;
    print_report(&report, format)?;

    Ok(())
}
