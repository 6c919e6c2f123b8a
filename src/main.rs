use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use inferd_registry::config::{AgentConfig, ConfigOverrides};
use inferd_registry::logging::init_logging;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "inferd")]
#[command(about = "Framework and model manifest registry for inference agents")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $INFERD_CONFIG or ~/.inferd.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Manifest file or directory; repeat to load several
    #[arg(short = 'm', long = "manifests", global = true, value_name = "PATH")]
    manifests: Vec<PathBuf>,

    /// Root for framework and model work directories
    #[arg(long, global = true, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// -v for debug logging, -vv for trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered frameworks
    Frameworks {
        #[arg(long)]
        json: bool,
    },
    /// List registered models
    Models {
        /// Only models usable with this framework (canonical name, e.g. tensorrt:5.1.5)
        #[arg(long, value_name = "FRAMEWORK")]
        framework: Option<String>,
        /// Include hidden models
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show which framework a model resolves to
    Resolve {
        model: String,
        /// Model version; the highest registered version when omitted
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Create and print the work directories for a model
    Workdir {
        model: String,
        #[arg(long)]
        version: Option<String>,
    },
    /// Load every manifest and report registration failures
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        temp_dir: cli.temp_dir.clone(),
        debug: (cli.verbose >= 1).then_some(true),
        verbose: (cli.verbose >= 2).then_some(true),
        manifest_paths: cli.manifests.clone(),
        ..Default::default()
    };
    let config = AgentConfig::load(cli.config.as_deref(), &overrides)?;
    init_logging(&config.logging, config.app.debug, config.app.verbose)?;

    match cli.command {
        Commands::Frameworks { json } => commands::list::frameworks(&config, json),
        Commands::Models {
            framework,
            all,
            json,
        } => commands::list::models(&config, framework.as_deref(), all, json),
        Commands::Resolve {
            model,
            version,
            json,
        } => commands::resolve::run(&config, &model, version.as_deref(), json),
        Commands::Workdir { model, version } => {
            commands::workdir::run(&config, &model, version.as_deref())
        }
        Commands::Check => {
            if !commands::check::run(&config)? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
