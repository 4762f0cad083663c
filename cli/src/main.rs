//! GBP CLI
//!
//! Command-line interface for group-based policy objects.
//!
//! # Usage
//!
//! ```bash
//! gbp contract list
//! gbp rule create --name allow-web --classifier <ID> --action <ID>
//! gbp epg create --name epg-a --provides <ID> --consumes <ID>
//! gbp classifier create --name https --protocol tcp --min-port 443 --max-port 443 --direction in --action allow
//! gbp action list --format json
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "gbp")]
#[command(version)]
#[command(about = "Group-Policy Command Line Interface", long_about = None)]
struct Cli {
    /// Neutron endpoint URL
    #[arg(long, env = "GBP_ENDPOINT")]
    endpoint: Option<String>,

    /// Auth token sent as X-Auth-Token
    #[arg(long, env = "GBP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Tenant ID
    #[arg(long, env = "GBP_TENANT_ID")]
    tenant_id: Option<String>,

    /// Output format
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage endpoint groups
    Epg {
        #[command(subcommand)]
        action: EpgCommands,
    },
    /// Manage contracts
    Contract {
        #[command(subcommand)]
        action: ContractCommands,
    },
    /// Manage policy rules
    Rule {
        #[command(subcommand)]
        action: RuleCommands,
    },
    /// Manage policy classifiers
    Classifier {
        #[command(subcommand)]
        action: ClassifierCommands,
    },
    /// Manage policy actions
    Action {
        #[command(subcommand)]
        action: ActionCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum EpgCommands {
    /// List endpoint groups
    List,
    /// Show endpoint group details
    Show { id: String },
    /// Create an endpoint group
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Provided contract ID (repeatable)
        #[arg(long = "provides")]
        provides: Vec<String>,
        /// Consumed contract ID (repeatable)
        #[arg(long = "consumes")]
        consumes: Vec<String>,
    },
    /// Update an endpoint group
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "provides")]
        provides: Vec<String>,
        #[arg(long = "consumes")]
        consumes: Vec<String>,
    },
    /// Delete an endpoint group
    Delete { id: String },
}

#[derive(Subcommand)]
enum ContractCommands {
    /// List contracts
    List,
    /// Show contract details
    Show { id: String },
    /// Create a contract
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Policy rule ID (repeatable)
        #[arg(long = "rule")]
        rules: Vec<String>,
    },
    /// Update a contract
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "rule")]
        rules: Vec<String>,
    },
    /// Delete a contract
    Delete { id: String },
}

#[derive(Subcommand)]
enum RuleCommands {
    /// List policy rules
    List,
    /// Show policy rule details
    Show { id: String },
    /// Create a policy rule
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Classifier ID (repeatable)
        #[arg(long = "classifier")]
        classifiers: Vec<String>,
        /// Action ID (repeatable)
        #[arg(long = "action")]
        actions: Vec<String>,
    },
    /// Update a policy rule
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "classifier")]
        classifiers: Vec<String>,
        #[arg(long = "action")]
        actions: Vec<String>,
    },
    /// Delete a policy rule
    Delete { id: String },
}

#[derive(Subcommand)]
enum ClassifierCommands {
    /// List policy classifiers
    List,
    /// Show policy classifier details
    Show { id: String },
    /// Create a policy classifier
    Create {
        #[arg(long)]
        name: Option<String>,
        /// tcp, udp, icmp or any
        #[arg(long)]
        protocol: String,
        #[arg(long)]
        min_port: Option<String>,
        #[arg(long)]
        max_port: Option<String>,
        /// in, out or bi
        #[arg(long)]
        direction: String,
        /// allow or redirect
        #[arg(long)]
        action: String,
    },
    /// Update a policy classifier
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        protocol: Option<String>,
        #[arg(long)]
        min_port: Option<u16>,
        #[arg(long)]
        max_port: Option<u16>,
        #[arg(long)]
        direction: Option<String>,
        #[arg(long)]
        action: Option<String>,
    },
    /// Delete a policy classifier
    Delete { id: String },
}

#[derive(Subcommand)]
enum ActionCommands {
    /// List policy actions
    List,
    /// Show policy action details
    Show { id: String },
    /// Create a policy action
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update a policy action
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a policy action
    Delete { id: String },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let profile = cli.profile.as_deref();
    if let Commands::Config { action } = cli.command {
        return commands::config::handle(action, profile);
    }

    let config = config::Config::load(profile)?;
    let format = cli
        .format
        .or(config.default_format)
        .unwrap_or(output::OutputFormat::Table);
    let session = commands::Session::connect(
        cli.endpoint.or(config.endpoint),
        cli.token.or(config.token),
        cli.tenant_id.or(config.tenant_id),
    )?;

    match cli.command {
        Commands::Epg { action } => commands::epg::handle(action, &session, format).await,
        Commands::Contract { action } => commands::contracts::handle(action, &session, format).await,
        Commands::Rule { action } => commands::rules::handle(action, &session, format).await,
        Commands::Classifier { action } => commands::classifiers::handle(action, &session, format).await,
        Commands::Action { action } => commands::actions::handle(action, &session, format).await,
        Commands::Config { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
