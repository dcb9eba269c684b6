//! Jolokia CLI
//!
//! Runs list, read, search, write and exec requests against MBeans loaded
//! from a fixture file and prints the JSON response envelope.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jolokia_core::config::AgentConfig;
use jolokia_core::handler::{JolokiaContext, JolokiaRequest, RequestDispatcher};
use jolokia_core::logging_facility::{init, Profile};
use jolokia_core::restrictor::RuleRestrictor;
use jolokia_core::server::MBeanServerAccess;

mod commands;
mod fixture;

#[derive(Debug, Parser)]
#[command(name = "jolokia")]
#[command(about = "Jolokia - JSON access to MBeans", long_about = None)]
struct Cli {
    /// Fixture file describing the MBeans to serve
    fixture: PathBuf,

    /// Agent configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Access policy (TOML)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Log request handling to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List MBean metadata
    List(commands::list::ListArgs),
    /// Read attributes
    Read(commands::read::ReadArgs),
    /// Search MBean names
    Search(commands::search::SearchArgs),
    /// Write an attribute
    Write(commands::write::WriteArgs),
    /// Invoke an operation
    Exec(commands::exec::ExecArgs),
}

fn context(cli: &Cli) -> Result<JolokiaContext, Box<dyn std::error::Error>> {
    let server = fixture::load(&cli.fixture)?;
    let mut config = match &cli.config {
        Some(path) => AgentConfig::from_file(path)?,
        None => AgentConfig::default(),
    };
    config.apply_env_overrides()?;

    let mut ctx =
        JolokiaContext::new(MBeanServerAccess::single(Arc::new(server))).with_config(config);
    if let Some(path) = &cli.policy {
        ctx = ctx.with_restrictor(Arc::new(RuleRestrictor::from_file(path)?));
    }
    Ok(ctx)
}

fn request(command: Commands) -> jolokia_core::Result<JolokiaRequest> {
    match command {
        Commands::List(args) => commands::list::request(args),
        Commands::Read(args) => commands::read::request(args),
        Commands::Search(args) => commands::search::request(args),
        Commands::Write(args) => commands::write::request(args),
        Commands::Exec(args) => commands::exec::request(args),
    }
}

/// Returns the response status
fn run(cli: Cli) -> Result<u16, Box<dyn std::error::Error>> {
    let ctx = context(&cli)?;
    let request = request(cli.command)?;
    let response = RequestDispatcher::new().execute(&ctx, &request);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response["status"]
        .as_u64()
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(500))
}

fn main() {
    let cli = Cli::parse();
    if cli.verbose {
        init(Profile::Development);
    }

    match run(cli) {
        Ok(200) => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
