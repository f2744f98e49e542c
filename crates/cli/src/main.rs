//! # homedns
//!
//! Authoritative, caching and forwarding DNS server with a token-secured
//! control API.

mod bootstrap;
mod commands;
mod di;
mod server;

use clap::{Parser, Subcommand};
use commands::jwt::JwtCommand;
use homedns_domain::CliOverrides;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "homedns")]
#[command(version)]
#[command(about = "Self-hosted authoritative, caching and forwarding DNS server")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the DNS listeners and the control API
    Server(ServerArgs),

    /// Manage control API credentials on this host
    #[command(subcommand)]
    Jwt(JwtCommand),
}

#[derive(clap::Args)]
struct ServerArgs {
    /// DNS port (UDP and TCP)
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Control API port
    #[arg(short = 'a', long)]
    api_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Record store path
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Command::Server(args) => CliOverrides {
            dns_port: args.dns_port,
            api_port: args.api_port,
            bind_address: args.bind.clone(),
            database_path: args.database.clone(),
            log_level: cli.log_level.clone(),
        },
        Command::Jwt(_) => CliOverrides {
            log_level: cli.log_level.clone(),
            ..CliOverrides::default()
        },
    };

    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config.logging)?;

    match cli.command {
        Command::Server(_) => {
            bootstrap::log_config(cli.config.as_deref(), &config);
            commands::server::run(config).await
        }
        Command::Jwt(command) => commands::jwt::run(command, &config).await,
    }
}
