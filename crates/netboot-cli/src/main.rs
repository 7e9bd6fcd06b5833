//! netboot-auth - credential gate for network boot
//!
//! Serves the iPXE menu only to users who pass the local store or the
//! LDAP/AD directory, and generates bcrypt hashes for the local store.

mod commands;

use clap::{Parser, Subcommand};
use netboot_core::config::{LoggingConfig, ServiceConfig};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "netboot-auth")]
#[command(author = "Netboot Team")]
#[command(version = netboot_core::VERSION)]
#[command(about = "Credential gate for network boot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Bind address
    #[arg(long, env = "NETBOOT_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port number
    #[arg(short, long, env = "NETBOOT_PORT")]
    port: Option<u16>,

    /// Authentication config (mode, ldap settings)
    #[arg(long, env = "AUTH_CONFIG_PATH")]
    auth_config: Option<PathBuf>,

    /// Local credential store
    #[arg(long, env = "AUTH_USERS_PATH")]
    users: Option<PathBuf>,

    /// iPXE menu served on success
    #[arg(long, env = "IPXE_MENU_PATH")]
    menu: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "NETBOOT_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, env = "NETBOOT_LOG_FORMAT", global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the auth service (default)
    Serve,

    /// Print a bcrypt hash for users.yml
    HashPassword {
        /// Password to hash; read from stdin when omitted
        password: Option<String>,

        /// bcrypt cost
        #[arg(long, default_value_t = netboot_crypto::DEFAULT_COST)]
        cost: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Some(Commands::HashPassword { password, cost }) = cli.command {
        return commands::hash_password::execute(password, cost);
    }

    let mut config = ServiceConfig::from_env();

    // Override with CLI args
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(path) = cli.auth_config {
        config.paths.auth_config = path;
    }
    if let Some(path) = cli.users {
        config.paths.users = path;
    }
    if let Some(path) = cli.menu {
        config.paths.menu = path;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    init_logging(&config.logging);

    commands::serve::execute(config).await
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
