mod config;
mod database;
mod entities;
mod error;
mod http_server;
mod logging;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{config::Config, database::Database, logging::init_tracing, services::user::UserService};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "CINEMA_API_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `cinema_api=debug,sqlx=warn`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP collector endpoint for exporting traces
    #[arg(long, global = true, env = "OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the REST API
    Serve {
        /// The port to run the server on, overrides the config file
        #[arg(short, long, env = "CINEMA_API_HTTP_PORT")]
        port: Option<u16>,
    },
    #[command(subcommand)]
    Users(UserCommands),
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Create a user and print its API token
    Create {
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        "cinema-api",
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    let result = run(args).await;

    if let Some(tracer_provider) = tracer_provider
        && let Err(e) = tracer_provider.shutdown()
    {
        eprintln!("Failed to flush traces: {e}");
    }

    result
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::load_or_default(),
    }
    .wrap_err("Failed to load cinema-api config")
}

async fn open_database(config: &Config) -> Result<Arc<Database>> {
    tracing::debug!("Opening database at: {}", config.database_path().display());
    Ok(Arc::new(Database::open(&config.database_path()).await?))
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Serve { port } => {
            let mut config = load_config(args.config.as_deref())?;
            if let Some(port) = port {
                config.port = port;
            }
            let database = open_database(&config).await?;

            tracing::info!("Starting HTTP server on port: {}", config.port);
            http_server::app::start(&config, database).await?;
        }
        Commands::Users(UserCommands::Create { username }) => {
            let config = load_config(args.config.as_deref())?;
            let database = open_database(&config).await?;

            let (user, token) = UserService::new(database)
                .create(&username)
                .await
                .wrap_err("Failed to create user")?;
            println!("Created user {} (ID: {})", user.username, user.id);
            println!("API token (shown only once): {token}");
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                tracing::info!("Default config written to {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
