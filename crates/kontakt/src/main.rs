//! Kontakt service entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use kontakt::build_server;
use kontakt_config::{ConfigLoader, KontaktConfig, ENV_PREFIX, MODE_VAR};
use kontakt_registry::ContactRegistry;
use kontakt_telemetry::{init_logging, init_metrics};

/// Command-line arguments.
struct Args {
    /// Path to a configuration file, taking the place of `KONTAKT_CONFIG`.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("kontakt {}", kontakt::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Kontakt - greeting, search and contact registry service

USAGE:
    kontakt [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    KONTAKT_ENV                           production | development (default: development)
    KONTAKT_CONFIG                        Path to configuration file
    KONTAKT__SERVER__HTTP_ADDR            Listen address (default: 127.0.0.1:8000)
    KONTAKT__SERVER__REQUEST_TIMEOUT_MS   Request timeout (default: 30000)
    KONTAKT__TELEMETRY__LOGGING__LEVEL    Log filter directive
    KONTAKT__TELEMETRY__METRICS__ENABLED  Start the Prometheus exporter
"
    );
}

fn load_config(args: &Args) -> Result<KontaktConfig, kontakt_config::ConfigError> {
    match &args.config {
        Some(path) => ConfigLoader::new()
            .with_dotenv()
            .with_file(path)?
            .with_env_prefix(ENV_PREFIX)
            .with_mode_var(MODE_VAR)
            .load(),
        None => ConfigLoader::from_env(),
    }
}

async fn run(config: KontaktConfig) -> anyhow::Result<()> {
    init_metrics(&config.metrics_config()).context("Failed to start metrics exporter")?;

    let registry = Arc::new(ContactRegistry::new());
    let server = build_server(&config, registry).context("Failed to build server")?;

    info!(
        version = kontakt::VERSION,
        mode = %config.environment,
        addr = %config.server.http_addr,
        "Starting Kontakt"
    );

    server.run().await.context("Server failed")?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.log_config()) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!(error = %format!("{e:#}"), "Kontakt stopped with an error");
        std::process::exit(1);
    }
}
