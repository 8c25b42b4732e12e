use clap::Parser;
use ext_config::{Config, File, FileFormat};
use tracing::{error, info};

use ethereum_exporter::{config::ExporterConfig, EthereumExporter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Prometheus exporter for Ethereum network, price and balance data", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(
        short = 'c',
        long = "config",
        default_value = "eth-exporter-config.toml"
    )]
    config_path: String,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();

    info!(
        "Starting {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = match Config::builder()
        .add_source(File::new(&args.config_path, FileFormat::Toml))
        .build()
    {
        Ok(settings) => match settings.try_deserialize::<ExporterConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to parse config file {}: {e}", args.config_path);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to read config file {}: {e}", args.config_path);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    if let Err(e) = EthereumExporter::new(config).start().await {
        error!("Exporter failed: {e}");
        std::process::exit(1);
    }
}
