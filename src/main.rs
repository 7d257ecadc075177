use clap::Parser;
use mailprobe::utils::{logger, validation::Validate};
use mailprobe::{server, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();

    logger::init_logger(config.verbose);

    tracing::info!("Starting mailprobe");
    if config.verbose {
        tracing::debug!("Config: port={} verifier_url={}", config.port, config.verifier_url);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    server::serve(config).await
}
