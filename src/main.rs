use clap::Parser;
use dark_export::utils::{logger, validation::Validate};
use dark_export::{
    BundledModule, CliConfig, DeliveryManager, ExportTrigger, LocalStore, MessageBridge,
    WasmConverter,
};
use std::sync::Arc;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting dark-export");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let dashboard_url = Url::parse(&config.dashboard_url)?;

    let converter = Arc::new(WasmConverter::new(BundledModule::new(&config.module_path)));
    let delivery = Arc::new(DeliveryManager::new(LocalStore::new(&config.output_path)));
    let bridge = MessageBridge::spawn(converter, delivery);
    let trigger = ExportTrigger::new(bridge);

    match trigger.export(&dashboard_url).await {
        Ok(response) => {
            tracing::info!("Export completed successfully");
            println!("Dashboard exported ({} bytes of manifest)", response.result.len());
        }
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
