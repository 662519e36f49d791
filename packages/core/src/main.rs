use clap::Parser;
use dotenvy::dotenv;

use line_item_monitor::app;
use line_item_monitor::cli::Cli;
use line_item_monitor::config::Config;
use line_item_monitor::credentials::Credentials;
use line_item_monitor::error::AppError;
use line_item_monitor::logging::init_logging;

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();
    dotenv().ok();
    init_logging();

    if let Err(err) = run().await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env().map_err(AppError::Config)?;
    let credentials = Credentials::from_env()?;

    tracing::info!(
        "Monitoring worksheet '{}' of spreadsheet {}",
        config.sheet.worksheet_name,
        config.sheet.spreadsheet_id
    );

    app::run(&config, &credentials).await?;
    Ok(())
}
