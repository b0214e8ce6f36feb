use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use airq::api::AppState;
use airq::predictor::load_predictor;
use airq::{AirqConfig, AirqError, EstimatorService, OpenMeteoClient, RegionTable, web};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AirqConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _telemetry = match airq::telemetry::init(&config.logging, cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Domain errors carry a message meant for the user
            match e.downcast_ref::<AirqError>() {
                Some(err) => eprintln!("Error: {}", err.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: AirqConfig) -> Result<()> {
    debug!("Configuration: {:?}", config);
    let zone = config.display_timezone()?;

    let client = Arc::new(OpenMeteoClient::new(&config)?);
    // Only estimates need the model, so skip the artifact fetch otherwise
    let predictor = match &cli.command {
        Command::Serve { .. } | Command::Predict(_) => load_predictor(&config).await.ok(),
        Command::Regions | Command::Live { .. } => None,
    };
    let service = EstimatorService::new(
        client.clone(),
        client,
        predictor,
        RegionTable::default(),
        zone,
    );

    match cli.command {
        Command::Regions => print!("{}", cli::render_regions(&service.regions())),
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            // Geocoding and the air-quality fetch each get the upstream timeout
            let request_timeout = config.timeout() * 2 + Duration::from_secs(5);
            info!(
                "Starting server on {}:{} (model loaded: {})",
                config.server.host,
                port,
                service.model_loaded()
            );
            web::run(
                &config.server.host,
                port,
                AppState::new(service),
                request_timeout,
            )
            .await?;
        }
        Command::Live {
            district,
            region,
            json,
        } => {
            let district = service.resolve_district(region.as_deref(), &district)?;
            let live = service.fetch_live(&district).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&live).context("Failed to encode readings")?
                );
            } else {
                print!("{}", cli::render_live(&live, zone.name()));
            }
        }
        Command::Predict(args) => {
            let estimate = service.estimate(args.to_request()).await?;
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&estimate).context("Failed to encode estimate")?
                );
            } else {
                print!("{}", cli::render_estimate(&estimate, zone.name()));
            }
        }
    }

    Ok(())
}
