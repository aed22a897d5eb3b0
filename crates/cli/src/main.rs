use std::process::ExitCode;
use std::sync::Arc;

use catalog_core::adapters::config::{app_config::AppConfig, logging_config::LoggingConfig};
use catalog_core::prettyprint::prettyprint::PrettyFormatter;
use clap::Parser;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::Resource;
use tracing::{error, info};
use tracing_indicatif::IndicatifLayer;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

mod application_service_factory;
mod args;
mod cli_adapter;
mod render;

use application_service_factory::ApplicationServiceFactory;
use args::Cli;
use cli_adapter::CliAdapter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(report) => {
            eprintln!("Failed to load configuration: {:?}", report);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = setup_tracing(&config.logging) {
        eprintln!("Failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }
    setup_panic_hook();

    info!("Starting catalog CLI");

    let exit_code = match ApplicationServiceFactory::create(&config).await {
        Ok(service) => {
            let cli_adapter = Arc::new(CliAdapter::new(service));
            match cli_adapter.run(cli.command).await {
                Ok(output) => {
                    println!("{}", output);
                    ExitCode::SUCCESS
                }
                Err(report) => {
                    error!("Command failed: {:?}", report);
                    ExitCode::FAILURE
                }
            }
        }
        Err(report) => {
            error!("Failed to start: {:?}", report);
            ExitCode::FAILURE
        }
    };

    opentelemetry::global::shutdown_tracer_provider();
    exit_code
}

fn otlp_tracer(endpoint: &str) -> Result<sdktrace::Tracer, Box<dyn std::error::Error>> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", "catalog_cli"),
        ])))
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    Ok(tracer)
}

fn setup_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let indicatif_layer = IndicatifLayer::new();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(indicatif_layer.get_stderr_writer())
        .with_filter(LevelFilter::INFO);

    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(false))
        .with_writer(std::fs::File::create(&logging.file)?)
        .with_ansi(false);

    let otel_layer = match &logging.otlp_endpoint {
        Some(endpoint) => Some(OpenTelemetryLayer::new(otlp_tracer(endpoint)?)),
        None => None,
    };

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("catalog", tracing::Level::TRACE)
                .with_target("catalog_core", tracing::Level::TRACE),
        )
        .with(otel_layer)
        .with(indicatif_layer)
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
        opentelemetry::global::shutdown_tracer_provider();
    }));
}
