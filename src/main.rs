use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod api;
mod config;
mod data_source;
mod error;
mod processing;
mod protocol;
mod service;

use config::Cli;
use data_source::serial::SerialDataSource;
use service::create_shared_state;
use service::data_loop::MonitoringLoop;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with colors and stderr output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "freshness_service=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if cli.list_ports {
        list_serial_ports();
        return Ok(());
    }

    cli.validate()?;

    let Some(data_source_config) = cli.to_data_source_config() else {
        eprintln!("Error: Please specify a mode (serial or playback)");
        eprintln!("Use --help for usage information");
        std::process::exit(1);
    };

    let monitor_config = cli.to_monitor_config();

    tracing::info!(
        "Starting freshness service on {}:{} monitoring {}",
        cli.host,
        cli.listen,
        monitor_config.fruit
    );

    let state = create_shared_state(monitor_config.fruit);

    let mut data_source = data_source_config.create_source();
    tracing::info!("Reading samples from {}", data_source.name());

    let sample_rx = data_source.start().await?;

    let monitoring_loop = MonitoringLoop::new(
        state.clone(),
        &monitor_config,
        data_source_config.time_base(),
    );

    let monitoring_handle = tokio::spawn(async move {
        if let Err(e) = monitoring_loop.run(sample_rx).await {
            tracing::error!("Monitoring loop error: {}", e);
        }
    });

    let router = api::create_router(state);
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.listen).parse()?;

    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");
    data_source.stop().await?;
    monitoring_handle.abort();

    Ok(())
}

/// List available serial ports
fn list_serial_ports() {
    match SerialDataSource::list_available_ports() {
        Ok(ports) => {
            if ports.is_empty() {
                println!("No serial ports found");
            } else {
                println!("Available serial ports:");
                for port in ports {
                    let port_type = match port.port_type {
                        serialport::SerialPortType::UsbPort(info) => {
                            format!(
                                "USB - {}",
                                info.product.unwrap_or_else(|| "Unknown".to_string())
                            )
                        }
                        serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                        serialport::SerialPortType::PciPort => "PCI".to_string(),
                        serialport::SerialPortType::Unknown => "Unknown".to_string(),
                    };
                    println!("  {} - {}", port.port_name, port_type);
                }
            }
        }
        Err(e) => {
            eprintln!("Error listing serial ports: {}", e);
        }
    }
}

/// Wait for shutdown signal (Ctrl+C)
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
