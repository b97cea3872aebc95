//! chrome-info-exporter
//!
//! Periodic Chrome process memory report with tracing logging.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod metrics;
mod startup_checks;
mod state;

use axum::{routing::get, Router};
use chrome_info_exporter::scanner::SCAN_INTERVAL;
use chrome_info_exporter::ScanTimer;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn, Level};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_scan};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR,
    DEFAULT_PORT,
};
use handlers::{
    chrome_info_handler, health_handler, metrics_handler, processes_handler, root_handler,
};
use state::{AppState, SharedState, TableSource};

/// Initializes tracing logging subsystem with configured log level.
///
/// `--log-level` wins over the config file; the default is info.
fn setup_logging(config: &Config, args: &Args) {
    let level = args
        .log_level
        .clone()
        .or_else(|| config.log_level.as_deref().and_then(LogLevel::from_config_str))
        .unwrap_or(LogLevel::Info);

    let log_level = match level {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Builds the shared state with a fresh snapshot and registered metrics.
/// Configures HTTP routes; optional endpoints follow the feature flags.
fn build_router(state: SharedState) -> Router {
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/chrome_info", get(chrome_info_handler))
        .route("/processes", get(processes_handler));

    if state.config.enable_metrics.unwrap_or(true) {
        app = app.route("/metrics", get(metrics_handler));
    }
    if state.config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    app.with_state(state)
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    if let Some(command) = &args.command {
        return match command {
            Commands::Config { output, format } => command_config(output.clone(), format.clone()),
            Commands::Check => command_check(&resolve_config(&args)?),
            Commands::Scan { parsed } => {
                let config = load_validated_config(&args)?;
                setup_logging(&config, &args);
                command_scan(*parsed, &config).map_err(Into::into)
            }
        };
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config, &args);

    info!("Starting chrome-info-exporter v{}", env!("CARGO_PKG_VERSION"));

    let source = TableSource::from_config(&config)?;
    if let TableSource::Procfs(table) = &source {
        if let Err(e) = startup_checks::validate_requirements(table.root()) {
            error!("Runtime requirements not met: {}", e);
            return Err(e.into());
        }
    }

    let bind_ip_str = config
        .bind
        .clone()
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let state = AppState::new(config)?;

    let scan_state = Arc::clone(&state);
    let timer = ScanTimer::arm(SCAN_INTERVAL, move || {
        scan_state.run_scan(&source);
    });
    info!(
        "First scan due in {} ms",
        timer
            .next_deadline()
            .saturating_duration_since(tokio::time::Instant::now())
            .as_millis()
    );

    let app = build_router(Arc::clone(&state));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            timer.cancel().await;
            return Err(e.into());
        }
    };
    info!("chrome-info-exporter listening on http://{}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    let result = server.await;

    // No scan may touch the snapshot once shutdown has begun
    timer.cancel().await;

    if let Err(e) = result {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    if state.health_stats.has_scanned() {
        info!(
            "Last scan published {} bytes (generation {})",
            state.snapshot.len(),
            state.snapshot.generation()
        );
    } else {
        warn!("Stopped before the first scan completed");
    }

    info!("chrome-info-exporter stopped gracefully");
    Ok(())
}
