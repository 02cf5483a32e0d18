use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use edugenie::{
    config::{Config, LoggingConfig},
    controller::SessionController,
    backend::HttpBackend,
    orchestrator::GenerationOrchestrator,
    reporting::ReportDispatcher,
    terminal::{Flow, Terminal, render},
};

// Import logging macros
use edugenie::log_system_event;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let _guard = setup_logging(&config.logging)?;
    config.validate()?;

    log_system_event!(startup, component = "client", "Starting EduGenie client");

    let backend = Arc::new(HttpBackend::new(
        &config.api.base_url,
        Duration::from_secs(config.api.request_timeout_secs),
    )?);

    match backend.ping().await {
        Ok(()) => info!(base_url = %backend.base_url(), "Backend is reachable"),
        Err(e) => warn!(base_url = %backend.base_url(), error = %e, "Backend did not answer ping"),
    }

    let reports = ReportDispatcher::new(backend.clone(), config.user.user_id.clone());
    let orchestrator = GenerationOrchestrator::new(backend.clone(), reports.clone());
    let mut terminal = Terminal::new(SessionController::new(orchestrator), backend)
        .with_progress(|screen| println!("\n{}", screen));

    println!("{}", render(terminal.controller()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match terminal.handle_line(&line).await {
            Flow::Continue(output) => println!("\n{}", output),
            Flow::Quit => break,
        }
    }

    let abandoned = reports
        .drain(Duration::from_secs(config.api.request_timeout_secs))
        .await;
    if abandoned > 0 {
        warn!(abandoned, "Exiting with unsent reports");
    }

    log_system_event!(shutdown, component = "client", "EduGenie client exiting");
    Ok(())
}

fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use std::fs;
    use tracing_subscriber::fmt;

    let env_filter = EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| EnvFilter::new("info,edugenie=debug"));

    // Console output goes to stderr so it never interleaves with the screen
    let console_layer = config.console_enabled.then(|| {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
    });

    let mut guard = None;
    let file_layer = if config.file_enabled {
        fs::create_dir_all(&config.log_directory).unwrap_or_else(|e| {
            eprintln!("Warning: Could not create logs directory: {}", e);
        });

        // Daily rotation, no ANSI colors in files
        let file_appender = tracing_appender::rolling::daily(&config.log_directory, "edugenie.log");
        let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        Some(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(non_blocking_file),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!(
        log_directory = %config.log_directory,
        file_enabled = config.file_enabled,
        console_enabled = config.console_enabled,
        "Logging initialized"
    );

    Ok(guard)
}
