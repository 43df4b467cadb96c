use std::time::Duration;

use chrono::Utc;

use brock_api::{build_router, logging::init_logging, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config.logging);

    tracing::info!("Starting Brock API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let state = AppState::build(config.clone()).await?;

    if let Some(secs) = config.checkin.tick_interval_secs {
        spawn_checkin_ticker(state.clone(), Duration::from_secs(secs.max(1)));
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Drive the check-in scheduler from inside the server process
fn spawn_checkin_ticker(state: AppState, period: Duration) {
    tracing::info!(period_secs = period.as_secs(), "Check-in ticker enabled");
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            match state.scheduler.tick(Utc::now()).await {
                Ok(sent) if !sent.is_empty() => {
                    tracing::info!(count = sent.len(), "Scheduled check-ins sent");
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Check-in tick failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
