use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use visit_counter::{
    counters::CounterKeys, display::DisplayState, router, startup, AppConfig, AppState, Tracker,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();

    let display = Arc::new(DisplayState::new(config.schedule.message_lifetime));
    let tracker = Arc::new(Tracker::connect(&config, CounterKeys::today(), display.clone()));
    info!(
        backend = tracker.active_backend().as_str(),
        today = %tracker.keys().today_visits,
        "tracker ready"
    );

    startup::spawn(Arc::clone(&tracker), config.schedule);

    let app = router(AppState::new(tracker, display));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
