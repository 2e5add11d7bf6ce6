use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::{
    app::{self, config::AppConfig},
    error::AppError,
    services::recent::RecentVisits,
    telemetry,
};

pub async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = AppConfig::from_env().map_err(AppError::Internal)?;

    let recent_visits = match &config.redis_url {
        Some(url) => match RecentVisits::connect(url).await {
            Ok(store) => store,
            Err(err) => {
                tracing::warn!("Recent-visit store unavailable: {}", err);
                RecentVisits::disabled()
            }
        },
        None => {
            tracing::warn!("REDIS_URL not set; recently-visited rows disabled");
            RecentVisits::disabled()
        }
    };

    let port = config.bind_port;
    let state = app::state::AppState::new(config, recent_visits).map_err(AppError::Internal)?;
    let app = app::router::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Gateway listening");
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Internal(format!("bind failed: {}", err)))?;
    axum::serve(listener, app)
        .await
        .map_err(|err| AppError::Internal(format!("server error: {}", err)))?;

    Ok(())
}
