use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    api::{
        http::{billing as billing_http, repos as repos_http},
        ws::repos as repos_ws,
    },
    app::{middleware::viewer_context_middleware, state::AppState},
    telemetry,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173")),
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let api_routes = Router::new()
        .route(
            "/api/{provider}/{owner}/plans",
            get(billing_http::get_plans_handle),
        )
        .route(
            "/api/{provider}/{owner}/account",
            get(billing_http::get_account_handle),
        )
        .route(
            "/api/{provider}/{owner}/upgrade/preview",
            get(billing_http::preview_upgrade_handle),
        )
        .route(
            "/api/{provider}/{owner}/upgrade",
            get(billing_http::get_upgrade_form_handle).post(billing_http::submit_upgrade_handle),
        )
        .route(
            "/api/{provider}/{owner}/repos",
            get(repos_http::list_repos_handle),
        )
        .route(
            "/api/{provider}/{owner}/repos/{repo}/visited",
            post(repos_http::record_visit_handle),
        );

    let ws_routes = Router::new().route(
        "/ws/{provider}/{owner}/repos",
        get(repos_ws::ws_handler),
    );

    Router::new()
        .merge(api_routes)
        .merge(ws_routes)
        .layer(middleware::from_fn(viewer_context_middleware))
        .layer(middleware::from_fn(
            telemetry::request_logging_middleware,
        ))
        .layer(cors)
        .with_state(state)
}
