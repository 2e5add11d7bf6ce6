#[tokio::main]
async fn main() {
    if let Err(err) = app::run().await {
        eprintln!("covergate failed to start: {}", err);
        std::process::exit(1);
    }
}

mod api;
mod app;
mod clients;
mod dto;
mod error;
mod models;
mod services;
mod telemetry;
mod usecases;
