pub mod routes;
mod server;
mod telemetry;

pub mod app;
pub mod config;

pub use app::start_app;
pub use server::{build_router, HttpServer, SharedState};
pub use telemetry::Metrics;
