//! HTTP server: state, middleware, and routes

pub mod builder;
pub mod middleware;
pub mod routes;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;

pub use server::HttpServer;
pub use state::AppState;
