//! # apigate
//!
//! An API gateway admission layer. Every inbound request walks an ordered
//! chain of gates before any handler runs: a two-policy token-bucket rate
//! limiter, then stateless JWT authentication backed by a revocable session
//! record in an external TTL store.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use apigate::config::Config;
//! use apigate::server::HttpServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/apigate.yaml")?;
//!     config.validate()?;
//!     let server = HttpServer::new(&config).await?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod pipeline;
pub mod ratelimit;
pub mod server;
pub mod storage;
pub mod utils;

pub use auth::{AuthGate, RequestContext, Role};
pub use config::Config;
pub use pipeline::{Decision, RequestPipeline};
pub use ratelimit::{RateLimiter, TokenBucket};
pub use utils::error::{GateError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
