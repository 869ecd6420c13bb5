//! Server startup with automatic configuration loading

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "config/apigate.yaml";

/// Run the server, loading configuration from `APIGATE_CONFIG` (or the
/// default path) with a fallback to defaults plus environment overrides.
pub async fn run_server() -> Result<()> {
    info!("Starting apigate");

    let config_path =
        std::env::var("APIGATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = match Config::from_file(&config_path) {
        Ok(config) => {
            info!("Loaded configuration from {}", config_path);
            config
        }
        Err(e) => {
            info!(
                "Configuration file {} not usable ({}), using defaults with env overrides",
                config_path, e
            );
            Config::from_env()
        }
    };

    config.validate()?;

    let server = HttpServer::new(&config).await?;
    info!(
        "Server starting at http://{}:{}",
        config.server.host, config.server.port
    );
    info!("API endpoints:");
    info!("   POST /api/auth/register - Create account, returns token");
    info!("   POST /api/auth/login    - Authenticate, returns token");
    info!("   POST /api/auth/logout   - Revoke current token");
    info!("   GET  /api/hello         - Public greeting");
    info!("   GET  /api/health        - Health check");
    info!("   GET  /api/info          - Build information");
    info!("   GET  /api/users/me      - Current identity (authenticated)");
    info!("   GET  /api/users         - Account list (admin)");

    server.start().await
}
