//! HTTP server core implementation

use crate::auth::MemoryUserDirectory;
use crate::config::{Config, ServerConfig};
use crate::server::middleware::GateChain;
use crate::server::routes;
use crate::server::state::AppState;
use crate::storage::{MemorySessionStore, RedisPool, RedisSessionStore, SessionStore};
use crate::utils::error::Result;
use actix_cors::Cors;
use actix_web::{App, HttpServer as ActixHttpServer, web};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// HTTP server
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server, wiring the session store from config.
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let sessions: Arc<dyn SessionStore> = if config.redis.enabled {
            let pool = RedisPool::new(&config.redis).await?;
            pool.health_check().await?;
            Arc::new(RedisSessionStore::new(
                pool,
                Duration::from_millis(config.redis.command_timeout_ms),
            ))
        } else {
            warn!("Redis disabled, sessions will not survive a restart");
            Arc::new(MemorySessionStore::new())
        };

        let state = AppState::assemble(
            config.clone(),
            sessions,
            Arc::new(MemoryUserDirectory::new()),
        )?;

        Ok(Self {
            config: config.server.clone(),
            state,
        })
    }

    /// Start serving requests.
    pub async fn start(self) -> Result<()> {
        let state = web::Data::new(self.state);
        let bind_addr = (self.config.host.clone(), self.config.port);

        info!("Binding server to {}:{}", bind_addr.0, bind_addr.1);

        ActixHttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(Cors::permissive())
                .wrap(GateChain)
                .configure(routes::configure)
        })
        .bind(bind_addr)?
        .run()
        .await?;

        Ok(())
    }
}
