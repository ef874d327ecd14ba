//! # FinDoc Server
//!
//! HTTP front end for the FinDoc statement analysis pipeline.
//!
//! ## Endpoints
//!
//! - `POST /api/analysis`: upload a PDF statement (multipart field `file`)
//! - `GET /api/analysis/:id/{total,classification,stocks,fixed-income,complete}`
//! - `DELETE /api/analysis/:id`
//! - `GET /health`
//!
//! ## Usage
//!
//! ```ignore
//! use findoc_server::Server;
//!
//! let server = Server::new(config, engine);
//! server.start().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod handlers;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use findoc_engine::AnalysisEngine;

pub use config::{ConfigError, ServerConfig};

/// The FinDoc server.
pub struct Server {
    config: ServerConfig,
    engine: Arc<AnalysisEngine>,
}

impl Server {
    /// Create a new server.
    pub fn new(config: ServerConfig, engine: Arc<AnalysisEngine>) -> Self {
        Self { config, engine }
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        // Any origin, so the upload form can be embedded elsewhere.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::create_router(self.engine.clone(), self.config.max_upload_bytes)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Start the server and run until Ctrl-C.
    pub async fn start(&self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::new(
            self.config.host.parse().unwrap_or([0, 0, 0, 0].into()),
            self.config.port,
        );

        info!("Starting FinDoc server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
