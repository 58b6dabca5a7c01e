//! drawgate server - HTTP upload gateway for CAD drawings
//!
//! Two transport adapters share the [`drawgate::accept_upload`] contract:
//!
//! - **Framework routes** (axum): `GET /`, `GET /health`, `POST /upload`,
//!   `GET /files`, `GET /metrics`
//! - **Raw routes** ([`raw::RawHandler`], plain `http` + `multer`): `GET /api`,
//!   `GET /api/health`, `POST /api/upload`
//!
//! Both answer OPTIONS preflights with an empty 200 and render failures as
//! `{"error": {"code": "...", "message": "..."}}`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cors;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod raw;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{CorsConfig, ServerConfig, ServerConfigError};
pub use error::{ServerError, ServerResult};
pub use raw::RawHandler;
pub use server::{build_router, start_server};
pub use state::ServerState;
