//! Session-aware API gateway for the Savemedha admin backend.
//!
//! Wiring at startup:
//!
//! ```no_run
//! use std::sync::Arc;
//! use savemedha_gateway::config::Config;
//! use savemedha_gateway::gateway::GatewayClient;
//! use savemedha_gateway::session::SessionStore;
//! use savemedha_gateway::storage::FileStorage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let storage = Arc::new(FileStorage::new(config.storage.session_path()));
//! let session = SessionStore::open(storage);
//! let gateway = GatewayClient::new(config.api.clone())?;
//! gateway.configure(Arc::new(session.clone()))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod gateway;
pub mod logging;
pub mod mvi;
pub mod resources;
pub mod session;
pub mod storage;
pub mod ui;
