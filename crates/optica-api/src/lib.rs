//! # optica-api: REST Boundary of the Optica Admin Console
//!
//! Everything that leaves the process goes through this crate: list
//! fetches, reference tables, create/update/delete submissions and the
//! console configuration file.
//!
//! ## Modules
//!
//! - [`client`] - [`ApiClient`], the Fetch/Submit collaborator
//! - [`envelope`] - Bare-array / `{data: [...]}` response decoding
//! - [`endpoint`] - REST endpoint table
//! - [`config`] - [`ConsoleConfig`] (defaults → TOML → environment)
//! - [`error`] - [`ApiError`] and its user-facing messages
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use optica_api::{ApiClient, ConsoleConfig, Endpoint};
//! use optica_core::types::Product;
//!
//! # async fn run() -> optica_api::ApiResult<()> {
//! let config = ConsoleConfig::load(None)?;
//! let api = ApiClient::new(&config)?;
//! let lenses: Vec<Product> = api.fetch_list(Endpoint::Lentes).await?;
//! println!("{} lenses", lenses.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod error;

pub use client::ApiClient;
pub use config::ConsoleConfig;
pub use endpoint::Endpoint;
pub use error::{ApiError, ApiResult};
