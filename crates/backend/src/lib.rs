//! Client for Aurelia's hosted backend.
//!
//! The backend is a managed service that owns authentication, the Postgres
//! schema (exposed as a REST API guarded by row-level security) and object
//! storage. This crate talks to it over HTTP; it never connects to the
//! database directly.
//!
//! # Layout
//!
//! - [`BackendClient`] - REST table queries, RPC calls, auth and storage
//! - [`Query`] - builder for REST filters, ordering and paging
//! - [`repos`] - one typed repository per entity
//! - [`profile`] - profile resolution with RPC fallback
//!
//! # Example
//!
//! ```rust,ignore
//! use aurelia_backend::{Auth, BackendClient, repos::ProductRepository};
//!
//! let client = BackendClient::new(&config)?;
//! let featured = ProductRepository::new(&client).featured(Auth::Anon, 8).await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod profile;
pub mod query;
pub mod repos;
pub mod storage;

pub use auth::{AccessToken, AuthSession, AuthUser, SignUpOutcome};
pub use client::{Auth, BackendClient};
pub use config::{BackendConfig, ConfigError};
pub use error::BackendError;
pub use profile::{ProfileSource, ResolvedFrom, ResolvedProfile, resolve_profile};
pub use query::Query;
