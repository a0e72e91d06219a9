//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx with
//! bound parameters and row structs decoded via `FromRow`.
//!
//! # Repositories
//!
//! - [`PgTokenRepository`] - API token storage and authentication
//! - [`PgLinkRepository`] - Shortcut storage and retrieval

pub mod pg_link_repository;
pub mod pg_token_repository;

pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;
