//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls and enforce the rules that do not
//! belong to a single entity: uniqueness, reuse, ownership and shortcut
//! generation. HTTP handlers talk to services only.
//!
//! # Available Services
//!
//! - [`services::auth_service::AuthService`] - Bearer credential authentication
//! - [`services::token_service::TokenService`] - API token administration
//! - [`services::link_service::LinkService`] - Shortcut creation, management and resolution

pub mod services;
