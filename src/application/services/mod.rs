//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod token_service;

pub use auth_service::{AuthService, require_admin};
pub use link_service::{LinkDraft, LinkService};
pub use token_service::TokenService;
