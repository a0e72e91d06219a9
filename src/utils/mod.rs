//! Utility functions for shortcut handling, URL validation, and request handling.
//!
//! - [`shortcut`] - Shortcut generation and validation
//! - [`url_validator`] - Target and callback URL validation
//! - [`db_error`] - PostgreSQL constraint violation classification
//! - [`client_ip`] - Client address resolution for access logs

pub mod client_ip;
pub mod db_error;
pub mod shortcut;
pub mod url_validator;
