//! HTTP middleware for request processing and protection.
//!
//! Provides authentication, authorization, and observability middleware.

pub mod access_log;
pub mod auth;
pub mod tracing;
