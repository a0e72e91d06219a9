//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs are Serde-deserialized and checked with `validator`; each
//! one converts into the domain type its service consumes. Response DTOs are
//! built from domain entities and carry computed fields such as `short_url`.

pub mod health;
pub mod link;
pub mod token;
