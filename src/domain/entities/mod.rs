//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Token`] - An API credential that authenticates requests and owns links
//! - [`Link`] - A shortcut mapped to a target URL
//!
//! # Design Pattern
//!
//! Entities come with separate structs for the other operations:
//! - `NewToken`, `NewLink` - For creating new records
//! - `TokenPatch`, `LinkPatch` - Allow-lists of mutable fields for partial updates
//! - `TokenFilter`, `LinkFilter` - Listing criteria

pub mod link;
pub mod token;

pub use link::{Link, LinkFilter, LinkPatch, Meta, NewLink};
pub use token::{NewToken, Token, TokenFilter, TokenPatch};
