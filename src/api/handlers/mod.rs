//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod index;
pub mod links;
pub mod redirect;
pub mod tokens;

pub use health::health_handler;
pub use index::{index_handler, method_not_allowed_handler};
pub use links::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    put_link_handler, update_link_handler,
};
pub use redirect::redirect_handler;
pub use tokens::{
    create_token_handler, delete_token_handler, get_token_handler, list_tokens_handler,
    update_token_handler,
};
