pub mod auth;
pub mod feed;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::ApiDoc;
