//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use news_core::ports::{NewsProvider, Summarizer, UserStore};

use crate::config::Config;
use crate::token::TokenService;

/// The shared application state, created once at startup and passed to all
/// handlers. All external-service handles live behind their ports so tests
/// can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub news: Arc<dyn NewsProvider>,
    pub summarizer: Arc<dyn Summarizer>,
    pub tokens: TokenService,
    pub config: Arc<Config>,
}
