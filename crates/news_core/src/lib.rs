pub mod domain;
pub mod filter;
pub mod ports;

pub use domain::{Article, Favorite, Preferences, SummarizedArticle, User, UserCredentials};
pub use ports::{Cache, NewsProvider, PortError, PortResult, Summarizer, UserStore};
