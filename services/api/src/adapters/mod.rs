pub mod cache;
pub mod db;
pub mod news;
pub mod summary;

pub use cache::{NoopCache, RedisCache};
pub use db::PgUserStore;
pub use news::NewsApiAdapter;
pub use summary::OpenAiSummaryAdapter;
