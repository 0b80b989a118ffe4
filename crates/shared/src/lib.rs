// Public modules
pub mod config;
pub mod curator;
pub mod mailer;
pub mod models;
pub mod news;
pub mod query;
pub mod renderer;

// Re-export commonly used types
pub use config::{Config, LlmProvider, SmtpSecurity};
pub use curator::{OllamaCurator, NO_NEWS_PLACEHOLDER};
pub use mailer::{plan_dispatch, Dispatch, Mailer};
pub use models::Article;
pub use news::{FetchParams, NewsApiClient};
pub use query::build_keywords;
