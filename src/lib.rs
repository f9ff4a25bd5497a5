//! Client for the News API with a small processing layer on top.
//!
//! [`Fetcher`] turns [`Query`] values into authenticated requests against the
//! top-headlines and everything endpoints and returns normalized
//! [`Article`]s. [`processor::to_table`] shapes those into a fixed
//! seven-column table and [`trend::plot_keyword_trend`] charts how often a
//! term shows up in titles per day.

pub mod article;
pub mod error;
pub mod fetcher;
mod http;
pub mod processor;
pub mod trend;

pub use article::{Article, RawArticle, Source};
pub use error::{Error, Result};
pub use fetcher::{DEFAULT_BASE_URL, DEFAULT_KEY_FILE, Fetcher, Query};
pub use http::REQUEST_TIMEOUT;
