use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API key file not found: {}", path.display())]
    ResourceNotFound { path: PathBuf },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("could not read API key file {}: {source}", path.display())]
    CredentialUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("News API error [{code}]: {message}")]
    Upstream { code: String, message: String },

    #[error("could not render plot: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
