use std::time::Duration;

use crate::error::{Error, Result};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(format!("newsdesk/{}", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| Error::RequestFailed(format!("failed to build HTTP client: {}", e)))
}
