//! The one network call the fetcher makes, behind a trait so runs can be
//! driven without a network.

use anyhow::{Context, Result};
use std::time::Duration;

pub trait Transport {
    /// GET `url` and return the response body. Non-2xx statuses are errors.
    fn get(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .with_context(|| format!("GET {}", url))?;
        resp.text().with_context(|| format!("reading body of {}", url))
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<String> {
        (**self).get(url)
    }
}
