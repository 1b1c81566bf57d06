use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use tracing::debug;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Anything that can hand back the body of a page.
pub trait PageSource {
    /// `Ok(None)` when the server answered with a non-success status.
    fn fetch(&self, url: &Url) -> Result<Option<String>>;
}

/// Blocking HTTP page source. One request per call, no retries.
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &Url) -> Result<Option<String>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            debug!("{} answered {}", url, status);
            return Ok(None);
        }

        let body = response
            .text()
            .with_context(|| format!("Failed to read body of {}", url))?;
        Ok(Some(body))
    }
}

/// In-memory pages keyed by absolute URL. Unknown URLs behave like a 404.
#[cfg(test)]
#[derive(Default)]
pub struct StaticPages {
    pages: std::collections::HashMap<String, String>,
    requested: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl StaticPages {
    pub fn with(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

#[cfg(test)]
impl PageSource for StaticPages {
    fn fetch(&self, url: &Url) -> Result<Option<String>> {
        self.requested.borrow_mut().push(url.to_string());
        Ok(self.pages.get(url.as_str()).cloned())
    }
}
