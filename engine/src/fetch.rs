use std::{cell::RefCell, collections::HashMap, time::Duration};

use anyhow::{Context, Result, anyhow};

/// Text-over-HTTP seam. The session only ever needs a body as a string.
pub trait Fetch {
    fn get_text(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", url))?;
        response
            .text()
            .with_context(|| format!("failed to read body of {}", url))
    }
}

/// Canned responses keyed by URL; unknown URLs fail like a 404.
/// Records every requested URL so callers can assert on traffic.
#[derive(Default)]
pub struct MapFetcher {
    responses: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetch for MapFetcher {
    fn get_text(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("404 Not Found: {}", url))
    }
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn get_text(&self, url: &str) -> Result<String> {
        (**self).get_text(url)
    }
}
