use crate::error::Result;
#[cfg(feature = "http")]
use crate::error::BuildError;

/// Blocking text GET against the filter server.
pub trait Transport {
    fn get_text(&self, url: &str) -> Result<String>;

    /// Same request, identifying as `user_agent`. Transports without
    /// per-request headers fall back to [`Transport::get_text`].
    fn get_text_as(&self, url: &str, user_agent: &str) -> Result<String> {
        let _ = user_agent;
        self.get_text(url)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get_text(&self, url: &str) -> Result<String> {
        (**self).get_text(url)
    }

    fn get_text_as(&self, url: &str, user_agent: &str) -> Result<String> {
        (**self).get_text_as(url, user_agent)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get_text(&self, url: &str) -> Result<String> {
        (**self).get_text(url)
    }

    fn get_text_as(&self, url: &str, user_agent: &str) -> Result<String> {
        (**self).get_text_as(url, user_agent)
    }
}

/// reqwest-backed transport with a custom User-Agent.
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new(config: &crate::config::FiltersConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| BuildError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl HttpTransport {
    fn fetch(&self, request: reqwest::blocking::RequestBuilder, url: &str) -> Result<String> {
        let transport_err = |e: reqwest::Error| BuildError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = request
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(transport_err)?;
        response.text().map_err(transport_err)
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    fn get_text(&self, url: &str) -> Result<String> {
        self.fetch(self.client.get(url), url)
    }

    fn get_text_as(&self, url: &str, user_agent: &str) -> Result<String> {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent);
        self.fetch(request, url)
    }
}
