pub mod info;
pub mod playback;
pub mod progress;
pub mod search;
pub mod video;

use reqwest::header::{HeaderMap, CONTENT_TYPE, COOKIE};
use reqwest::Response;
use url::Url;

use crate::error::Result;
use info::SessionContext;

pub struct DownloadClient {
    client: reqwest::Client,
}

impl DownloadClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; rv:78.0) Gecko/20100101 Firefox/78.0")
            .build()?;

        Ok(Self { client })
    }

    fn with_cookies(cookies: &SessionContext, mut headers: HeaderMap) -> Result<HeaderMap> {
        if let Some(cookie) = cookies.header_value()? {
            headers.insert(COOKIE, cookie);
        }
        Ok(headers)
    }

    /// Sends a GET and hands back the response untouched, whatever its status.
    pub async fn get(&self, url: &Url, cookies: &SessionContext, headers: HeaderMap) -> Result<Response> {
        let headers = Self::with_cookies(cookies, headers)?;
        let response = self.client.get(url.as_str()).headers(headers).send().await?;

        tracing::debug!("GET {} -> {}", url, response.status());

        Ok(response)
    }

    pub async fn content_type(&self, url: &Url, cookies: &SessionContext) -> Result<Option<String>> {
        let headers = Self::with_cookies(cookies, HeaderMap::new())?;
        let response = self.client.head(url.as_str()).headers(headers).send().await?;

        tracing::debug!("HEAD {} -> {}", url, response.status());

        if !response.status().is_success() {
            return Ok(None);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        Ok(content_type)
    }
}
