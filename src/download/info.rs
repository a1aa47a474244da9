use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Response;
use url::Url;

use crate::download::DownloadClient;
use crate::error::Result;
use crate::identifier::Identifier;

const ORIGINATOR_APP: &str = "303";

/// Cookies handed out by the info endpoint, forwarded as is to the media request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    cookies: BTreeMap<String, String>,
}

impl SessionContext {
    pub fn from_response(response: &Response) -> Self {
        Self {
            cookies: response
                .cookies()
                .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cookies: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn header_value(&self) -> Result<Option<HeaderValue>> {
        if self.is_empty() {
            return Ok(None);
        }

        let cookie = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");

        Ok(Some(HeaderValue::from_str(&cookie)?))
    }
}

#[derive(Debug)]
pub struct VideoInfo {
    pub body: String,
    pub cookies: SessionContext,
}

pub fn info_url(endpoint: &str, id: &Identifier) -> Result<Url> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut()
        .append_pair("docid", id.as_str())
        .append_pair("drive_originator_app", ORIGINATOR_APP);

    Ok(url)
}

/// Fetches the raw video info for `id`.
///
/// The status code is not looked at: an error page simply yields a body that
/// the playback parser finds nothing in.
pub async fn fetch_video_info(client: &DownloadClient, endpoint: &str, id: &Identifier) -> Result<VideoInfo> {
    let url = info_url(endpoint, id)?;

    tracing::info!("Accessing {}", url);

    let response = client.get(&url, &SessionContext::default(), HeaderMap::new()).await?;

    if !response.status().is_success() {
        tracing::debug!("info endpoint answered {}", response.status());
    }

    let cookies = SessionContext::from_response(&response);
    let body = response.text().await?;

    tracing::debug!("received {} bytes of video info and {} cookies", body.len(), cookies.len());

    Ok(VideoInfo { body, cookies })
}
