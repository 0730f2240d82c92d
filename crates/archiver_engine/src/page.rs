use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE, USER_AGENT};

use archiver_logging::archive_debug;

use crate::payload::{decode_body, extract_hydration_payload};
use crate::{PageError, PageFailureKind, PageSettings};

/// Reads the hydration payload of a classroom page.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn hydration_payload(&self, url: &str) -> Result<String, PageError>;
}

/// Page source backed by one reqwest client carrying the session cookie.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpPageSource {
    pub fn new(settings: &PageSettings) -> Result<Self, PageError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&settings.user_agent)
            .map_err(|err| PageError::new(PageFailureKind::InvalidHeader, err.to_string()))?;
        headers.insert(USER_AGENT, agent);
        if let Some(cookie) = settings.session_cookie.as_deref() {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|err| PageError::new(PageFailureKind::InvalidHeader, err.to_string()))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| PageError::new(PageFailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            max_bytes: settings.max_bytes,
        })
    }

    async fn fetch_html(&self, url: &str) -> Result<String, PageError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| PageError::new(PageFailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::new(
                PageFailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        archive_debug!("Fetched {} bytes from {}", bytes.len(), url);

        decode_body(&bytes, content_type.as_deref())
    }

    fn too_large(&self, actual: u64) -> PageError {
        PageError::new(
            PageFailureKind::TooLarge {
                max_bytes: self.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl PageSource for HttpPageSource {
    async fn hydration_payload(&self, url: &str) -> Result<String, PageError> {
        let html = self.fetch_html(url).await?;
        extract_hydration_payload(&html)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PageError {
    if err.is_timeout() {
        return PageError::new(PageFailureKind::Timeout, err.to_string());
    }
    PageError::new(PageFailureKind::Network, err.to_string())
}
