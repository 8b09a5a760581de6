use crate::error::{Error, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use std::io::Write;
use std::time::Duration;

/// Source of raw archive bytes.
pub trait ArchiveFetcher: Send + Sync {
    /// Streams the resource at `url` into `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &mut dyn Write) -> Result<u64>;
}

/// Fetches archives over HTTP(S), following Google Drive's large-file confirmation page.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(3600))
            .user_agent(concat!("ycb-models/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Download(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        Ok(response)
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &mut dyn Write) -> Result<u64> {
        let mut response = self.get(url)?;

        // Drive serves a virus-scan warning page instead of large files until confirmed
        if is_html(&response) {
            let body = response.text()?;
            let token = confirm_token(&body).ok_or_else(|| {
                Error::Download(format!("{} returned an HTML page instead of an archive", url))
            })?;

            tracing::debug!("Confirming download with token {}", token);
            response = self.get(&format!("{}&confirm={}", url, token))?;

            if is_html(&response) {
                return Err(Error::Download(format!(
                    "{} still returned an HTML page after confirmation",
                    url
                )));
            }
        }

        let written = std::io::copy(&mut response, dest)?;
        Ok(written)
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

/// Extracts the `confirm=<token>` value from a Google Drive warning page.
pub(crate) fn confirm_token(body: &str) -> Option<&str> {
    let start = body.find("confirm=")? + "confirm=".len();
    let rest = &body[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());

    if end == 0 {
        None
    } else {
        Some(&rest[..end])
    }
}
