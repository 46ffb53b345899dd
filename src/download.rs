//! Conditional retrieval of GeoLite2 archives.
//!
//! The download service names the published archive in the
//! `Content-Disposition` header (`attachment; filename=<name>`). When the
//! caller knows the name of the last archive it fetched, a `HEAD` request is
//! made first and the body is only downloaded if the name changed.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Method, Response};
use serde::Serialize;

use crate::config::{ARCHIVE_SUFFIX, DOWNLOAD_URL, HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::database::Database;
use crate::error::{ConvertError, Result};

static CONTENT_DISPOSITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^attachment; filename=(?P<filename>.+)$").expect("static regex is valid")
});

/// A downloaded archive and the name the server gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalData {
    pub content: Vec<u8>,
    pub file_name: String,
}

/// Outcome of [`Downloader::retrieve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// The server still publishes the archive the caller already has.
    Unchanged,
    Fetched(RetrievalData),
}

#[derive(Serialize)]
struct DownloadQuery<'a> {
    license_key: &'a str,
    suffix: &'a str,
    edition_id: &'a str,
}

/// Client for the GeoLite2 download endpoint.
pub struct Downloader {
    client: Client,
    endpoint: String,
    license_key: String,
}

impl Downloader {
    /// Create a downloader for the public endpoint with its own HTTP client.
    pub fn new(license_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, DOWNLOAD_URL, license_key))
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        license_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            license_key: license_key.into(),
        }
    }

    /// Point the downloader at another endpoint, e.g. a mirror.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Retrieve the current archive of `database`.
    ///
    /// With a `last_file_name`, a `HEAD` request decides whether anything
    /// changed; [`Retrieval::Unchanged`] is returned without downloading the
    /// body if the published name is the same. Without one (or with an empty
    /// one) the archive is always fetched.
    pub async fn retrieve(
        &self,
        database: Database,
        last_file_name: Option<&str>,
    ) -> Result<Retrieval> {
        if let Some(last) = last_file_name.filter(|name| !name.is_empty()) {
            let (_, file_name) = self.request(Method::HEAD, database).await?;
            if file_name == last {
                log::info!("{} is still {}, nothing to download", database.edition_id(), last);
                return Ok(Retrieval::Unchanged);
            }
            log::info!(
                "{} changed from {} to {}",
                database.edition_id(),
                last,
                file_name
            );
        }

        let (response, file_name) = self.request(Method::GET, database).await?;
        let content = response.bytes().await?.to_vec();
        log::info!("Downloaded {} ({} bytes)", file_name, content.len());

        Ok(Retrieval::Fetched(RetrievalData { content, file_name }))
    }

    /// Send one request and read the published file name from its response.
    async fn request(&self, method: Method, database: Database) -> Result<(Response, String)> {
        log::debug!("{} {} ({})", method, self.endpoint, database.edition_id());

        let response = self
            .client
            .request(method, &self.endpoint)
            .query(&DownloadQuery {
                license_key: &self.license_key,
                suffix: ARCHIVE_SUFFIX,
                edition_id: database.edition_id(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConvertError::Status {
                status: response.status(),
            });
        }

        let value = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .ok_or(ConvertError::MissingContentDisposition)?;
        let value = value
            .to_str()
            .map_err(|_| ConvertError::MalformedContentDisposition {
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })?;
        let file_name = parse_content_disposition(value)?;

        Ok((response, file_name))
    }
}

/// Extract `<name>` from `attachment; filename=<name>`.
pub fn parse_content_disposition(value: &str) -> Result<String> {
    CONTENT_DISPOSITION_RE
        .captures(value)
        .and_then(|caps| caps.name("filename"))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ConvertError::MalformedContentDisposition {
            value: value.to_string(),
        })
}
