use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use thiserror::Error;
use worker_logging::worker_info;

use crate::persist::{ensure_dir, AtomicFileWriter, PersistError};
use crate::{ApiCredentials, DownloadSource, API_KEY_HEADER};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("no API credentials are configured")]
    MissingCredentials,
    #[error("download endpoint returned HTTP {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    /// Directory finished reports are saved into.
    pub downloads_dir: PathBuf,
    pub connect_timeout: Duration,
    /// Reports can be large; allow more than a status probe gets.
    pub request_timeout: Duration,
}

impl DownloadSettings {
    pub fn new(downloads_dir: PathBuf) -> Self {
        Self {
            downloads_dir,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch the report and save it under the suggested filename. Returns the
    /// path the file was saved to.
    async fn download(
        &self,
        source: &DownloadSource,
        credentials: &ApiCredentials,
    ) -> Result<PathBuf, DownloadError>;
}

#[derive(Debug, Clone)]
pub struct HttpDownloader {
    settings: DownloadSettings,
}

impl HttpDownloader {
    pub fn new(settings: DownloadSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, DownloadError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| DownloadError::Network(err.to_string()))
    }
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    async fn download(
        &self,
        source: &DownloadSource,
        credentials: &ApiCredentials,
    ) -> Result<PathBuf, DownloadError> {
        ensure_dir(&self.settings.downloads_dir)?;

        let client = self.build_client()?;
        let url = source.resolved_url(credentials);
        worker_info!("Downloading report from {}", url);

        let response = client
            .get(&url)
            .header(API_KEY_HEADER, &credentials.api_token)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_request_error)?;
            bytes.extend_from_slice(&chunk);
        }

        let filename = unique_filename(
            &self.settings.downloads_dir,
            &sanitize_filename(source.filename()),
        );
        let writer = AtomicFileWriter::new(self.settings.downloads_dir.clone());
        let path = writer.write_bytes(&filename, &bytes)?;
        Ok(path)
    }
}

fn map_request_error(err: reqwest::Error) -> DownloadError {
    if let Some(status) = err.status() {
        return DownloadError::HttpStatus(status.as_u16());
    }
    DownloadError::Network(err.to_string())
}

/// Strip path separators and leading dots so a hostile filename cannot
/// escape the downloads directory or hide the file.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            _ => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').trim();
    if cleaned.is_empty() {
        "report.html".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Browsers suffix colliding downloads rather than overwriting; do the same.
fn unique_filename(dir: &Path, filename: &str) -> String {
    if !dir.join(filename).exists() {
        return filename.to_string();
    }
    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };
    for counter in 1.. {
        let candidate = match extension {
            Some(ext) => format!("{stem} ({counter}).{ext}"),
            None => format!("{stem} ({counter})"),
        };
        if !dir.join(&candidate).exists() {
            return candidate;
        }
    }
    unreachable!("counter space exhausted");
}
