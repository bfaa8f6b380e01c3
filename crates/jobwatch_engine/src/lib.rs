//! Jobwatch engine: poll cycles, status probes, and report downloads.
mod download;
mod persist;
mod poller;
mod status;
mod types;

pub use download::{DownloadError, DownloadSettings, Downloader, HttpDownloader};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use poller::EngineHandle;
pub use status::{HttpStatusClient, PollSettings, StatusClient};
pub use types::{
    ApiCredentials, CredentialsProvider, DownloadSource, EngineEvent, JobId, JobKind, PollReport,
    API_KEY_HEADER,
};
