use std::path::PathBuf;

use jobwatch_engine::{ApiCredentials, CredentialsProvider};
use serde::Deserialize;
use worker_logging::worker_warn;

pub(crate) const CONFIG_FILENAME: &str = "jobwatch_config.ron";

/// Filesystem layout of the host, overridable through the environment.
#[derive(Debug, Clone)]
pub(crate) struct WorkerPaths {
    /// Holds the persisted job mirror and the credentials file.
    pub state_dir: PathBuf,
    /// Finished reports are saved here.
    pub downloads_dir: PathBuf,
}

impl WorkerPaths {
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let state_dir = std::env::var_os("JOBWATCH_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.join(".jobwatch"));
        let downloads_dir = std::env::var_os("JOBWATCH_DOWNLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.join("downloads"));
        Self {
            state_dir,
            downloads_dir,
        }
    }
}

/// On-disk credential/config shape, written by the UI when the user signs in.
#[derive(Debug, Clone, Deserialize)]
struct WorkerConfig {
    api_url: String,
    api_token: String,
}

/// Credentials source backed by the config file. The file is re-read on
/// every call so a token refreshed by the UI between polls is picked up by
/// the very next request.
pub(crate) struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialsProvider for FileCredentials {
    fn credentials(&self) -> Option<ApiCredentials> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let config: WorkerConfig = match ron::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                worker_warn!("Failed to parse {:?}: {}", self.path, err);
                return None;
            }
        };
        if config.api_url.trim().is_empty() || config.api_token.trim().is_empty() {
            return None;
        }
        Some(ApiCredentials {
            base_url: config.api_url,
            api_token: config.api_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn credentials_are_read_fresh_on_every_call() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(api_url: "https://api.example.com", api_token: "first")"#,
        )
        .unwrap();

        let provider = FileCredentials::new(path.clone());
        assert_eq!(provider.credentials().unwrap().api_token, "first");

        // The user re-authenticated; the next poll must see the new token.
        fs::write(
            &path,
            r#"(api_url: "https://api.example.com", api_token: "second")"#,
        )
        .unwrap();
        assert_eq!(provider.credentials().unwrap().api_token, "second");
    }

    #[test]
    fn missing_or_incomplete_config_yields_no_credentials() {
        let temp = tempfile::TempDir::new().unwrap();
        let provider = FileCredentials::new(temp.path().join(CONFIG_FILENAME));
        assert!(provider.credentials().is_none());

        fs::write(
            temp.path().join(CONFIG_FILENAME),
            r#"(api_url: "https://api.example.com", api_token: "")"#,
        )
        .unwrap();
        assert!(provider.credentials().is_none());
    }
}
