use std::fs;

use jobwatch_engine::{
    ApiCredentials, DownloadError, DownloadSettings, DownloadSource, Downloader, HttpDownloader,
};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(server: &MockServer) -> ApiCredentials {
    ApiCredentials {
        base_url: server.uri(),
        api_token: "secret-key".to_string(),
    }
}

fn downloader(dir: &TempDir) -> HttpDownloader {
    HttpDownloader::new(DownloadSettings::new(dir.path().to_path_buf()))
}

#[tokio::test]
async fn report_is_saved_under_the_suggested_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorio/download/report-42.html"))
        .and(header("X-API-Key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>report</html>"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let source = DownloadSource::Endpoint {
        filename: "report-42.html".to_string(),
    };

    let saved = downloader(&temp)
        .download(&source, &credentials(&server))
        .await
        .expect("download ok");

    assert_eq!(saved.file_name().unwrap(), "report-42.html");
    assert_eq!(fs::read_to_string(&saved).unwrap(), "<html>report</html>");
}

#[tokio::test]
async fn auth_failure_is_surfaced_not_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorio/download/report-42.html"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let source = DownloadSource::Endpoint {
        filename: "report-42.html".to_string(),
    };

    let err = downloader(&temp)
        .download(&source, &credentials(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::HttpStatus(401)), "{err}");
    // No partial file left behind.
    assert!(!temp.path().join("report-42.html").exists());
}

#[tokio::test]
async fn colliding_filename_gets_a_suffix_instead_of_overwriting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorio/download/report.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("new"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("report.html"), "old").unwrap();

    let source = DownloadSource::Endpoint {
        filename: "report.html".to_string(),
    };
    let saved = downloader(&temp)
        .download(&source, &credentials(&server))
        .await
        .expect("download ok");

    assert_eq!(saved.file_name().unwrap(), "report (1).html");
    assert_eq!(
        fs::read_to_string(temp.path().join("report.html")).unwrap(),
        "old"
    );
    assert_eq!(fs::read_to_string(&saved).unwrap(), "new");
}

#[tokio::test]
async fn absolute_url_payload_is_fetched_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/out.html"))
        .and(header("X-API-Key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("from url"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let source = DownloadSource::Url {
        url: format!("{}/files/out.html?sig=abc", server.uri()),
        filename: "out.html".to_string(),
    };

    let saved = downloader(&temp)
        .download(&source, &credentials(&server))
        .await
        .expect("download ok");

    assert_eq!(saved.file_name().unwrap(), "out.html");
    assert_eq!(fs::read_to_string(&saved).unwrap(), "from url");
}
