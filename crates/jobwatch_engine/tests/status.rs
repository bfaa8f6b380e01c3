use std::time::Duration;

use jobwatch_engine::{
    ApiCredentials, HttpStatusClient, JobKind, PollReport, PollSettings, StatusClient,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(server: &MockServer) -> ApiCredentials {
    ApiCredentials {
        base_url: server.uri(),
        api_token: "secret-key".to_string(),
    }
}

#[tokio::test]
async fn finished_status_is_parsed_with_the_credential_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ingest/status/i1"))
        .and(header("X-API-Key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "finished",
            "result": {"mensagem": "Indexed 120 files."}
        })))
        .mount(&server)
        .await;

    let client = HttpStatusClient::new(PollSettings::default());
    let report = client
        .probe(JobKind::Ingest, "i1", &credentials(&server))
        .await;

    assert_eq!(
        report,
        PollReport::Status {
            status: "finished".to_string(),
            result: Some(json!({"mensagem": "Indexed 120 files."})),
            error: None,
        }
    );
}

#[tokio::test]
async fn report_jobs_probe_the_report_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorio/status/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "started"
        })))
        .mount(&server)
        .await;

    let client = HttpStatusClient::new(PollSettings::default());
    let report = client
        .probe(JobKind::Report, "r1", &credentials(&server))
        .await;

    assert_eq!(
        report,
        PollReport::Status {
            status: "started".to_string(),
            result: None,
            error: None,
        }
    );
}

#[tokio::test]
async fn non_2xx_responses_are_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ingest/status/i1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = HttpStatusClient::new(PollSettings::default());
    let report = client
        .probe(JobKind::Ingest, "i1", &credentials(&server))
        .await;

    assert_eq!(report, PollReport::HttpError(401));
}

#[tokio::test]
async fn connection_failure_is_transient() {
    let server = MockServer::start().await;
    let creds = credentials(&server);
    // Shut the server down so the probe hits a refused connection.
    drop(server);

    let client = HttpStatusClient::new(PollSettings::default());
    let report = client.probe(JobKind::Ingest, "i1", &creds).await;

    assert!(matches!(report, PollReport::Transient(_)), "{report:?}");
}

#[tokio::test]
async fn slow_response_times_out_as_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ingest/status/i1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"status": "started"})),
        )
        .mount(&server)
        .await;

    let settings = PollSettings {
        request_timeout: Duration::from_millis(50),
        ..PollSettings::default()
    };
    let client = HttpStatusClient::new(settings);
    let report = client
        .probe(JobKind::Ingest, "i1", &credentials(&server))
        .await;

    assert!(matches!(report, PollReport::Transient(_)), "{report:?}");
}

#[tokio::test]
async fn malformed_body_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ingest/status/i1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HttpStatusClient::new(PollSettings::default());
    let report = client
        .probe(JobKind::Ingest, "i1", &credentials(&server))
        .await;

    assert!(matches!(report, PollReport::Transient(_)), "{report:?}");
}
