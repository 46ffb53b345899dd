//! Conditional retrieval against a mock download endpoint.

use geolite_convert::{ConvertError, Database, Downloader, Retrieval};
use reqwest::Client;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT_PATH: &str = "/app/geoip_download";
const CURRENT: &str = "GeoLite2-ASN-CSV_20240105.zip";
const PREVIOUS: &str = "GeoLite2-ASN-CSV_20240102.zip";

fn downloader(server: &MockServer) -> Downloader {
    Downloader::with_client(
        Client::new(),
        format!("{}{}", server.uri(), ENDPOINT_PATH),
        "test-key",
    )
}

fn published(file_name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-disposition", format!("attachment; filename={file_name}"))
}

async fn mount(server: &MockServer, http_method: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method(http_method))
        .and(path(ENDPOINT_PATH))
        .and(query_param("license_key", "test-key"))
        .and(query_param("suffix", "zip"))
        .and(query_param("edition_id", "GeoLite2-ASN-CSV"))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn unchanged_name_skips_the_body() {
    let server = MockServer::start().await;
    mount(&server, "HEAD", published(CURRENT), 1).await;
    mount(&server, "GET", published(CURRENT).set_body_bytes(b"zip".to_vec()), 0).await;

    let retrieval = downloader(&server)
        .retrieve(Database::Asn, Some(CURRENT))
        .await
        .unwrap();

    assert_eq!(retrieval, Retrieval::Unchanged);
}

#[tokio::test]
async fn changed_name_fetches_the_archive() {
    let server = MockServer::start().await;
    mount(&server, "HEAD", published(CURRENT), 1).await;
    mount(&server, "GET", published(CURRENT).set_body_bytes(b"zip bytes".to_vec()), 1).await;

    let retrieval = downloader(&server)
        .retrieve(Database::Asn, Some(PREVIOUS))
        .await
        .unwrap();

    let Retrieval::Fetched(data) = retrieval else {
        panic!("expected a download");
    };
    assert_eq!(data.file_name, CURRENT);
    assert_eq!(data.content, b"zip bytes");
}

#[tokio::test]
async fn no_previous_name_always_fetches() {
    let server = MockServer::start().await;
    mount(&server, "HEAD", published(CURRENT), 0).await;
    mount(&server, "GET", published(CURRENT).set_body_bytes(b"zip".to_vec()), 1).await;

    let retrieval = downloader(&server)
        .retrieve(Database::Asn, None)
        .await
        .unwrap();
    assert!(matches!(retrieval, Retrieval::Fetched(_)));
}

#[tokio::test]
async fn empty_previous_name_always_fetches() {
    let server = MockServer::start().await;
    mount(&server, "HEAD", published(CURRENT), 0).await;
    mount(&server, "GET", published(CURRENT).set_body_bytes(b"zip".to_vec()), 1).await;

    let retrieval = downloader(&server)
        .retrieve(Database::Asn, Some(""))
        .await
        .unwrap();
    assert!(matches!(retrieval, Retrieval::Fetched(_)));
}

#[tokio::test]
async fn edition_follows_database() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .and(query_param("edition_id", "GeoLite2-Country-CSV"))
        .respond_with(published("GeoLite2-Country-CSV_20240105.zip").set_body_bytes(b"c".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let Retrieval::Fetched(data) = downloader(&server)
        .retrieve(Database::Country, None)
        .await
        .unwrap()
    else {
        panic!("expected a download");
    };
    assert_eq!(data.file_name, "GeoLite2-Country-CSV_20240105.zip");
}

#[tokio::test]
async fn missing_header_is_a_protocol_error() {
    let server = MockServer::start().await;
    mount(&server, "GET", ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()), 1).await;

    let err = downloader(&server)
        .retrieve(Database::Asn, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::MissingContentDisposition));
}

#[tokio::test]
async fn unexpected_header_form_is_a_protocol_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "HEAD",
        ResponseTemplate::new(200).insert_header("content-disposition", "inline"),
        1,
    )
    .await;

    let err = downloader(&server)
        .retrieve(Database::Asn, Some(PREVIOUS))
        .await
        .unwrap_err();
    match err {
        ConvertError::MalformedContentDisposition { value } => assert_eq!(value, "inline"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_status_is_a_transport_error() {
    let server = MockServer::start().await;
    mount(&server, "GET", ResponseTemplate::new(401), 1).await;

    let err = downloader(&server)
        .retrieve(Database::Asn, None)
        .await
        .unwrap_err();
    match err {
        ConvertError::Status { status } => assert_eq!(status.as_u16(), 401),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    // Reserve a port and release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = Downloader::with_client(
        Client::new(),
        format!("http://127.0.0.1:{port}{ENDPOINT_PATH}"),
        "test-key",
    )
    .retrieve(Database::Asn, None)
    .await
    .unwrap_err();
    assert!(matches!(err, ConvertError::Transport(_)));
}
