//! Command line behaviour: output, exit codes, flag validation.

mod common;

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

const LICENSE_KEY_ENV: &str = "MAXMIND_LICENSE_KEY";

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("geolite-convert").unwrap();
    cmd.env_remove(LICENSE_KEY_ENV).env_remove("RUST_LOG");
    cmd
}

fn archive_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn published(file_name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-disposition", format!("attachment; filename={file_name}"))
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn converts_local_country_archive() {
    let country = archive_file(&rwanda_country_archive());

    let output = cmd()
        .args(["convert", "country", "--file"])
        .arg(country.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!([{"network": "1.2.3.0/24", "country_iso_code": "RW"}])
    );
}

#[test]
fn merges_local_archives() {
    let country = archive_file(&rwanda_country_archive());
    let asn = archive_file(&example_asn_archive());

    let output = cmd()
        .args(["convert", "country", "--file"])
        .arg(country.path())
        .arg("--asn-file")
        .arg(asn.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!([{
            "network": "1.2.3.0/24",
            "country_iso_code": "RW",
            "as_number": 64512,
            "as_organization": "EXAMPLE-AS"
        }])
    );
}

#[test]
fn writes_json_to_out_file() {
    let asn = archive_file(&example_asn_archive());
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("asn.json");

    cmd()
        .args(["convert", "asn", "--pretty", "--file"])
        .arg(asn.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written: Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(
        written,
        json!([{"network": "1.2.3.0/24", "as_number": 64512, "as_organization": "EXAMPLE-AS"}])
    );
}

#[test]
fn asn_merge_requires_country_database() {
    let asn = archive_file(&example_asn_archive());

    cmd()
        .args(["convert", "asn", "--file"])
        .arg(asn.path())
        .arg("--asn-file")
        .arg(asn.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("only apply to the country database"));
}

#[test]
fn broken_archive_fails() {
    let broken = archive_file(b"definitely not a zip file, just some bytes");

    cmd()
        .args(["convert", "country", "--file"])
        .arg(broken.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Corrupt archive"));
}

#[test]
fn download_requires_licence_key() {
    cmd()
        .args(["download", "asn"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("licence key is required"));
}

#[tokio::test]
async fn download_reports_unchanged_with_exit_code_10() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(published("GeoLite2-ASN-CSV_20240102.zip"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(published("GeoLite2-ASN-CSV_20240102.zip"))
        .expect(0)
        .mount(&server)
        .await;

    cmd()
        .args(["download", "asn", "--licence-key", "key", "--endpoint"])
        .arg(server.uri())
        .args(["--last-file-name", "GeoLite2-ASN-CSV_20240102.zip"])
        .assert()
        .code(10)
        .stdout("GeoLite2-ASN-CSV_20240102.zip\n");
}

#[tokio::test]
async fn download_writes_archive_and_prints_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("edition_id", "GeoLite2-ASN-CSV"))
        .and(query_param("license_key", "key"))
        .respond_with(
            published("GeoLite2-ASN-CSV_20240105.zip").set_body_bytes(example_asn_archive()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["download", "asn", "--endpoint"])
        .arg(server.uri())
        .env(LICENSE_KEY_ENV, "key")
        .assert()
        .success()
        .stdout("GeoLite2-ASN-CSV_20240105.zip\n");

    let written = std::fs::read(dir.path().join("GeoLite2-ASN-CSV_20240105.zip")).unwrap();
    assert_eq!(written, example_asn_archive());
}

#[tokio::test]
async fn convert_skips_unchanged_download() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(published("GeoLite2-Country-CSV_20240102.zip"))
        .mount(&server)
        .await;

    cmd()
        .args(["convert", "country", "--licence-key", "key", "--endpoint"])
        .arg(server.uri())
        .args(["--last-file-name", "GeoLite2-Country-CSV_20240102.zip"])
        .assert()
        .code(10)
        .stdout(predicate::str::is_empty());
}

#[tokio::test]
async fn convert_downloads_both_databases_for_merge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("edition_id", "GeoLite2-Country-CSV"))
        .respond_with(
            published("GeoLite2-Country-CSV_20240105.zip")
                .set_body_bytes(rwanda_country_archive()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("edition_id", "GeoLite2-ASN-CSV"))
        .respond_with(
            published("GeoLite2-ASN-CSV_20240105.zip").set_body_bytes(example_asn_archive()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = cmd()
        .args(["convert", "country", "--with-asn", "--licence-key", "key", "--endpoint"])
        .arg(server.uri())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!([{
            "network": "1.2.3.0/24",
            "country_iso_code": "RW",
            "as_number": 64512,
            "as_organization": "EXAMPLE-AS"
        }])
    );
}

#[tokio::test]
async fn server_error_fails_without_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    cmd()
        .args(["convert", "asn", "--licence-key", "key", "--endpoint"])
        .arg(server.uri())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("500"));
}
