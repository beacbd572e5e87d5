//! Shared fixtures for integration tests: a mocked gofile API.
#![allow(dead_code)]

pub mod socket_guard;

use std::path::Path;

use gofile_dl::{ConfigOverrides, RunConfig, Session, SessionConfig};
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "tok-1";
pub const CONTENT_ID: &str = "ABC123";
pub const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
pub const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

/// Answers `createAccount` with [`TOKEN`].
pub async fn mount_account(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/createAccount"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"token": TOKEN}})),
        )
        .mount(server)
        .await;
}

/// Answers `getContent` for [`CONTENT_ID`] with `body`.
pub async fn mount_listing(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/getContent"))
        .and(query_param("contentId", CONTENT_ID))
        .and(query_param("token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// A successful listing body with one `(name, link, md5)` entry per file.
pub fn listing_body(files: &[(&str, &str, &str)]) -> Value {
    let contents: serde_json::Map<String, Value> = files
        .iter()
        .enumerate()
        .map(|(index, (name, link, md5))| {
            (
                format!("id-{index}"),
                json!({"type": "file", "name": name, "link": link, "md5": md5}),
            )
        })
        .collect();
    json!({"status": "ok", "data": {"contents": contents}})
}

/// Mounts a file at `/store/<name>` answering `body`, expecting `times` requests.
pub async fn mount_file(server: &MockServer, name: &str, body: &[u8], times: u64) -> String {
    let file_path = format!("/store/{name}");
    Mock::given(method("GET"))
        .and(path(file_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(times)
        .mount(server)
        .await;
    format!("{}{file_path}", server.uri())
}

pub fn entry_url(server: &MockServer) -> String {
    format!("{}/d/{CONTENT_ID}", server.uri())
}

pub fn session_config(server: &MockServer) -> SessionConfig {
    SessionConfig {
        api_base: Url::parse(&server.uri()).unwrap(),
        ..SessionConfig::default()
    }
}

/// Bootstraps a session against `server`; mounts the account endpoint first.
pub async fn session_for(server: &MockServer) -> Session {
    mount_account(server).await;
    let entry = Url::parse(&entry_url(server)).unwrap();
    Session::bootstrap(&session_config(server), &entry)
        .await
        .unwrap()
}

/// Run config pointing at `server`, writing under `output_root`.
pub fn run_config(server: &MockServer, output_root: &Path) -> RunConfig {
    let overrides = ConfigOverrides {
        output_dir: Some(output_root.to_path_buf()),
        api_base: Some(server.uri()),
        ..ConfigOverrides::default()
    };
    RunConfig::resolve(entry_url(server), &overrides, None).unwrap()
}
