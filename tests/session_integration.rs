//! Integration tests for session bootstrap and folder listing resolution.

mod support;

use gofile_dl::{AuthError, ContentId, ListingError, Session, SessionConfig, resolve_content};
use serde_json::json;
use support::socket_guard::start_mock_server_or_skip;
use support::{CONTENT_ID, TOKEN, entry_url, listing_body, mount_listing, session_config, session_for};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_bootstrap_visits_entry_url_and_sends_user_agent() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(format!("/d/{CONTENT_ID}")))
        .and(header("user-agent", "gofile-dl-test/1.0"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "seen=1; Path=/"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/createAccount"))
        .and(header("user-agent", "gofile-dl-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"token": TOKEN}})))
        .expect(1)
        .mount(&server)
        .await;

    let config = SessionConfig {
        user_agent: "gofile-dl-test/1.0".to_string(),
        ..session_config(&server)
    };
    let session = Session::bootstrap(&config, &Url::parse(&entry_url(&server)).unwrap())
        .await
        .unwrap();

    assert_eq!(session.token().as_str(), TOKEN);
}

#[tokio::test]
async fn test_bootstrap_tolerates_failing_entry_url() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(format!("/d/{CONTENT_ID}")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let session = session_for(&server).await;

    assert_eq!(session.token().as_str(), TOKEN);
}

#[tokio::test]
async fn test_bootstrap_without_token_is_auth_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/createAccount"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let result = Session::bootstrap(
        &session_config(&server),
        &Url::parse(&entry_url(&server)).unwrap(),
    )
    .await;

    assert!(
        matches!(result, Err(AuthError::MissingToken { .. })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_resolve_content_sends_token_and_website_token() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let session = session_for(&server).await;

    Mock::given(method("GET"))
        .and(path("/getContent"))
        .and(query_param("contentId", CONTENT_ID))
        .and(query_param("token", TOKEN))
        .and(query_param("websiteToken", "12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&[
            ("b.txt", "https://store/b", "900150983cd24fb0d6963f7d28e17f72"),
            ("a.txt", "https://store/a", "d41d8cd98f00b204e9800998ecf8427e"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let content_id = ContentId::from_source_url(&entry_url(&server)).unwrap();
    let listing = resolve_content(&session, &content_id, "12345")
        .await
        .unwrap();

    assert_eq!(listing.len(), 2);
    let names: Vec<&str> = listing.descriptors().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["b.txt", "a.txt"]);
}

#[tokio::test]
async fn test_resolve_content_skips_nested_folders() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let session = session_for(&server).await;
    mount_listing(
        &server,
        json!({"status": "ok", "data": {"contents": {
            "f1": {"type": "folder", "name": "sub"},
            "f2": {"type": "file", "name": "a.txt", "link": "https://store/a", "md5": "d41d8cd98f00b204e9800998ecf8427e"}
        }}}),
    )
    .await;

    let content_id = ContentId::from_source_url(&entry_url(&server)).unwrap();
    let listing = resolve_content(&session, &content_id, "12345")
        .await
        .unwrap();

    assert_eq!(listing.len(), 1);
    assert_eq!(listing.skipped_folders(), 1);
}

#[tokio::test]
async fn test_resolve_content_rejected_status_is_listing_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let session = session_for(&server).await;
    mount_listing(&server, json!({"status": "error-notFound", "data": {}})).await;

    let content_id = ContentId::from_source_url(&entry_url(&server)).unwrap();
    let result = resolve_content(&session, &content_id, "12345").await;

    assert!(
        matches!(result, Err(ListingError::Rejected { ref status, .. }) if status == "error-notFound"),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_resolve_content_http_error_names_content_id() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let session = session_for(&server).await;
    Mock::given(method("GET"))
        .and(path("/getContent"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let content_id = ContentId::from_source_url(&entry_url(&server)).unwrap();
    let err = resolve_content(&session, &content_id, "12345")
        .await
        .unwrap_err();

    assert!(matches!(err, ListingError::HttpStatus { status: 401, .. }));
    assert!(err.to_string().contains(CONTENT_ID));
}
