mod common;

use common::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zoom_deprovisioner_lib::errors::ApiError;
use zoom_deprovisioner_lib::sync::{sync_directory, SyncError, BACKUP_COLUMNS};
use zoom_deprovisioner_lib::user_type::UserType;

async fn mount_listing(server: &MockServer, users: Vec<serde_json::Value>) {
    Mock::given(method("POST"))
        .and(path(LIST_PATH))
        .respond_with(PagedListing {
            users,
            page_size: 300,
        })
        .mount(server)
        .await;
}

fn backup_lines(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("backup.csv"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_exactly_one_full_page_costs_two_requests() {
    let server = MockServer::start().await;
    mount_listing(&server, (0..300).map(|n| create_test_user(n, 1)).collect()).await;

    let dir = TempDir::new().unwrap();
    let outcome = sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &[])
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(page_numbers(&requests), vec![1, 2]);
    assert_eq!(outcome.metrics.pages_requested, 2);
    assert_eq!(outcome.metrics.total, 300);
    assert_eq!(backup_lines(&dir).len(), 301);
}

#[tokio::test]
async fn test_pages_visited_in_order_until_short_page() {
    let server = MockServer::start().await;
    mount_listing(&server, (0..650).map(|n| create_test_user(n, 2)).collect()).await;

    let dir = TempDir::new().unwrap();
    let outcome = sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &[])
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(page_numbers(&requests), vec![1, 2, 3]);
    assert_eq!(outcome.metrics.total, 650);
    assert_eq!(outcome.metrics.pro, 650);
    assert!(outcome.targets.is_empty());
}

#[tokio::test]
async fn test_short_first_page_is_single_request() {
    let server = MockServer::start().await;
    mount_listing(&server, (0..5).map(|n| create_test_user(n, 1)).collect()).await;

    let dir = TempDir::new().unwrap();
    sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &[])
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(page_numbers(&requests), vec![1]);
}

#[tokio::test]
async fn test_missing_users_field_stops_listing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"page_count": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let outcome = sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &[])
        .await
        .unwrap();

    assert_eq!(outcome.metrics.total, 0);
    assert_eq!(backup_lines(&dir), vec![BACKUP_COLUMNS.join(",")]);
}

#[tokio::test]
async fn test_credentials_sent_with_listing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LIST_PATH))
        .and(body_string_contains("api_key=test-key"))
        .and(body_string_contains("api_secret=test-secret"))
        .and(body_string_contains("data_type=JSON"))
        .and(body_string_contains("page_size=300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &[])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_matching_is_exact_and_case_sensitive() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        vec![
            create_test_user(1, 1),
            create_test_user(2, 2),
            create_test_user(3, 1),
        ],
    )
    .await;

    let import = vec![
        "USER1@x.com".to_string(),
        "user2@x.com".to_string(),
        "user2@x.com".to_string(),
        "nobody@x.com".to_string(),
    ];
    let dir = TempDir::new().unwrap();
    let outcome = sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &import)
        .await
        .unwrap();

    assert_eq!(outcome.targets.len(), 1);
    assert_eq!(outcome.targets[0].id.as_deref(), Some("id-2"));
    assert_eq!(outcome.targets[0].user_type, UserType::Pro);
    assert_eq!(outcome.metrics.imported, 4);
    assert_eq!(outcome.metrics.matched, 1);
    assert_eq!(outcome.metrics.pro_to_remove, 1);
    assert_eq!(outcome.metrics.basic_to_remove, 0);
}

#[tokio::test]
async fn test_unknown_type_code_is_backed_up_raw() {
    let server = MockServer::start().await;
    mount_listing(&server, vec![create_test_user(1, 3), create_test_user(2, 1)]).await;

    let import = vec!["user1@x.com".to_string()];
    let dir = TempDir::new().unwrap();
    let outcome = sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &import)
        .await
        .unwrap();

    assert_eq!(outcome.metrics.total, 2);
    assert_eq!(outcome.metrics.basic, 1);
    assert_eq!(outcome.metrics.pro, 0);
    assert_eq!(outcome.targets.len(), 1);

    let lines = backup_lines(&dir);
    assert!(lines[1].starts_with("id-1,user1@x.com,Test,User1,3,"));
    assert!(lines[2].starts_with("id-2,user2@x.com,Test,User2,Basic,"));
}

#[tokio::test]
async fn test_record_without_id_is_backed_up_blank() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        vec![
            json!({"email": "noid@x.com", "type": 1}),
            json!({"id": "id-9", "email": null, "type": 2}),
            create_test_user(1, 1),
        ],
    )
    .await;

    let import = vec!["noid@x.com".to_string(), "user1@x.com".to_string()];
    let dir = TempDir::new().unwrap();
    let outcome = sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &import)
        .await
        .unwrap();

    assert_eq!(outcome.metrics.total, 3);
    assert_eq!(outcome.metrics.matched, 2);
    assert_eq!(outcome.targets[0].id, None);

    let lines = backup_lines(&dir);
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with(",noid@x.com,,,Basic,"));
    assert!(lines[2].starts_with("id-9,,,,Pro,"));
}

#[tokio::test]
async fn test_vendor_error_aborts_sync() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"code": 124, "message": "Invalid api key or secret."}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &[])
        .await
        .unwrap_err();

    match err {
        SyncError::Api(ApiError::Vendor { code, .. }) => assert_eq!(code, 124),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &[])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Api(ApiError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<xml/>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = sync_directory(&client_for(&server), &dir.path().join("backup.csv"), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Api(ApiError::Parse { .. })));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Nothing listens on port 1
    let client = client_for_url("http://127.0.0.1:1/v1");

    let dir = TempDir::new().unwrap();
    let err = sync_directory(&client, &dir.path().join("backup.csv"), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Api(ApiError::Transport { .. })));
}
