//! Shared helpers for the wiremock-backed integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};
use zoom_deprovisioner_lib::api::ZoomClient;
use zoom_deprovisioner_lib::config::ApiConfig;

pub const LIST_PATH: &str = "/v1/user/list";
pub const DELETE_PATH: &str = "/v1/user/permanentdelete";

pub fn client_for(server: &MockServer) -> ZoomClient {
    client_for_url(&format!("{}/v1", server.uri()))
}

pub fn client_for_url(root_request_url: &str) -> ZoomClient {
    let config = ApiConfig::from_json(
        Path::new("test-config"),
        &json!({
            "root_request_url": root_request_url,
            "api_key": "test-key",
            "api_secret": "test-secret",
            "data_type": "JSON"
        })
        .to_string(),
    )
    .unwrap();
    ZoomClient::new(config).unwrap()
}

/// Looks up one field of a urlencoded form body
pub fn form_value(request: &Request, key: &str) -> Option<String> {
    let body = std::str::from_utf8(&request.body).ok()?;
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}

pub fn create_test_user(n: usize, user_type: i64) -> Value {
    json!({
        "id": format!("id-{}", n),
        "email": format!("user{}@x.com", n),
        "first_name": "Test",
        "last_name": format!("User{}", n),
        "type": user_type,
        "dept": "Testing",
        "created_at": "2017-01-01T00:00:00Z",
        "status": "active",
        "pmi": 1000000000 + n
    })
}

/// Serves `users` in pages keyed off the `page_number` form field.
pub struct PagedListing {
    pub users: Vec<Value>,
    pub page_size: usize,
}

impl Respond for PagedListing {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let page: usize = form_value(request, "page_number")
            .and_then(|p| p.parse().ok())
            .unwrap_or(1);
        let start = ((page - 1) * self.page_size).min(self.users.len());
        let end = (start + self.page_size).min(self.users.len());
        ResponseTemplate::new(200).set_body_json(json!({
            "page_count": self.users.len().div_ceil(self.page_size),
            "page_number": page,
            "page_size": self.page_size,
            "total_records": self.users.len(),
            "users": self.users[start..end].to_vec()
        }))
    }
}

/// Echoes the requested id back, like a successful permanent delete
pub struct EchoDelete;

impl Respond for EchoDelete {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = form_value(request, "id").unwrap_or_default();
        ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "deleted_at": "2017-10-01T12:00:00Z"
        }))
    }
}

pub fn page_numbers(requests: &[Request]) -> Vec<u32> {
    requests
        .iter()
        .filter(|r| r.url.path() == LIST_PATH)
        .filter_map(|r| form_value(r, "page_number")?.parse().ok())
        .collect()
}
