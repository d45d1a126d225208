use crate::config::ApiConfig;
use crate::errors::{ApiError, ConnectionStage};
use crate::user_type::UserType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const USER_LIST_RESOURCE: &str = "user/list";
pub const USER_DELETE_RESOURCE: &str = "user/permanentdelete";

/// Largest page the user listing will return
pub const MAX_PAGE_SIZE: usize = 300;

/// Vendor error code for an id that does not exist
pub const USER_NOT_FOUND_CODE: i64 = 1001;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DirectoryUser {
    /// Absent on malformed records; such users are backed up but never deleted
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(rename = "type", default)]
    pub user_type: UserType,
    /// Auxiliary metadata (dept, pmi, timestamps, ...) kept as returned
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl DirectoryUser {
    /// Renders a single field for the backup file; absent fields are blank.
    pub fn field(&self, key: &str) -> String {
        match key {
            "id" => self.id.clone().unwrap_or_default(),
            "email" => self.email.clone(),
            "first_name" => self.first_name.clone().unwrap_or_default(),
            "last_name" => self.last_name.clone().unwrap_or_default(),
            "type" => self.user_type.to_backup_value(),
            other => self.extra.get(other).map(cell_text).unwrap_or_default(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserPage {
    /// Absent when the listing has nothing more to give
    #[serde(default)]
    pub users: Option<Vec<DirectoryUser>>,
    pub page_count: Option<u64>,
    pub page_number: Option<u64>,
    pub total_records: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The API echoed back the requested id
    Deleted,
    /// The API reports no such user; nothing left to remove
    AlreadyAbsent,
    /// The call succeeded but echoed a different (or no) id
    Mismatch { returned: Option<String> },
}

#[derive(Debug, Clone)]
pub struct ZoomClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl ZoomClient {
    pub fn new(config: ApiConfig) -> Result<Self, anyhow::Error> {
        // Certificates are NOT verified. Nothing sent through this client is
        // on a verified channel.
        let client = reqwest::Client::builder()
            .user_agent(concat!("zoom-deprovisioner/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn root_request_url(&self) -> &str {
        &self.config.root_request_url
    }

    /// POSTs `params` plus the static credentials to `root_request_url + resource`.
    pub async fn do_request(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.config.root_request_url, resource);

        let mut form: Vec<(&str, &str)> = vec![
            ("api_key", self.config.api_key.as_str()),
            ("api_secret", self.config.api_secret.as_str()),
            ("data_type", self.config.data_type.as_str()),
        ];
        form.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let resp = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error(resource, &e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| transport_error(resource, &e))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                resource: resource.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| ApiError::Parse {
            resource: resource.to_string(),
            message: e.to_string(),
        })?;

        if let Some(err) = json.get("error") {
            return Err(ApiError::Vendor {
                resource: resource.to_string(),
                code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: err
                    .get("message")
                    .map(cell_text)
                    .unwrap_or_else(|| err.to_string()),
            });
        }

        Ok(json)
    }

    pub async fn list_users(&self, page_number: u32, page_size: usize) -> Result<UserPage, ApiError> {
        let json = self
            .do_request(
                USER_LIST_RESOURCE,
                &[
                    ("page_size", page_size.to_string()),
                    ("page_number", page_number.to_string()),
                ],
            )
            .await?;

        serde_json::from_value(json).map_err(|e| ApiError::Parse {
            resource: USER_LIST_RESOURCE.to_string(),
            message: e.to_string(),
        })
    }

    pub async fn delete_user(&self, id: &str) -> Result<DeleteOutcome, ApiError> {
        let json = match self
            .do_request(USER_DELETE_RESOURCE, &[("id", id.to_string())])
            .await
        {
            Ok(json) => json,
            Err(e) if e.vendor_code() == Some(USER_NOT_FOUND_CODE) => {
                return Ok(DeleteOutcome::AlreadyAbsent)
            }
            Err(e) => return Err(e),
        };

        let returned = json.get("id").map(cell_text);
        if returned.as_deref() == Some(id) {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::Mismatch { returned })
        }
    }
}

fn transport_error(resource: &str, err: &reqwest::Error) -> ApiError {
    ApiError::Transport {
        resource: resource.to_string(),
        stage: ConnectionStage::classify(err),
        message: err.to_string(),
    }
}
