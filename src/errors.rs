use std::path::PathBuf;
use thiserror::Error;

/// Stage at which an outbound API call broke down
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStage {
    /// TCP connection or TLS negotiation to the API host failed
    Connect,
    /// No response within the request timeout
    Timeout,
    /// Request could not be built or sent
    Request,
    /// Response arrived but the body could not be read
    Body,
}

impl std::fmt::Display for ConnectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl ConnectionStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionStage::Connect => "Connect",
            ConnectionStage::Timeout => "Timeout",
            ConnectionStage::Request => "Request",
            ConnectionStage::Body => "Response Body",
        }
    }

    /// Actionable hint for the operator
    pub fn suggestion(&self) -> &'static str {
        match self {
            ConnectionStage::Connect => {
                "Check root_request_url in the API config and your network connection."
            }
            ConnectionStage::Timeout => "The API is slow or unreachable. Try again later.",
            ConnectionStage::Request => "The request could not be sent. Check the API config values.",
            ConnectionStage::Body => "The API closed the connection mid-response. Try again later.",
        }
    }

    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ConnectionStage::Timeout
        } else if err.is_connect() {
            ConnectionStage::Connect
        } else if err.is_body() || err.is_decode() {
            ConnectionStage::Body
        } else {
            ConnectionStage::Request
        }
    }
}

/// Failure of a single call against the meeting platform API.
///
/// Every call through the directory client yields either a parsed JSON
/// payload or one of these; there is no third shape.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("Transport failure at {stage} for {resource}: {message}")]
    Transport {
        resource: String,
        stage: ConnectionStage,
        message: String,
    },

    #[error("API returned HTTP {status} for {resource}: {body}")]
    Status {
        resource: String,
        status: u16,
        body: String,
    },

    #[error("Failed to parse response for {resource}: {message}")]
    Parse { resource: String, message: String },

    /// Error object embedded in an otherwise successful response
    #[error("API error {code} for {resource}: {message}")]
    Vendor {
        resource: String,
        code: i64,
        message: String,
    },
}

impl ApiError {
    /// Multi-line description for the log
    pub fn diagnostics(&self) -> String {
        match self {
            ApiError::Transport { resource, stage, message } => format!(
                "Transport Failure\nResource: {}\nStage: {}\nError: {}\nSuggestion: {}",
                resource,
                stage.display_name(),
                message,
                stage.suggestion()
            ),
            ApiError::Status { resource, status, body } => format!(
                "HTTP Error\nResource: {}\nStatus: {}\nBody: {}",
                resource, status, body
            ),
            ApiError::Parse { resource, message } => format!(
                "Parse Error\nResource: {}\nError: {}\nSuggestion: Verify data_type is JSON in the API config",
                resource, message
            ),
            ApiError::Vendor { resource, code, message } => format!(
                "API Error\nResource: {}\nCode: {}\nMessage: {}",
                resource, code, message
            ),
        }
    }

    pub fn vendor_code(&self) -> Option<i64> {
        match self {
            ApiError::Vendor { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Problems with the operator-supplied import file
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unable to find provided filepath: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Provided file is not a CSV. Please use a CSV for the Zoom users to deprovision list: {}", .0.display())]
    NotCsv(PathBuf),

    #[error("Import file {} is empty; a header row is required", .0.display())]
    MissingHeader(PathBuf),

    #[error("Row {line} of the import file has no email column")]
    MissingEmail { line: u64 },

    #[error("Failed to read import file: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API config not found (looked in: {0})")]
    NotFound(String),

    #[error("Failed to read API config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed API config {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
