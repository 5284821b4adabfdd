use thiserror::Error;
use xbvr_model::SceneID;

/// Transport-level failures talking to the media server
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    #[error("Invalid server url: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Request(err)
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// A filter token or filter field that could not be decoded
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("filter token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("filter token is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("filter token does not hold an object")]
    NotAnObject,

    #[error("filter `{key}` expects {expected}")]
    FieldType { key: String, expected: &'static str },

    #[error("unknown filter `{0}`")]
    UnknownField(String),
}

/// Failures surfaced by collection store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Api error: {0}")]
    Api(#[from] ApiError),

    #[error("Malformed response body: {0}")]
    Decode(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{resource} does not support {operation}")]
    Unsupported {
        resource: &'static str,
        operation: &'static str,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by the remote session synchronizer
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to fetch scene {scene_id}: {source}")]
    SceneFetch {
        scene_id: SceneID,
        #[source]
        source: ApiError,
    },

    #[error("Scene {scene_id} payload could not be decoded: {reason}")]
    SceneDecode { scene_id: SceneID, reason: String },

    #[error("Malformed remote status: {0}")]
    MalformedStatus(#[from] serde_json::Error),
}
