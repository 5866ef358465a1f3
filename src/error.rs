use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// 网关统一错误类型
///
/// 校验类错误在模型层就被拦下，不会触达远程服务；
/// `RemoteRequestFailed` / `SessionExpired` 来自远程生成服务。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("unsupported constraint strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("unsupported column data type: {0}")]
    UnsupportedDataType(String),

    #[error("unsupported export format: {0}")]
    UnsupportedExportFormat(String),

    #[error("please define at least one table for relational generation")]
    EmptyTableSet,

    #[error("failed to parse history data: {0}")]
    MalformedHistoryData(String),

    #[error("no data found for this history entry")]
    EmptyHistoryData,

    #[error("history entry {0} not found")]
    HistoryEntryNotFound(i64),

    #[error("remote request failed: {0}")]
    RemoteRequestFailed(String),

    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),

    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("not logged in")]
    NotAuthenticated,

    #[error("a generation request is already in flight")]
    RequestInFlight,

    #[error("generation request was cancelled")]
    Cancelled,

    #[error("no data to work with, generate or load a dataset first")]
    NoResult,
}

impl AppError {
    pub fn missing(field: &str) -> Self {
        Self::MissingField(field.to_string())
    }

    /// 前端用来区分错误的稳定标识
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidRange(_) => "invalid_range",
            Self::UnsupportedStrategy(_) => "unsupported_strategy",
            Self::UnsupportedDataType(_) => "unsupported_data_type",
            Self::UnsupportedExportFormat(_) => "unsupported_export_format",
            Self::EmptyTableSet => "empty_table_set",
            Self::MalformedHistoryData(_) => "malformed_history_data",
            Self::EmptyHistoryData => "empty_history_data",
            Self::HistoryEntryNotFound(_) => "history_entry_not_found",
            Self::RemoteRequestFailed(_) => "remote_request_failed",
            Self::MalformedResponse(_) => "malformed_response",
            Self::SessionExpired => "session_expired",
            Self::NotAuthenticated => "not_authenticated",
            Self::RequestInFlight => "request_in_flight",
            Self::Cancelled => "cancelled",
            Self::NoResult => "no_result",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidRange(_)
                | Self::UnsupportedStrategy(_)
                | Self::UnsupportedDataType(_)
                | Self::UnsupportedExportFormat(_)
                | Self::EmptyTableSet
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_)
            | Self::InvalidRange(_)
            | Self::UnsupportedStrategy(_)
            | Self::UnsupportedDataType(_)
            | Self::UnsupportedExportFormat(_)
            | Self::EmptyTableSet
            | Self::MalformedHistoryData(_)
            | Self::EmptyHistoryData => StatusCode::UNPROCESSABLE_ENTITY,
            Self::HistoryEntryNotFound(_) | Self::NoResult => StatusCode::NOT_FOUND,
            Self::RemoteRequestFailed(_) | Self::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            Self::SessionExpired | Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::RequestInFlight | Self::Cancelled => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
