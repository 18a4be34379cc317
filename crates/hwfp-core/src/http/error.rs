//! HTTP 错误响应

use crate::error::ReceiveError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::warn;

/// 上传请求失败时返回给客户端的错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Receive(#[from] ReceiveError),

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("field required: {0}")]
    MissingField(&'static str),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Receive(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Receive(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(e) => e.status(),
            ApiError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// 返回给客户端的文本，服务端错误不暴露文件系统细节
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Receive(ReceiveError::Io { .. }) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_client_error() {
            warn!("Rejected upload request ({}): {}", status, self);
        }
        (status, self.client_message()).into_response()
    }
}
