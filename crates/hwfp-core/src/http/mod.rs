//! HTTP 接口
//!
//! - `GET /` 返回上传表单
//! - `POST /` 接收 `multipart/form-data`，字段名 `files`，可重复

mod error;

pub use error::ApiError;

use crate::receiver::{UploadBatch, UploadReceiver, UploadedFile};
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use log::{debug, error, info};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// 上传文件的表单字段名
pub const FILES_FIELD: &str = "files";

/// 上传表单页面
pub const FORM_PAGE: &str = r#"<body>
<form action="/" enctype="multipart/form-data" method="post">
<input name="files" type="file" multiple>
<input type="submit">
</form>
</body>
"#;

/// 构建路由
///
/// 上传大小不设上限，关闭 axum 默认的请求体限制。
pub fn router(receiver: Arc<UploadReceiver>) -> Router {
    Router::new()
        .route("/", get(form_handler).post(upload_handler))
        .layer(DefaultBodyLimit::disable())
        .with_state(receiver)
}

/// 在已绑定的监听器上提供服务，`shutdown` 完成后优雅退出
pub async fn serve(
    listener: TcpListener,
    receiver: Arc<UploadReceiver>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        "Upload server listening on {} (storage root {})",
        addr,
        receiver.storage_root().display()
    );

    axum::serve(listener, router(receiver))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Upload server stopped");
    Ok(())
}

async fn form_handler() -> Html<&'static str> {
    Html(FORM_PAGE)
}

async fn upload_handler(
    State(receiver): State<Arc<UploadReceiver>>,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    let files = read_batch(multipart).await?;
    debug!("Received upload request with {} file(s)", files.len());

    match receiver.receive(files).await {
        Ok(_) => Ok(StatusCode::OK),
        Err(e) => {
            if !e.is_client_error() {
                error!("Failed to store upload batch: {}", e);
            }
            Err(e.into())
        }
    }
}

/// 读取请求中的全部 `files` 字段，其他字段忽略
async fn read_batch(mut multipart: Multipart) -> Result<UploadBatch, ApiError> {
    let mut files = Vec::new();
    let mut seen_field = false;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        seen_field = true;

        let filename = field.file_name().map(str::to_string);
        let content = field.bytes().await?;
        files.push(UploadedFile { filename, content });
    }

    if !seen_field {
        return Err(ApiError::MissingField(FILES_FIELD));
    }

    Ok(files)
}
