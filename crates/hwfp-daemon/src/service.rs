//! Upload Service - 存储检查、监听与关闭

use anyhow::{Context, Result};
use hwfp_core::{ServerSettings, UploadReceiver, http};
use std::sync::Arc;
use tokio::net::TcpListener;

pub async fn run_service(settings: ServerSettings) -> Result<()> {
    tracing::info!("服务初始化...");

    // 存储根目录由部署方创建，缺失时直接退出
    settings.validate_storage_root()?;

    let receiver = Arc::new(UploadReceiver::new(settings.storage_root.clone()));

    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;

    tracing::info!("存储目录: {:?}", settings.storage_root);

    http::serve(listener, receiver, shutdown_signal()).await
}

/// 等待 Ctrl-C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("无法监听 Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("收到退出信号，正在关闭...");
}
