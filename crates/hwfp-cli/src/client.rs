//! Upload Client - 与收集服务通信

use anyhow::{Context, Result, bail};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// 上传字段名，与服务端一致
const FILES_FIELD: &str = "files";

pub struct UploadClient {
    base_url: String,
    http: reqwest::Client,
}

impl UploadClient {
    pub fn new(server: &str) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: normalize_url(server),
            http,
        })
    }

    /// 一次请求上传全部文件
    pub async fn push(&self, files: &[PathBuf]) -> Result<()> {
        let mut form = Form::new();
        for path in files {
            let content = tokio::fs::read(path)
                .await
                .with_context(|| format!("无法读取文件 {}", path.display()))?;
            let part = Part::bytes(content).file_name(upload_name(path));
            form = form.part(FILES_FIELD, part);
        }

        let response = match self.http.post(&self.base_url).multipart(form).send().await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ 无法连接到服务: {}", e);
                eprintln!("   请确保 hwfp-daemon 正在运行");
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            bail!("上传失败 ({}): {}", status, reason);
        }

        Ok(())
    }

    /// 请求上传表单页面
    pub async fn ping(&self) -> Result<()> {
        let response = self.http.get(&self.base_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("服务返回 {}", status);
        }
        Ok(())
    }
}

/// 补全协议并以 `/` 结尾
fn normalize_url(server: &str) -> String {
    let url = if server.contains("://") {
        server.to_string()
    } else {
        format!("http://{}", server)
    };
    format!("{}/", url.trim_end_matches('/'))
}

/// 只上传文件名，不带本地目录
fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
