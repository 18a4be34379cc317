//! hwfp Daemon
//!
//! 文件收集服务进程，负责：
//! - 加载设置并检查存储根目录
//! - 初始化日志
//! - 提供 HTTP 上传服务，收到信号后优雅退出

mod service;

use anyhow::Result;
use clap::Parser;
use hwfp_core::ServerSettings;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hwfp-daemon", version, about = "接收上传文件并按批次落盘")]
struct Args {
    /// 配置文件路径 (默认: ~/.config/hwfp/settings.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// 存储根目录 (必须已存在)
    #[arg(short, long)]
    storage_root: Option<PathBuf>,
    /// 监听地址
    #[arg(short, long)]
    bind: Option<SocketAddr>,
    /// 详细日志
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// 命令行参数覆盖配置文件
    fn resolve(self) -> Result<ServerSettings> {
        let mut settings = match &self.config {
            Some(path) => ServerSettings::load_from(path)?,
            None => ServerSettings::load()?,
        };
        if let Some(root) = self.storage_root {
            settings.storage_root = root;
        }
        if let Some(bind) = self.bind {
            settings.bind_addr = bind;
        }
        settings.verbose |= self.verbose;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = args.resolve()?;

    // 桥接 log crate（hwfp-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    let default_filter = if settings.verbose {
        "debug"
    } else {
        "info,hwfp_core=debug"
    };

    // 初始化日志
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();

    tracing::info!("hwfp Daemon starting...");

    service::run_service(settings).await
}
