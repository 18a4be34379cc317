//! 服务配置和持久化
//!
//! 提供存储根目录、监听地址等设置的存储和读取。

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// 默认存储根目录
pub const DEFAULT_STORAGE_ROOT: &str = "/var/lib/hwfp";

/// 默认监听地址
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// 服务设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// 存储根目录（必须已存在）
    pub storage_root: PathBuf,
    /// HTTP 监听地址
    pub bind_addr: SocketAddr,
    /// 详细日志模式
    pub verbose: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8000))),
            verbose: false,
        }
    }
}

impl ServerSettings {
    /// 获取配置文件路径
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hwfp");
        config_dir.join("settings.toml")
    }

    /// 加载设置（如果文件不存在则使用默认值）
    ///
    /// 文件存在但无法解析时返回错误，不静默回退。
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No settings file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// 从指定文件加载设置
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {:?}", path))?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// 保存设置
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// 保存设置到指定文件
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// 检查存储根目录
    ///
    /// 服务不会创建存储根目录，缺失时启动失败。
    pub fn validate_storage_root(&self) -> anyhow::Result<()> {
        let meta = fs::metadata(&self.storage_root).with_context(|| {
            format!("Storage root {:?} is not accessible", self.storage_root)
        })?;
        anyhow::ensure!(
            meta.is_dir(),
            "Storage root {:?} is not a directory",
            self.storage_root
        );
        Ok(())
    }
}
