//! 上传接收错误类型

use std::io;
use std::path::PathBuf;

/// 客户端未提供文件名时的提示
pub const NO_FILENAME: &str = "no filename specified";

/// 清洗后仍指向目录自身或上级目录的文件名
pub const INVALID_FILENAME: &str = "invalid filename";

/// 处理一批上传文件时的错误
#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    /// 客户端输入无效（缺少文件名等），整批请求失败
    #[error("{0}")]
    InvalidInput(String),

    /// 创建目录或写入文件失败
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReceiveError {
    pub fn no_filename() -> Self {
        Self::InvalidInput(NO_FILENAME.to_string())
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 是否由客户端输入导致（对应 4xx）
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type ReceiveResult<T> = Result<T, ReceiveError>;
