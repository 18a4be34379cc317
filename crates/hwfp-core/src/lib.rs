//! hwfp Core Library
//!
//! 文件收集服务的核心实现：接收 HTTP multipart 上传，
//! 把每批文件写入存储根目录下按秒命名的子目录。
//!
//! # 模块
//!
//! - **receiver**: 批次目录、文件名清洗、落盘
//! - **http**: axum 路由（上传表单和上传接口）
//! - **config**: 服务设置
//!
//! # 使用示例
//!
//! ```ignore
//! use hwfp_core::{UploadReceiver, UploadedFile};
//!
//! let receiver = UploadReceiver::new("/var/lib/hwfp");
//! let batch = receiver
//!     .receive(vec![UploadedFile::new("lshw.json", data)])
//!     .await?;
//! println!("stored in {}", batch.dir.display());
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod receiver;

pub use config::ServerSettings;
pub use error::{ReceiveError, ReceiveResult};
pub use receiver::{StoredBatch, UploadBatch, UploadReceiver, UploadedFile, sanitize_filename};
