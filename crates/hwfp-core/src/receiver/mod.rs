//! 上传接收
//!
//! 把一批上传文件写入存储根目录下按秒命名的子目录：
//!
//! ```text
//! <storage_root>/<YYYY-MM-DD_HH-MM-SS>/<sanitized-filename>
//! ```
//!
//! 同一秒内到达的请求共用一个目录，同名文件后写覆盖先写。
//! 批次中途失败时已写入的文件保留在磁盘上，不回滚。

pub mod sanitize;

pub use sanitize::sanitize_filename;

use crate::error::{INVALID_FILENAME, ReceiveError, ReceiveResult};
use bytes::Bytes;
use chrono::{DateTime, Local};
use log::{debug, info};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// 批次目录名格式（本地时间，精确到秒）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// 单个上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// 客户端提供的文件名，`None` 表示请求中没有文件名
    pub filename: Option<String>,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: Some(filename.into()),
            content: content.into(),
        }
    }

    /// 没有文件名的条目
    pub fn unnamed(content: impl Into<Bytes>) -> Self {
        Self {
            filename: None,
            content: content.into(),
        }
    }

    /// 非空文件名
    fn name(&self) -> Option<&str> {
        self.filename.as_deref().filter(|name| !name.is_empty())
    }
}

/// 一次请求提交的全部文件，按提交顺序处理
pub type UploadBatch = Vec<UploadedFile>;

/// 一个批次的落盘结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBatch {
    /// 批次目录
    pub dir: PathBuf,
    /// 按写入顺序排列的目标路径
    pub files: Vec<PathBuf>,
}

/// 格式化批次目录名
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// 上传接收器
#[derive(Debug, Clone)]
pub struct UploadReceiver {
    storage_root: PathBuf,
}

impl UploadReceiver {
    /// `storage_root` 必须是已存在的目录，接收器不会创建它
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// 给定时刻对应的批次目录
    pub fn destination_dir(&self, at: &DateTime<Local>) -> PathBuf {
        self.storage_root.join(format_timestamp(at))
    }

    /// 创建批次目录（非递归），目录已存在视为成功
    ///
    /// 并发请求可能在同一秒内同时创建，只调用一次 `create_dir`，
    /// 不先检查是否存在。
    pub async fn ensure_dir(&self, dir: &Path) -> ReceiveResult<()> {
        match fs::create_dir(dir).await {
            Ok(()) => {
                debug!("Created batch directory {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(ReceiveError::io(dir, e)),
        }
    }

    /// 以当前本地时间接收一批文件
    pub async fn receive(&self, files: UploadBatch) -> ReceiveResult<StoredBatch> {
        self.receive_at(files, Local::now()).await
    }

    /// 以指定时刻接收一批文件
    ///
    /// 时间戳对整批只取一次。遇到缺少文件名的条目立即失败，
    /// 之前已写入的文件不会删除。
    pub async fn receive_at(
        &self,
        files: UploadBatch,
        at: DateTime<Local>,
    ) -> ReceiveResult<StoredBatch> {
        let dir = self.destination_dir(&at);
        self.ensure_dir(&dir).await?;

        let mut written = Vec::with_capacity(files.len());

        for file in files {
            let name = file.name().ok_or_else(ReceiveError::no_filename)?;

            let sanitized = sanitize_filename(name);
            if sanitize::is_dot_entry(&sanitized) {
                return Err(ReceiveError::InvalidInput(INVALID_FILENAME.to_string()));
            }

            let target = dir.join(&sanitized);
            debug_assert_eq!(target.parent(), Some(dir.as_path()));

            write_file(&target, &file.content)
                .await
                .map_err(|e| ReceiveError::io(&target, e))?;

            debug!(
                "Stored {:?} as {} ({} bytes)",
                name,
                sanitized,
                file.content.len()
            );
            written.push(target);
        }

        info!(
            "Stored batch of {} file(s) in {}",
            written.len(),
            dir.display()
        );

        Ok(StoredBatch { dir, files: written })
    }
}

/// 截断写入
async fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2021, 9, 14, 13, 5, 9).unwrap()
    }

    fn read(path: impl AsRef<Path>) -> Vec<u8> {
        std::fs::read(path).unwrap()
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(&fixed_time()), "2021-09-14_13-05-09");
    }

    #[test]
    fn test_destination_dir() {
        let receiver = UploadReceiver::new("/var/lib/hwfp");
        assert_eq!(
            receiver.destination_dir(&fixed_time()),
            PathBuf::from("/var/lib/hwfp/2021-09-14_13-05-09")
        );
    }

    #[tokio::test]
    async fn test_round_trip() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        let batch = receiver
            .receive_at(
                vec![UploadedFile::new("report 1.txt", &b"date output"[..])],
                fixed_time(),
            )
            .await
            .unwrap();

        let expected = root.path().join("2021-09-14_13-05-09").join("report_1.txt");
        assert_eq!(batch.dir, root.path().join("2021-09-14_13-05-09"));
        assert_eq!(batch.files, vec![expected.clone()]);
        assert_eq!(read(expected), b"date output");
    }

    #[tokio::test]
    async fn test_zero_byte_file() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        let batch = receiver
            .receive_at(vec![UploadedFile::new("empty", Bytes::new())], fixed_time())
            .await
            .unwrap();

        assert!(read(&batch.files[0]).is_empty());
    }

    #[tokio::test]
    async fn test_overwrite_last_wins() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        let batch = receiver
            .receive_at(
                vec![
                    UploadedFile::new("a b.txt", &b"X"[..]),
                    UploadedFile::new("a b.txt", &b"Y"[..]),
                ],
                fixed_time(),
            )
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(&batch.dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(read(batch.dir.join("a_b.txt")), b"Y");
    }

    #[tokio::test]
    async fn test_overwrite_truncates_longer_content() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        receiver
            .receive_at(
                vec![
                    UploadedFile::new("log", &b"a much longer first payload"[..]),
                    UploadedFile::new("log", &b"short"[..]),
                ],
                fixed_time(),
            )
            .await
            .unwrap();

        assert_eq!(read(root.path().join("2021-09-14_13-05-09/log")), b"short");
    }

    #[tokio::test]
    async fn test_empty_filename_rejected_after_partial_write() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        let err = receiver
            .receive_at(
                vec![
                    UploadedFile::new("a.txt", &b"first"[..]),
                    UploadedFile::new("", &b"second"[..]),
                    UploadedFile::new("c.txt", &b"third"[..]),
                ],
                fixed_time(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ReceiveError::InvalidInput(ref msg) if msg == "no filename specified"));

        // 失败前写入的文件保留，之后的不再处理
        let dir = root.path().join("2021-09-14_13-05-09");
        assert_eq!(read(dir.join("a.txt")), b"first");
        assert!(!dir.join("c.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_filename_rejected() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        let err = receiver
            .receive_at(vec![UploadedFile::unnamed(&b"data"[..])], fixed_time())
            .await
            .unwrap_err();

        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "no filename specified");
    }

    #[tokio::test]
    async fn test_path_containment() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        let batch = receiver
            .receive_at(
                vec![
                    UploadedFile::new("../../etc/passwd", &b"1"[..]),
                    UploadedFile::new("a/b/c", &b"2"[..]),
                    UploadedFile::new("\0evil", &b"3"[..]),
                    UploadedFile::new("/abs/path", &b"4"[..]),
                ],
                fixed_time(),
            )
            .await
            .unwrap();

        for path in &batch.files {
            assert_eq!(path.parent(), Some(batch.dir.as_path()));
        }
        let names: Vec<_> = batch
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, [".._.._etc_passwd", "a_b_c", "_evil", "_abs_path"]);

        // 存储根目录下只有批次目录
        let top: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn test_dot_entries_rejected() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        for name in [".", ".."] {
            let err = receiver
                .receive_at(vec![UploadedFile::new(name, &b"x"[..])], fixed_time())
                .await
                .unwrap_err();
            assert!(matches!(err, ReceiveError::InvalidInput(ref msg) if msg == "invalid filename"));
        }
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());
        let dir = receiver.destination_dir(&fixed_time());

        receiver.ensure_dir(&dir).await.unwrap();
        receiver.ensure_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_same_second_reuses_directory() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        let first = receiver
            .receive_at(vec![UploadedFile::new("cpu.txt", &b"a"[..])], fixed_time())
            .await
            .unwrap();
        let second = receiver
            .receive_at(vec![UploadedFile::new("mem.txt", &b"b"[..])], fixed_time())
            .await
            .unwrap();

        assert_eq!(first.dir, second.dir);
        assert_eq!(read(first.dir.join("cpu.txt")), b"a");
        assert_eq!(read(first.dir.join("mem.txt")), b"b");
    }

    #[tokio::test]
    async fn test_concurrent_same_second_requests() {
        let root = tempfile::tempdir().unwrap();
        let receiver = std::sync::Arc::new(UploadReceiver::new(root.path()));

        let mut handles = Vec::new();
        for i in 0..8 {
            let receiver = receiver.clone();
            handles.push(tokio::spawn(async move {
                receiver
                    .receive_at(
                        vec![UploadedFile::new(format!("probe-{i}.json"), vec![i as u8])],
                        fixed_time(),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let dir = root.path().join("2021-09-14_13-05-09");
        assert_eq!(std::fs::read_dir(dir).unwrap().count(), 8);
    }

    #[tokio::test]
    async fn test_missing_storage_root_is_io_error() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path().join("does-not-exist"));

        let err = receiver
            .receive_at(vec![UploadedFile::new("a.txt", &b"x"[..])], fixed_time())
            .await
            .unwrap_err();

        assert!(matches!(err, ReceiveError::Io { .. }));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_empty_batch_creates_directory_only() {
        let root = tempfile::tempdir().unwrap();
        let receiver = UploadReceiver::new(root.path());

        let batch = receiver.receive_at(Vec::new(), fixed_time()).await.unwrap();

        assert!(batch.files.is_empty());
        assert!(batch.dir.is_dir());
    }
}
