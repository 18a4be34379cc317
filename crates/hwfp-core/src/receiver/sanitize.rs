//! 文件名清洗
//!
//! 客户端提交的文件名不可信：把 `[A-Za-z0-9._-]` 以外的每个字符替换为 `_`，
//! 逐字符替换，不做路径规范化，因此长度和字符位置保持不变。
//! 路径分隔符、NUL 和控制字符都会被替换，写入目标不会离开批次目录。

/// 替换字符
pub const REPLACEMENT: char = '_';

/// 字符是否允许出现在落盘文件名中
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// 清洗文件名
///
/// 按 Unicode 标量值逐个替换，`"é"` 变成一个 `_`。
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if is_allowed(c) { c } else { REPLACEMENT })
        .collect()
}

/// 清洗结果仍指向当前目录或上级目录
///
/// 这两个名字只由允许字符组成，替换无法消除它们。
pub fn is_dot_entry(sanitized: &str) -> bool {
    sanitized == "." || sanitized == ".."
}
