//! # 统一错误处理模块
//!
//! 定义 vasputil 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// vasputil 统一错误类型
#[derive(Error, Debug)]
pub enum VasputilError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    /// `line` 从 1 开始计数
    #[error("Failed to parse {format} file: {path} (line {line})\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 晶胞状态错误
    // ─────────────────────────────────────────────────────────────
    #[error("Lattice matrix is singular, cannot convert to direct coordinates")]
    SingularLattice,

    #[error("Inconsistent cell: {0}")]
    InconsistentCell(String),

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),
}

impl VasputilError {
    /// 构造带行号的解析错误 (`line` 为 0 起始的行索引)
    pub fn parse(format: &str, path: &str, line_idx: usize, reason: impl Into<String>) -> Self {
        VasputilError::ParseError {
            format: format.to_string(),
            path: path.to_string(),
            line: line_idx + 1,
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, VasputilError>;
