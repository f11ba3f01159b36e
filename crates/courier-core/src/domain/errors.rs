//! Errors - エラー型と分類
//!
//! # 分類
//! - **同期拒否**: handler が無い／呼び出せない。`Err(TaskError)` として呼び出し元へ即座に返す
//! - **非同期検証エラー**: 引数の数・型の不一致。`ErrorTask` 経由で callback に届く
//! - **実行エラー**: `execute()` 内の失敗。同じく callback の error スロットに届く

use std::fmt;

use serde::Serialize;

/// Message used when the argument count does not match.
pub const INVALID_ARGUMENT_COUNT: &str = "Invalid argument count";

/// Message used when an argument has the wrong type.
pub const INVALID_ARGUMENT_TYPES: &str = "Invalid argument types";

/// ErrorKind はエラーの分類
///
/// - Type: 引数の数・型の検証エラー（同期・非同期どちらも）
/// - Execution: `execute()` の中で起きた失敗
/// - Infrastructure: dispatcher が `execute()` を走らせられなかった
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Type,
    Execution,
    Infrastructure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Type => "TypeError",
            ErrorKind::Execution => "ExecutionError",
            ErrorKind::Infrastructure => "InfrastructureError",
        };
        f.write_str(name)
    }
}

/// TaskError は kind + メッセージ
///
/// callback の error スロットに渡される値でもあり、
/// 同期拒否で呼び出し元に返される値でもある。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TaskError {
    kind: ErrorKind,
    message: String,
}

impl TaskError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Execution, message)
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Infrastructure, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// RegistryError は export 登録・呼び出し時のエラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("export '{0}' is already registered")]
    DuplicateExport(String),

    #[error("export '{0}' not found")]
    ExportNotFound(String),

    #[error("Missing exports: {0:?}. These exports were expected but not registered.")]
    MissingExports(Vec<String>),

    #[error(transparent)]
    Rejected(#[from] TaskError),
}
