//! courier-core
//!
//! 非同期 task 実行のコア。呼び出し元が task と完了 callback を渡し、
//! task は呼び出し元とは別のスレッドで実行され、結果（値 or エラー）が
//! 通知スレッド上でちょうど一度だけ callback に届く。
//!
//! # モジュール構成
//! - **domain**: 値・callback・エラー・ID
//! - **task**: AsyncTask trait と WorkTask / ErrorTask
//! - **dispatch**: Dispatcher と EventLoop（execute は worker、通知は loop 上）
//! - **app**: `add` entry point と export の登録

pub mod app;
pub mod dispatch;
pub mod domain;
pub mod task;

pub use app::{ADD, Module, ModuleBuilder, add, default_module};
pub use dispatch::{Dispatcher, EventLoop};
pub use domain::{CompletionHandler, ErrorKind, HostValue, TaskError, TaskId};
pub use task::{AsyncTask, Computation, ErrorTask, Sum, WorkTask};
