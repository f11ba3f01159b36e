//! Dispatch - task の実行と通知
//!
//! # 主要コンポーネント
//! - **Dispatcher**: task を受け取り、`execute()` を blocking pool で走らせる（clone 可能なハンドル）
//! - **EventLoop**: 通知コンテキスト。終わった task を受け取り on_ok / on_error を直列に呼ぶ
//!
//! ```ignore
//! let mut event_loop = EventLoop::new();
//! let dispatcher = event_loop.dispatcher();
//! dispatcher.queue(Box::new(task));
//! event_loop.run_until_idle().await;
//! ```

pub mod dispatcher;
pub mod event_loop;

pub use self::dispatcher::Dispatcher;
pub use self::event_loop::EventLoop;

use crate::domain::{TaskError, TaskId};
use crate::task::AsyncTask;

/// A task whose execute step is over, on its way to the notification context.
pub(crate) struct Finished {
    pub(crate) id: TaskId,
    pub(crate) task: Box<dyn AsyncTask>,
    pub(crate) outcome: Result<(), TaskError>,
}
