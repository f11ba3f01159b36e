//! Task - AsyncTask capability と実装
//!
//! # 二種類の task
//! - **WorkTask**: Computation を worker 上で実行し、値 or 失敗を通知する
//! - **ErrorTask**: 計算を持たず、保持している error を同じ経路で通知するだけ
//!
//! # ライフサイクル
//! 1. 呼び出し元が task を作り、`Dispatcher::queue()` で所有権ごと渡す
//! 2. worker 上で `execute()`（自分の result スロットだけを書き換える）
//! 3. 通知スレッド上で `on_ok()` か `on_error()` のどちらか一方が一度だけ呼ばれる
//! 4. task は drop される

pub mod error;
pub mod sum;
pub mod work;

pub use self::error::ErrorTask;
pub use self::sum::Sum;
pub use self::work::{Computation, FromFn, WorkTask, from_fn};

use crate::domain::TaskError;

/// A unit of deferred work with an execute step and a completion step.
///
/// `execute` runs on a worker context and must not touch the completion
/// handler. Exactly one of `on_ok` / `on_error` is then invoked on the
/// notification context, consuming the task.
pub trait AsyncTask: Send + 'static {
    /// Short name used in tracing fields.
    fn name(&self) -> &'static str;

    fn execute(&mut self) -> Result<(), TaskError>;

    /// Called when `execute` returned `Ok`.
    fn on_ok(self: Box<Self>);

    /// Called when `execute` failed, or when the dispatcher could not run it.
    fn on_error(self: Box<Self>, error: TaskError);
}
