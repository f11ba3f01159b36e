//! Entry - `add(a, b, callback)` の検証と dispatch
//!
//! # 状態遷移
//! 1. 引数が 3 未満 / `args[2]` が関数でない → 同期で `Err`（何も queue しない）
//! 2. ここから先は全て非同期
//!    - 引数の数が 3 でない → ErrorTask(count)
//!    - `args[0]` / `args[1]` が数値でない → ErrorTask(types)
//!    - それ以外 → WorkTask<Sum>
//!
//! 検査はこの順で行い、最初に引っかかったものだけが報告される。

use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::domain::{HostValue, INVALID_ARGUMENT_COUNT, INVALID_ARGUMENT_TYPES, TaskError};
use crate::task::{AsyncTask, ErrorTask, Sum, WorkTask};

/// Number of arguments `add` expects.
pub const ARITY: usize = 3;

/// Position of the completion callback.
pub const CALLBACK_INDEX: usize = 2;

/// Submit `args[0] + args[1]` and report the outcome to `args[2]`.
///
/// Returns `Err` only when no usable callback was supplied. Every other
/// problem is delivered asynchronously as `callback(error, undefined)`.
pub fn add(dispatcher: &Dispatcher, args: &[HostValue]) -> Result<(), TaskError> {
    if args.len() < ARITY {
        debug!(argc = args.len(), "add rejected: missing arguments");
        return Err(TaskError::type_error(INVALID_ARGUMENT_COUNT));
    }
    let Some(handler) = args[CALLBACK_INDEX].as_function() else {
        debug!(
            callback = args[CALLBACK_INDEX].type_name(),
            "add rejected: callback is not a function"
        );
        return Err(TaskError::type_error(INVALID_ARGUMENT_TYPES));
    };
    let handler = handler.clone();

    let task: Box<dyn AsyncTask> = match operands(args) {
        Ok(sum) => Box::new(WorkTask::new(handler, sum)),
        Err(error) => Box::new(ErrorTask::new(handler, error)),
    };
    let task_id = dispatcher.queue(task);
    debug!(%task_id, argc = args.len(), "add submitted");
    Ok(())
}

fn operands(args: &[HostValue]) -> Result<Sum, TaskError> {
    if args.len() != ARITY {
        return Err(TaskError::type_error(INVALID_ARGUMENT_COUNT));
    }
    match (args[0].as_number(), args[1].as_number()) {
        (Some(lhs), Some(rhs)) => Ok(Sum::new(lhs, rhs)),
        _ => Err(TaskError::type_error(INVALID_ARGUMENT_TYPES)),
    }
}
