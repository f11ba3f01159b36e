//! Dispatcher - task の所有権を受け取り、worker 上で execute する
//!
//! # 実装詳細
//! - `execute()` は `tokio::task::spawn_blocking` で blocking pool 上で実行
//! - panic は `catch_unwind` で拾い、Execution エラーとして扱う
//! - 実行できなかった task（loop が閉じている、runtime が無い）は
//!   Infrastructure エラー付きでそのまま通知側に回す。handler は必ず一度呼ばれる

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::Finished;
use crate::domain::{TaskError, TaskId};
use crate::task::AsyncTask;

pub(crate) struct Shared {
    tx: mpsc::UnboundedSender<Finished>,
    pending: AtomicUsize,
    closed: AtomicBool,
}

impl Shared {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Finished>) -> Self {
        Self {
            tx,
            pending: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub(crate) fn completed(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn post(&self, finished: Finished) {
        if let Err(mpsc::error::SendError(lost)) = self.tx.send(finished) {
            // EventLoop が drop 済み。通知先が無いので task ごと捨てる
            warn!(task_id = %lost.id, task = lost.task.name(), "event loop dropped; completion discarded");
        }
    }
}

/// Cloneable handle used to queue tasks onto an [`EventLoop`](super::EventLoop).
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl Dispatcher {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Take ownership of `task` and schedule its execute step.
    ///
    /// Exactly one of `on_ok` / `on_error` will later run on the event loop.
    pub fn queue(&self, task: Box<dyn AsyncTask>) -> TaskId {
        let id = TaskId::generate();
        let name = task.name();
        self.shared.pending.fetch_add(1, Ordering::SeqCst);

        if self.shared.is_closed() {
            debug!(task_id = %id, task = name, "event loop closed; failing task");
            self.shared.post(Finished {
                id,
                task,
                outcome: Err(TaskError::infrastructure("event loop is closed")),
            });
            return id;
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(task_id = %id, task = name, error = %e, "no runtime to execute task");
                self.shared.post(Finished {
                    id,
                    task,
                    outcome: Err(TaskError::infrastructure(e.to_string())),
                });
                return id;
            }
        };

        debug!(task_id = %id, task = name, "task queued");
        let job = Unstarted {
            id,
            task: Some(task),
            shared: Arc::clone(&self.shared),
        };
        runtime.spawn_blocking(move || job.run());
        id
    }

    /// Number of queued tasks whose completion has not been delivered yet.
    pub fn pending(&self) -> usize {
        self.shared.pending()
    }
}

/// spawn_blocking に渡す task
///
/// runtime の停止で実行前に drop された場合も、Infrastructure エラーとして通知側へ回す。
struct Unstarted {
    id: TaskId,
    task: Option<Box<dyn AsyncTask>>,
    shared: Arc<Shared>,
}

impl Unstarted {
    fn run(mut self) {
        if let Some(task) = self.task.take() {
            let finished = run_execute(self.id, task);
            self.shared.post(finished);
        }
    }
}

impl Drop for Unstarted {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            warn!(task_id = %self.id, task = task.name(), "runtime shut down before task started");
            self.shared.post(Finished {
                id: self.id,
                task,
                outcome: Err(TaskError::infrastructure(
                    "runtime shut down before the task started",
                )),
            });
        }
    }
}

fn run_execute(id: TaskId, mut task: Box<dyn AsyncTask>) -> Finished {
    trace!(task_id = %id, task = task.name(), "executing task");
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| task.execute())) {
        Ok(outcome) => outcome,
        Err(payload) => Err(TaskError::execution(format!(
            "execution panicked: {}",
            panic_message(payload.as_ref())
        ))),
    };
    Finished { id, task, outcome }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
