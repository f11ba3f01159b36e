//! EventLoop - 通知コンテキスト
//!
//! `run_until_idle()` を呼んだ task の上で、終わった task の
//! on_ok / on_error を一つずつ呼ぶ。同時に二つの通知が走ることはない。

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::Finished;
use super::dispatcher::{Dispatcher, Shared};

pub struct EventLoop {
    dispatcher: Dispatcher,
    shared: Arc<Shared>,
    rx: mpsc::UnboundedReceiver<Finished>,
}

impl EventLoop {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::new(tx));
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&shared)),
            shared,
            rx,
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn pending(&self) -> usize {
        self.shared.pending()
    }

    /// Stop executing new tasks. Tasks queued afterwards still complete,
    /// through `on_error` with an infrastructure error.
    pub fn close(&self) {
        self.shared.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Deliver completions until no queued task remains.
    ///
    /// Completion handlers may queue further tasks; those are waited for too.
    /// Returns the number of completions delivered.
    pub async fn run_until_idle(&mut self) -> usize {
        let mut delivered = 0;
        while self.shared.pending() > 0 {
            // tx は self.shared が持っているので None にはならない
            let Some(finished) = self.rx.recv().await else {
                break;
            };
            self.deliver(finished);
            delivered += 1;
        }
        debug!(delivered, "event loop idle");
        delivered
    }

    fn deliver(&mut self, finished: Finished) {
        let _completed = Completed(&self.shared);
        let Finished { id, task, outcome } = finished;
        match outcome {
            Ok(()) => {
                trace!(task_id = %id, task = task.name(), "delivering ok");
                task.on_ok();
            }
            Err(error) => {
                trace!(task_id = %id, task = task.name(), %error, "delivering error");
                task.on_error(error);
            }
        }
    }
}

/// callback が panic しても pending を必ず一つ戻す
struct Completed<'a>(&'a Shared);

impl Drop for Completed<'_> {
    fn drop(&mut self) {
        self.0.completed();
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompletionHandler, ErrorKind, HostValue, TaskError};
    use crate::task::{ErrorTask, Sum, WorkTask, from_fn};
    use std::panic::AssertUnwindSafe;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    type Calls = Arc<Mutex<Vec<(Option<TaskError>, Option<HostValue>, ThreadId)>>>;

    fn recording_handler() -> (CompletionHandler, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let handler = CompletionHandler::new(move |_, err, value| {
            sink.lock().unwrap().push((err, value, thread::current().id()));
        });
        (handler, calls)
    }

    #[tokio::test]
    async fn delivers_sum_on_loop_thread() {
        let mut event_loop = EventLoop::new();
        let (handler, calls) = recording_handler();

        event_loop
            .dispatcher()
            .queue(Box::new(WorkTask::new(handler, Sum::new(2.0, 3.0))));
        assert_eq!(event_loop.pending(), 1);

        let delivered = event_loop.run_until_idle().await;
        assert_eq!(delivered, 1);
        assert_eq!(event_loop.pending(), 0);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.is_none());
        assert_eq!(calls[0].1, Some(HostValue::Number(5.0)));
        assert_eq!(calls[0].2, thread::current().id());
    }

    #[tokio::test]
    async fn execute_runs_off_the_loop_thread() {
        let mut event_loop = EventLoop::new();
        let (handler, calls) = recording_handler();
        let worker_thread = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&worker_thread);

        let computation = from_fn(move || {
            *slot.lock().unwrap() = Some(thread::current().id());
            Ok(HostValue::Null)
        });
        event_loop
            .dispatcher()
            .queue(Box::new(WorkTask::new(handler, computation)));
        event_loop.run_until_idle().await;

        let worker = worker_thread.lock().unwrap().unwrap();
        assert_ne!(worker, thread::current().id());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn panicking_computation_is_reported_once() {
        let mut event_loop = EventLoop::new();
        let (handler, calls) = recording_handler();

        let computation = from_fn(|| -> Result<HostValue, TaskError> { panic!("overflow") });
        event_loop
            .dispatcher()
            .queue(Box::new(WorkTask::new(handler, computation)));
        event_loop.run_until_idle().await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let err = calls[0].0.as_ref().unwrap();
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(err.message().contains("overflow"));
        assert!(calls[0].1.is_none());
    }

    #[tokio::test]
    async fn closed_loop_fails_work_with_infrastructure_error() {
        let mut event_loop = EventLoop::new();
        let (handler, calls) = recording_handler();
        event_loop.close();

        event_loop
            .dispatcher()
            .queue(Box::new(WorkTask::new(handler, Sum::new(1.0, 1.0))));
        event_loop.run_until_idle().await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.as_ref().map(TaskError::kind), Some(ErrorKind::Infrastructure));
        assert!(calls[0].1.is_none());
    }

    #[tokio::test]
    async fn closed_loop_still_delivers_stored_error() {
        let mut event_loop = EventLoop::new();
        let (handler, calls) = recording_handler();
        event_loop.close();

        let stored = TaskError::type_error("Invalid argument count");
        event_loop
            .dispatcher()
            .queue(Box::new(ErrorTask::new(handler, stored.clone())));
        event_loop.run_until_idle().await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Some(stored));
    }

    #[tokio::test]
    async fn handlers_can_queue_more_work() {
        let mut event_loop = EventLoop::new();
        let dispatcher = event_loop.dispatcher();
        let (inner, calls) = recording_handler();

        let outer = CompletionHandler::new(move |_, _, value| {
            let n = value.and_then(|v| v.as_number()).unwrap_or_default();
            dispatcher.queue(Box::new(WorkTask::new(inner.clone(), Sum::new(n, 10.0))));
        });
        event_loop
            .dispatcher()
            .queue(Box::new(WorkTask::new(outer, Sum::new(1.0, 2.0))));

        let delivered = event_loop.run_until_idle().await;
        assert_eq!(delivered, 2);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, Some(HostValue::Number(13.0)));
    }

    #[tokio::test]
    async fn idle_loop_returns_immediately() {
        let mut event_loop = EventLoop::default();
        assert_eq!(event_loop.run_until_idle().await, 0);
    }

    #[test]
    fn panicking_handler_does_not_leave_task_pending() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let mut event_loop = EventLoop::new();
        let handler = CompletionHandler::new(|_, _, _| panic!("handler threw"));

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            rt.block_on(async {
                event_loop
                    .dispatcher()
                    .queue(Box::new(WorkTask::new(handler, Sum::new(1.0, 2.0))));
                event_loop.run_until_idle().await
            })
        }));
        assert!(result.is_err());
        assert_eq!(event_loop.pending(), 0);

        // the loop is still usable afterwards
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let (handler, calls) = recording_handler();
        let delivered = rt.block_on(async {
            event_loop
                .dispatcher()
                .queue(Box::new(WorkTask::new(handler, Sum::new(3.0, 4.0))));
            event_loop.run_until_idle().await
        });
        assert_eq!(delivered, 1);
        assert_eq!(calls.lock().unwrap()[0].1, Some(HostValue::Number(7.0)));
    }

    #[tokio::test]
    async fn queue_outside_runtime_fails_with_infrastructure_error() {
        let mut event_loop = EventLoop::new();
        let dispatcher = event_loop.dispatcher();
        let (handler, calls) = recording_handler();

        thread::spawn(move || {
            dispatcher.queue(Box::new(WorkTask::new(handler, Sum::new(1.0, 1.0))));
        })
        .join()
        .unwrap();
        assert_eq!(event_loop.pending(), 1);

        let delivered = event_loop.run_until_idle().await;
        assert_eq!(delivered, 1);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.as_ref().map(TaskError::kind), Some(ErrorKind::Infrastructure));
        assert!(calls[0].1.is_none());
    }

    #[test]
    fn task_dropped_by_runtime_shutdown_still_completes() {
        let mut event_loop = EventLoop::new();
        let (handler, calls) = recording_handler();

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let handle = rt.handle().clone();
        rt.shutdown_background();
        {
            let _entered = handle.enter();
            event_loop
                .dispatcher()
                .queue(Box::new(WorkTask::new(handler, Sum::new(1.0, 1.0))));
        }

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let delivered = rt.block_on(event_loop.run_until_idle());
        assert_eq!(delivered, 1);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.as_ref().map(TaskError::kind), Some(ErrorKind::Infrastructure));
        assert!(calls[0].1.is_none());
    }
}
