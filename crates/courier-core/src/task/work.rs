//! WorkTask - Computation を包んで worker 上で実行する task

use tracing::trace;

use super::AsyncTask;
use crate::domain::{CompletionHandler, HostValue, TaskError};

/// Pluggable payload computation run by a [`WorkTask`].
///
/// Runs purely from captured inputs on the worker context.
pub trait Computation: Send + 'static {
    fn compute(&mut self) -> Result<HostValue, TaskError>;
}

/// Adapter that turns a closure into a [`Computation`].
pub struct FromFn<F>(F);

pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut() -> Result<HostValue, TaskError> + Send + 'static,
{
    FromFn(f)
}

impl<F> Computation for FromFn<F>
where
    F: FnMut() -> Result<HostValue, TaskError> + Send + 'static,
{
    fn compute(&mut self) -> Result<HostValue, TaskError> {
        (self.0)()
    }
}

pub struct WorkTask<C: Computation> {
    handler: CompletionHandler,
    computation: C,
    result: Option<HostValue>,
}

impl<C: Computation> WorkTask<C> {
    pub fn new(handler: CompletionHandler, computation: C) -> Self {
        Self {
            handler,
            computation,
            result: None,
        }
    }

    pub fn result(&self) -> Option<&HostValue> {
        self.result.as_ref()
    }
}

impl<C: Computation> AsyncTask for WorkTask<C> {
    fn name(&self) -> &'static str {
        "work"
    }

    fn execute(&mut self) -> Result<(), TaskError> {
        let value = self.computation.compute()?;
        trace!(%value, "computation finished");
        self.result = Some(value);
        Ok(())
    }

    fn on_ok(self: Box<Self>) {
        let this = *self;
        match this.result {
            Some(value) => this.handler.call(None, Some(value)),
            // on_ok は execute 成功後にしか呼ばれない
            None => this
                .handler
                .call(Some(TaskError::execution("no result was produced")), None),
        }
    }

    fn on_error(self: Box<Self>, error: TaskError) {
        self.handler.call(Some(error), None);
    }
}
