//! ErrorTask - 保持している error を非同期に届けるだけの task
//!
//! `execute()` は何もしない。dispatcher がどちらの経路（on_ok / on_error）を
//! 選んでも、callback には保持している error が渡される。
//! 「開始前に失敗した」と「実行中に失敗した」を呼び出し側で区別させないため。

use tracing::warn;

use super::AsyncTask;
use crate::domain::{CompletionHandler, TaskError};

pub struct ErrorTask {
    handler: CompletionHandler,
    error: TaskError,
}

impl ErrorTask {
    pub fn new(handler: CompletionHandler, error: TaskError) -> Self {
        Self { handler, error }
    }

    pub fn error(&self) -> &TaskError {
        &self.error
    }
}

impl AsyncTask for ErrorTask {
    fn name(&self) -> &'static str {
        "error"
    }

    fn execute(&mut self) -> Result<(), TaskError> {
        Ok(())
    }

    fn on_ok(self: Box<Self>) {
        let this = *self;
        this.handler.call(Some(this.error), None);
    }

    fn on_error(self: Box<Self>, error: TaskError) {
        // dispatcher 側の失敗はログにだけ残し、保持している error を届ける
        let this = *self;
        warn!(%error, stored = %this.error, "error task failed to run; delivering stored error");
        this.handler.call(Some(this.error), None);
    }
}
