//! CompletionHandler - 呼び出し元が渡す callback + receiver
//!
//! callback は `(receiver, error, value)` で呼ばれる。
//! error と value はどちらか一方だけが `Some` になる。

use std::fmt;
use std::sync::Arc;

use super::errors::TaskError;
use super::value::HostValue;

type Callback = dyn Fn(&HostValue, Option<TaskError>, Option<HostValue>) + Send + Sync;

/// Caller-supplied completion callback together with the receiver it is
/// invoked on.
///
/// Cloning shares the same callback.
#[derive(Clone)]
pub struct CompletionHandler {
    callback: Arc<Callback>,
    receiver: Arc<HostValue>,
}

impl CompletionHandler {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&HostValue, Option<TaskError>, Option<HostValue>) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            receiver: Arc::new(HostValue::Undefined),
        }
    }

    pub fn with_receiver(mut self, receiver: HostValue) -> Self {
        self.receiver = Arc::new(receiver);
        self
    }

    pub fn receiver(&self) -> &HostValue {
        &self.receiver
    }

    /// Invoke the callback on the stored receiver.
    pub fn call(&self, error: Option<TaskError>, value: Option<HostValue>) {
        (self.callback)(&self.receiver, error, value);
    }

    pub(crate) fn same_callback(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for CompletionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandler")
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}
