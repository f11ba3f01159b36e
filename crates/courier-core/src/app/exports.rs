//! Exports - 名前 → entry point の登録表
//!
//! 初期化時に組み立て（mutable）、実行時は読み取りのみ（immutable）。
//! ロック不要でシンプルに保つ。

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::domain::{HostValue, RegistryError, TaskError};

/// A host-callable function.
///
/// Returns `Err` only for synchronous rejection; everything else is reported
/// through tasks queued on `dispatcher`.
pub trait EntryPoint: Send + Sync {
    fn call(&self, dispatcher: &Dispatcher, args: &[HostValue]) -> Result<(), TaskError>;
}

impl<F> EntryPoint for F
where
    F: Fn(&Dispatcher, &[HostValue]) -> Result<(), TaskError> + Send + Sync,
{
    fn call(&self, dispatcher: &Dispatcher, args: &[HostValue]) -> Result<(), TaskError> {
        self(dispatcher, args)
    }
}

#[derive(Default)]
pub struct Exports {
    entries: HashMap<String, Arc<dyn EntryPoint>>,
}

impl Exports {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        entry: Arc<dyn EntryPoint>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateExport(name));
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn EntryPoint>> {
        self.entries.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn call(
        &self,
        name: &str,
        dispatcher: &Dispatcher,
        args: &[HostValue],
    ) -> Result<(), RegistryError> {
        let entry = self
            .get(name)
            .ok_or_else(|| RegistryError::ExportNotFound(name.to_string()))?;
        entry.call(dispatcher, args)?;
        Ok(())
    }
}
