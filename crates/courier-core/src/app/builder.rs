//! ModuleBuilder - export の登録と起動時検証
//!
//! # Fail-fast 設計
//! - expect_exports() で期待される名前を登録
//! - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
//! - 不足があれば RegistryError::MissingExports を返す

use std::sync::Arc;

use super::entry;
use super::exports::{EntryPoint, Exports};
use crate::dispatch::Dispatcher;
use crate::domain::{HostValue, RegistryError};

/// Name under which the sum entry point is exported.
pub const ADD: &str = "add";

/// # 使用例
/// ```ignore
/// let module = ModuleBuilder::new()
///     .export("add", add)?
///     .expect_exports(&["add"])
///     .build()?;
/// ```
pub struct ModuleBuilder {
    exports: Exports,
    expected: Option<Vec<String>>,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self {
            exports: Exports::new(),
            expected: None,
        }
    }

    pub fn export<E: EntryPoint + 'static>(
        mut self,
        name: &str,
        entry: E,
    ) -> Result<Self, RegistryError> {
        self.exports.register(name, Arc::new(entry))?;
        Ok(self)
    }

    pub fn expect_exports(mut self, names: &[&str]) -> Self {
        self.expected = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<Module, RegistryError> {
        if let Some(expected) = &self.expected {
            let registered = self.exports.names();
            let missing: Vec<String> = expected
                .iter()
                .filter(|name| !registered.contains(name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(RegistryError::MissingExports(missing));
            }
        }
        Ok(Module {
            exports: self.exports,
        })
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built set of exports.
pub struct Module {
    exports: Exports,
}

impl Module {
    pub fn exports(&self) -> &Exports {
        &self.exports
    }

    pub fn call(
        &self,
        name: &str,
        dispatcher: &Dispatcher,
        args: &[HostValue],
    ) -> Result<(), RegistryError> {
        self.exports.call(name, dispatcher, args)
    }
}

/// The module exporting `add`.
pub fn default_module() -> Result<Module, RegistryError> {
    ModuleBuilder::new()
        .export(ADD, entry::add)?
        .expect_exports(&[ADD])
        .build()
}
