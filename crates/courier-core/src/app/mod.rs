//! App - 外から呼ばれる面
//!
//! # 主要コンポーネント
//! - **entry**: `add` の引数検証と task の投入
//! - **Exports**: 名前 → entry point
//! - **ModuleBuilder**: export の登録と起動時検証

pub mod builder;
pub mod entry;
pub mod exports;

pub use self::builder::{ADD, Module, ModuleBuilder, default_module};
pub use self::entry::add;
pub use self::exports::{EntryPoint, Exports};
