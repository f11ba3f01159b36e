//! HostValue - 境界をまたぐ値の表現
//!
//! entry point が受け取る引数と、callback に渡す値。
//! オブジェクトモデルは持たないので、JSON の配列・オブジェクトは文字列として運ぶ。

use std::fmt;

use super::handler::CompletionHandler;

#[derive(Debug, Clone, Default)]
pub enum HostValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Function(CompletionHandler),
}

impl HostValue {
    pub fn is_number(&self) -> bool {
        matches!(self, HostValue::Number(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, HostValue::Function(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&CompletionHandler> {
        match self {
            HostValue::Function(handler) => Some(handler),
            _ => None,
        }
    }

    /// Host-style type name, e.g. `"number"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "object",
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Function(_) => "function",
        }
    }
}

// NaN != NaN のまま（IEEE-754 の比較に従う）
impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HostValue::Undefined, HostValue::Undefined) => true,
            (HostValue::Null, HostValue::Null) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Number(a), HostValue::Number(b)) => a == b,
            (HostValue::String(a), HostValue::String(b)) => a == b,
            (HostValue::Function(a), HostValue::Function(b)) => a.same_callback(b),
            _ => false,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => f.write_str("undefined"),
            HostValue::Null => f.write_str("null"),
            HostValue::Bool(b) => fmt::Display::fmt(b, f),
            HostValue::Number(n) if n.is_nan() => f.write_str("NaN"),
            HostValue::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            HostValue::Number(n) => fmt::Display::fmt(n, f),
            HostValue::String(s) => f.write_str(s),
            HostValue::Function(_) => f.write_str("[Function]"),
        }
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl From<CompletionHandler> for HostValue {
    fn from(handler: CompletionHandler) -> Self {
        HostValue::Function(handler)
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(b) => HostValue::Bool(b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(HostValue::Number)
                .unwrap_or(HostValue::Undefined),
            serde_json::Value::String(s) => HostValue::String(s),
            other => HostValue::String(other.to_string()),
        }
    }
}
