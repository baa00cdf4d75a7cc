use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use serde::Serialize;
use serde::Serializer;

/// Ordered member mapping of a struct value. Names are unique.
pub type Struct = IndexMap<String, RpcValue>;

/// A value carried by an XML-RPC message.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcValue {
    String(String),
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    /// Encodes to an empty text node and therefore decodes as `String("")`.
    Null,
    List(Vec<RpcValue>),
    Struct(Struct),
}

/// Fault reported by the service in place of a result.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub code: i64,
    pub message: String,
}

impl RpcValue {
    pub fn string(text: impl Into<String>) -> Self {
        RpcValue::String(text.into())
    }

    pub fn empty_struct() -> Self {
        RpcValue::Struct(Struct::new())
    }

    /// Builds the `faultCode`/`faultString` struct a service returns on failure.
    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        let mut members = Struct::new();
        members.insert("faultCode".to_string(), RpcValue::Number(code as f64));
        members.insert("faultString".to_string(), RpcValue::String(message.into()));
        RpcValue::Struct(members)
    }

    /// Upper-case type tag used by the shell when describing values.
    pub fn type_name(&self) -> &'static str {
        match self {
            RpcValue::String(_) => "STRING",
            RpcValue::Number(_) => "NUMBER",
            RpcValue::Boolean(_) => "BOOLEAN",
            RpcValue::DateTime(_) => "DATE",
            RpcValue::Null => "NULL",
            RpcValue::List(_) => "ARRAY",
            RpcValue::Struct(_) => "OBJECT",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RpcValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RpcValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RpcValue]> {
        match self {
            RpcValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            RpcValue::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Looks up a struct member by name.
    pub fn get(&self, name: &str) -> Option<&RpcValue> {
        self.as_struct().and_then(|members| members.get(name))
    }

    /// Returns list element `index`.
    pub fn at(&self, index: usize) -> Option<&RpcValue> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Returns the fault carried by this value, if it is a fault struct.
    pub fn as_fault(&self) -> Option<Fault> {
        let code = self.get("faultCode")?;
        let message = self.get("faultString")?;
        let code = match code {
            RpcValue::Number(n) => *n as i64,
            RpcValue::String(s) => s.trim().parse().unwrap_or_default(),
            _ => 0,
        };
        let message = match message {
            RpcValue::String(s) => s.clone(),
            other => other.show(),
        };
        Some(Fault { code, message })
    }

    /// Renders the value on a single line for shell output.
    pub fn show(&self) -> String {
        self.to_string()
    }
}

pub(crate) fn format_number(n: f64) -> String {
    // f64 Display is shortest round-trip and never uses exponent notation.
    format!("{}", n)
}

impl fmt::Display for RpcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcValue::String(s) => f.write_str(s),
            RpcValue::Number(n) => f.write_str(&format_number(*n)),
            RpcValue::Boolean(b) => write!(f, "{}", b),
            RpcValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            RpcValue::Null => f.write_str("null"),
            RpcValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            RpcValue::Struct(members) => {
                f.write_str("{")?;
                for (i, (name, value)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for RpcValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RpcValue::String(s) => serializer.serialize_str(s),
            RpcValue::Number(n) => match self.as_i64() {
                Some(i) if n.abs() < 9.0e15 => serializer.serialize_i64(i),
                _ => serializer.serialize_f64(*n),
            },
            RpcValue::Boolean(b) => serializer.serialize_bool(*b),
            RpcValue::DateTime(dt) => {
                serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            RpcValue::Null => serializer.serialize_unit(),
            RpcValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            RpcValue::Struct(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (name, value) in members {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<&str> for RpcValue {
    fn from(value: &str) -> Self {
        RpcValue::String(value.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(value: String) -> Self {
        RpcValue::String(value)
    }
}

impl From<f64> for RpcValue {
    fn from(value: f64) -> Self {
        RpcValue::Number(value)
    }
}

impl From<i64> for RpcValue {
    fn from(value: i64) -> Self {
        RpcValue::Number(value as f64)
    }
}

impl From<i32> for RpcValue {
    fn from(value: i32) -> Self {
        RpcValue::Number(f64::from(value))
    }
}

impl From<bool> for RpcValue {
    fn from(value: bool) -> Self {
        RpcValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for RpcValue {
    fn from(value: NaiveDateTime) -> Self {
        RpcValue::DateTime(value)
    }
}

impl<T: Into<RpcValue>> From<Vec<T>> for RpcValue {
    fn from(values: Vec<T>) -> Self {
        RpcValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Struct> for RpcValue {
    fn from(members: Struct) -> Self {
        RpcValue::Struct(members)
    }
}

impl<K: Into<String>> FromIterator<(K, RpcValue)> for RpcValue {
    fn from_iter<I: IntoIterator<Item = (K, RpcValue)>>(iter: I) -> Self {
        RpcValue::Struct(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
