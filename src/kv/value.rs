use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// 写入存储的载荷值
///
/// 取代动态类型的载荷：文本、整数、浮点、布尔或空值，
/// 发送前统一渲染为文本参数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// 是否为假值：空值、空字符串、0、NaN、false
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Integer(n) => *n == 0,
            Value::Float(f) => *f == 0.0 || f.is_nan(),
            Value::Text(s) => s.is_empty(),
        }
    }

    /// 渲染为命令参数
    pub fn to_arg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// 去掉假值，保持原有顺序
pub(crate) fn retain_truthy<I, V>(values: I) -> Vec<Value>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    values
        .into_iter()
        .map(Into::into)
        .filter(|v: &Value| !v.is_falsy())
        .collect()
}

/// 批量读取返回的类型化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreValue {
    String(String),
    Set(HashSet<String>),
    Hash(HashMap<String, String>),
}

impl StoreValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            StoreValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&HashSet<String>> {
        match self {
            StoreValue::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashMap<String, String>> {
        match self {
            StoreValue::Hash(h) => Some(h),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_falsy() {
        assert!(Value::Null.is_falsy());
        assert!(Value::from("").is_falsy());
        assert!(Value::from(0).is_falsy());
        assert!(Value::from(0.0).is_falsy());
        assert!(Value::from(f64::NAN).is_falsy());
        assert!(Value::from(false).is_falsy());
        assert!(Value::from(None::<String>).is_falsy());

        assert!(!Value::from("a").is_falsy());
        assert!(!Value::from(-1).is_falsy());
        assert!(!Value::from(0.5).is_falsy());
        assert!(!Value::from(true).is_falsy());
        assert!(!Value::from("0").is_falsy());
    }

    #[test]
    fn test_to_arg() {
        assert_eq!(Value::from("foo").to_arg(), "foo");
        assert_eq!(Value::from(42).to_arg(), "42");
        assert_eq!(Value::from(1.5).to_arg(), "1.5");
        assert_eq!(Value::from(2.0).to_arg(), "2");
        assert_eq!(Value::from(true).to_arg(), "true");
        assert_eq!(Value::Null.to_arg(), "null");
    }

    #[test]
    fn test_retain_truthy_keeps_order() {
        let values = vec![
            Value::from("b"),
            Value::Null,
            Value::from(""),
            Value::from("a"),
            Value::from(0),
            Value::from(7),
        ];
        assert_eq!(
            retain_truthy(values),
            vec![Value::from("b"), Value::from("a"), Value::from(7)]
        );
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"["x", 3, 2.5, true, null]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::from("x"),
                Value::from(3),
                Value::from(2.5),
                Value::from(true),
                Value::Null
            ]
        );
    }

    #[test]
    fn test_store_value_accessors() {
        let v = StoreValue::String("bar".to_string());
        assert_eq!(v.as_string(), Some("bar"));
        assert!(v.as_set().is_none());
        assert!(v.as_hash().is_none());
    }
}
