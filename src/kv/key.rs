use std::fmt;

/// 键片段之间的分隔符
pub const KEY_DELIMITER: &str = ":";

/// 命名空间键
///
/// 由有序的字符串片段以 `:` 拼接而成，拼接结果即为键的身份。
/// 空片段会被原样保留，例如 `["a", "", "b"]` 得到 `a::b`。
///
/// # 示例
/// ```
/// use storekit::kv::Key;
///
/// let key = Key::build(&["items", "42", "basic"]);
/// assert_eq!(key.as_str(), "items:42:basic");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// 从有序片段构建键
    pub fn build<S: AsRef<str>>(parts: &[S]) -> Self {
        let joined = parts
            .iter()
            .map(|part| part.as_ref())
            .collect::<Vec<_>>()
            .join(KEY_DELIMITER);
        Self(joined)
    }

    /// 直接使用已拼接好的字符串作为键
    pub fn raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}
