use std::collections::{HashMap, HashSet};

use super::core::StoreError;

/// 传输层返回的原始结果
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Nil,
    Integer(i64),
    Text(String),
    Array(Vec<Reply>),
}

impl Reply {
    /// 将标量结果转为可选文本，`Nil` 映射为 `None`
    pub fn into_optional_text(self) -> Result<Option<String>, StoreError> {
        match self {
            Reply::Nil => Ok(None),
            Reply::Text(s) => Ok(Some(s)),
            Reply::Integer(n) => Ok(Some(n.to_string())),
            other => Err(unexpected("text", &other)),
        }
    }

    pub fn into_integer(self) -> Result<i64, StoreError> {
        match self {
            Reply::Integer(n) => Ok(n),
            Reply::Nil => Ok(0),
            Reply::Text(s) => s
                .parse::<i64>()
                .map_err(|_| StoreError::UnexpectedReply(format!("expected integer, got {:?}", s))),
            other => Err(unexpected("integer", &other)),
        }
    }

    /// 列表结果，`Nil` 视为空列表
    pub fn into_text_list(self) -> Result<Vec<String>, StoreError> {
        match self {
            Reply::Nil => Ok(Vec::new()),
            Reply::Array(items) => items
                .into_iter()
                .map(|item| {
                    item.into_optional_text()?
                        .ok_or_else(|| StoreError::UnexpectedReply("nil list element".to_string()))
                })
                .collect(),
            other => Err(unexpected("array", &other)),
        }
    }

    pub fn into_text_set(self) -> Result<HashSet<String>, StoreError> {
        Ok(self.into_text_list()?.into_iter().collect())
    }

    /// HGETALL 的扁平结果 `[field, value, field, value, ...]` 转为映射
    pub fn into_hash(self) -> Result<HashMap<String, String>, StoreError> {
        let items = self.into_text_list()?;
        if items.len() % 2 != 0 {
            return Err(StoreError::UnexpectedReply(format!(
                "hash reply has odd length {}",
                items.len()
            )));
        }

        let mut map = HashMap::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            map.insert(field, value);
        }
        Ok(map)
    }

    /// 确认简单应答（如 SET 返回的 OK）
    pub fn into_ack(self) -> Result<(), StoreError> {
        match self {
            Reply::Text(_) | Reply::Integer(_) => Ok(()),
            other => Err(unexpected("acknowledgement", &other)),
        }
    }
}

fn unexpected(expected: &str, got: &Reply) -> StoreError {
    StoreError::UnexpectedReply(format!("expected {}, got {:?}", expected, got))
}
