//! 批量读写的流水线构建
//!
//! 读取：`ReadPlan` 为每个输入位置记录其命令在扁平结果中的下标，
//! `None` 形状不占用命令槽位，执行后按该映射还原输入顺序。
//!
//! 写入：所有操作先整体翻译为命令，任一操作非法则整批拒绝，
//! 不会产生部分流水线。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::command::Command;
use super::core::StoreError;
use super::key::Key;
use super::reply::Reply;
use super::value::{StoreValue, Value};

/// 批量读取时期望的值形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadShape {
    None,
    String,
    Set,
    Hash,
}

impl ReadShape {
    fn command(self, key: Key) -> Option<Command> {
        match self {
            ReadShape::None => None,
            ReadShape::String => Some(Command::Get { key }),
            ReadShape::Set => Some(Command::SMembers { key }),
            ReadShape::Hash => Some(Command::HGetAll { key }),
        }
    }

    fn decode(self, reply: Reply) -> Result<Option<StoreValue>, StoreError> {
        match self {
            ReadShape::None => Ok(None),
            ReadShape::String => Ok(reply.into_optional_text()?.map(StoreValue::String)),
            ReadShape::Set => Ok(Some(StoreValue::Set(reply.into_text_set()?))),
            ReadShape::Hash => Ok(Some(StoreValue::Hash(reply.into_hash()?))),
        }
    }
}

/// 批量读取计划
#[derive(Debug, Clone, PartialEq)]
pub struct ReadPlan {
    commands: Vec<Command>,
    /// 每个输入位置对应 (命令下标, 形状)，`None` 表示跳过
    slots: Vec<Option<(usize, ReadShape)>>,
}

impl ReadPlan {
    /// 根据键与形状构建计划，两者长度必须一致
    pub fn build(keys: &[Key], shapes: &[ReadShape]) -> Result<Self, StoreError> {
        if keys.len() != shapes.len() {
            return Err(StoreError::InvalidOperation(format!(
                "keys and shapes length mismatch: {} != {}",
                keys.len(),
                shapes.len()
            )));
        }

        let mut commands = Vec::with_capacity(keys.len());
        let mut slots = Vec::with_capacity(keys.len());
        for (key, shape) in keys.iter().zip(shapes.iter().copied()) {
            match shape.command(key.clone()) {
                Some(command) => {
                    slots.push(Some((commands.len(), shape)));
                    commands.push(command);
                }
                None => slots.push(None),
            }
        }

        Ok(Self { commands, slots })
    }

    /// 需要发送的命令（不含跳过的位置）
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> (Vec<Command>, ReadMapping) {
        (self.commands, ReadMapping { slots: self.slots })
    }

    /// 输入长度
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// 命令发出后保留的位置映射，用于还原结果顺序
#[derive(Debug, Clone, PartialEq)]
pub struct ReadMapping {
    slots: Vec<Option<(usize, ReadShape)>>,
}

impl ReadMapping {
    /// 按输入顺序还原结果，输出长度恒等于输入长度
    pub fn assemble(self, replies: Vec<Reply>) -> Result<Vec<Option<StoreValue>>, StoreError> {
        let mut replies: Vec<Option<Reply>> = replies.into_iter().map(Some).collect();
        self.slots
            .into_iter()
            .map(|slot| match slot {
                None => Ok(None),
                Some((index, shape)) => {
                    let reply = replies.get_mut(index).and_then(Option::take).ok_or_else(|| {
                        StoreError::UnexpectedReply(format!("missing pipeline result {}", index))
                    })?;
                    shape.decode(reply)
                }
            })
            .collect()
    }
}

/// 批量写入操作
///
/// 以 `type` 字段区分形状，可直接从 JSON 反序列化：
/// ```
/// use storekit::kv::WriteOp;
///
/// let op: WriteOp = serde_json::from_str(
///     r#"{"type": "hashField", "key_parts": ["items", "1"], "field": "name", "data": "foo"}"#,
/// ).unwrap();
/// assert!(matches!(op, WriteOp::HashField { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WriteOp {
    Hash {
        key_parts: Vec<String>,
        data: HashMap<String, Value>,
    },
    HashField {
        key_parts: Vec<String>,
        #[serde(default)]
        field: Option<String>,
        data: Value,
    },
    Set {
        key_parts: Vec<String>,
        data: Vec<Value>,
    },
    String {
        key_parts: Vec<String>,
        data: Value,
    },
}

impl WriteOp {
    pub fn hash<S: AsRef<str>>(key_parts: &[S], data: HashMap<String, Value>) -> Self {
        WriteOp::Hash { key_parts: to_owned_parts(key_parts), data }
    }

    pub fn hash_field<S: AsRef<str>>(
        key_parts: &[S],
        field: impl Into<String>,
        data: impl Into<Value>,
    ) -> Self {
        WriteOp::HashField {
            key_parts: to_owned_parts(key_parts),
            field: Some(field.into()),
            data: data.into(),
        }
    }

    pub fn set<S: AsRef<str>, V: Into<Value>>(key_parts: &[S], data: Vec<V>) -> Self {
        WriteOp::Set {
            key_parts: to_owned_parts(key_parts),
            data: data.into_iter().map(Into::into).collect(),
        }
    }

    pub fn string<S: AsRef<str>>(key_parts: &[S], data: impl Into<Value>) -> Self {
        WriteOp::String { key_parts: to_owned_parts(key_parts), data: data.into() }
    }

    /// 翻译为单条命令，非法操作返回 `InvalidOperation`
    pub fn to_command(&self) -> Result<Command, StoreError> {
        match self {
            WriteOp::Hash { key_parts, data } => {
                if data.is_empty() {
                    return Err(StoreError::InvalidOperation(
                        "At least one field is required for hash operations".to_string(),
                    ));
                }
                Ok(Command::HSet {
                    key: Key::build(key_parts.as_slice()),
                    fields: sorted_fields(data),
                })
            }
            WriteOp::HashField { key_parts, field, data } => {
                let field = field.as_ref().ok_or_else(|| {
                    StoreError::InvalidOperation(
                        "Field is required for hashField operations".to_string(),
                    )
                })?;
                Ok(Command::HSet {
                    key: Key::build(key_parts.as_slice()),
                    fields: vec![(field.clone(), data.clone())],
                })
            }
            WriteOp::Set { key_parts, data } => {
                if data.is_empty() {
                    return Err(StoreError::InvalidOperation(
                        "At least one member is required for set operations".to_string(),
                    ));
                }
                Ok(Command::SAdd { key: Key::build(key_parts.as_slice()), members: data.clone() })
            }
            WriteOp::String { key_parts, data } => Ok(Command::Set {
                key: Key::build(key_parts.as_slice()),
                value: data.clone(),
            }),
        }
    }
}

/// 将全部写操作翻译为命令，任一失败则整批失败
pub fn build_write_commands(ops: &[WriteOp]) -> Result<Vec<Command>, StoreError> {
    ops.iter().map(WriteOp::to_command).collect()
}

/// 按字段名排序，保证生成的命令稳定
pub(crate) fn sorted_fields(data: &HashMap<String, Value>) -> Vec<(String, Value)> {
    let mut fields: Vec<(String, Value)> =
        data.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
}

fn to_owned_parts<S: AsRef<str>>(parts: &[S]) -> Vec<String> {
    parts.iter().map(|p| p.as_ref().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Reply {
        Reply::Text(s.to_string())
    }

    #[test]
    fn test_read_plan_skips_none() {
        let keys = vec![Key::raw("k1"), Key::raw("k2"), Key::raw("k3")];
        let shapes = vec![ReadShape::String, ReadShape::None, ReadShape::Hash];
        let plan = ReadPlan::build(&keys, &shapes).unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.commands(),
            &[Command::Get { key: Key::raw("k1") }, Command::HGetAll { key: Key::raw("k3") }]
        );
    }

    #[test]
    fn test_read_plan_length_mismatch() {
        let result = ReadPlan::build(&[Key::raw("a")], &[]);
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));
    }

    #[test]
    fn test_assemble_restores_input_order() {
        let keys = vec![Key::raw("k1"), Key::raw("k2"), Key::raw("k3"), Key::raw("k4")];
        let shapes = vec![ReadShape::None, ReadShape::Set, ReadShape::None, ReadShape::String];
        let (commands, mapping) = ReadPlan::build(&keys, &shapes).unwrap().into_commands();
        assert_eq!(commands.len(), 2);

        let replies = vec![Reply::Array(vec![text("m")]), text("v")];
        let results = mapping.assemble(replies).unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0], None);
        assert_eq!(results[1].as_ref().and_then(|v| v.as_set()).map(|s| s.len()), Some(1));
        assert_eq!(results[2], None);
        assert_eq!(results[3], Some(StoreValue::String("v".to_string())));
    }

    #[test]
    fn test_assemble_all_none() {
        let keys = vec![Key::raw("a"), Key::raw("b")];
        let shapes = vec![ReadShape::None, ReadShape::None];
        let (commands, mapping) = ReadPlan::build(&keys, &shapes).unwrap().into_commands();
        assert!(commands.is_empty());
        assert_eq!(mapping.assemble(vec![]).unwrap(), vec![None, None]);
    }

    #[test]
    fn test_assemble_missing_reply() {
        let (_, mapping) = ReadPlan::build(&[Key::raw("a")], &[ReadShape::String])
            .unwrap()
            .into_commands();
        assert!(matches!(mapping.assemble(vec![]), Err(StoreError::UnexpectedReply(_))));
    }

    #[test]
    fn test_build_write_commands_in_order() {
        let ops = vec![
            WriteOp::string(&["s"], "v"),
            WriteOp::hash_field(&["h"], "f", 1),
            WriteOp::set(&["set"], vec!["a", "b"]),
        ];
        let commands = build_write_commands(&ops).unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].name(), "SET");
        assert_eq!(commands[1].to_command_line(), vec!["HSET", "h", "f", "1"]);
        assert_eq!(commands[2].to_command_line(), vec!["SADD", "set", "a", "b"]);
    }

    #[test]
    fn test_build_write_commands_rejects_missing_field() {
        let ops = vec![
            WriteOp::string(&["s"], "v"),
            WriteOp::HashField { key_parts: vec!["h".to_string()], field: None, data: Value::from(1) },
        ];
        let result = build_write_commands(&ops);
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));
    }

    #[test]
    fn test_build_write_commands_rejects_empty_set() {
        let ops = vec![WriteOp::set::<&str, Value>(&["s"], vec![])];
        assert!(matches!(build_write_commands(&ops), Err(StoreError::InvalidOperation(_))));
    }

    #[test]
    fn test_build_write_commands_rejects_empty_hash() {
        let ops = vec![
            WriteOp::string(&["a"], "1"),
            WriteOp::hash(&["h"], HashMap::new()),
        ];
        assert!(matches!(
            build_write_commands(&ops),
            Err(StoreError::InvalidOperation(msg)) if msg.contains("hash")
        ));
    }

    #[test]
    fn test_write_op_deserialize_without_field() {
        let op: WriteOp = serde_json::from_str(
            r#"{"type": "hashField", "key_parts": ["items", "1"], "data": "foo"}"#,
        )
        .unwrap();
        assert!(matches!(op, WriteOp::HashField { field: None, .. }));
        assert!(op.to_command().is_err());
    }

    #[test]
    fn test_hash_fields_sorted() {
        let mut data = HashMap::new();
        data.insert("b".to_string(), Value::from("2"));
        data.insert("a".to_string(), Value::from("1"));
        let command = WriteOp::hash(&["h"], data).to_command().unwrap();
        assert_eq!(command.to_command_line(), vec!["HSET", "h", "a", "1", "b", "2"]);
    }
}
