use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::kv::command::Command;
use crate::kv::core::{StoreError, Transport};
use crate::kv::reply::Reply;

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

/// 内存中的单个键值
#[derive(Debug, Clone)]
enum Entry {
    String(String),
    Hash(BTreeMap<String, String>),
    Set(BTreeSet<String>),
    /// 按 (score, member) 升序保存
    SortedSet(Vec<(f64, String)>),
    List(Vec<String>),
}

/// 进程内传输实现
///
/// 在内存中实现与远端一致的命令语义（集合删空即删除键、
/// 有序集合同分按成员字典序等），并统计调用次数，便于测试
/// 验证某个操作是否真的触达了传输层。
///
/// 流水线不是事务：某条命令失败后，其余命令依旧执行，
/// 最终返回第一条失败命令对应的错误。
#[derive(Debug, Default)]
pub struct MemoryTransport {
    data: Mutex<HashMap<String, Entry>>,
    calls: AtomicUsize,
    commands: AtomicUsize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 传输层被调用的次数（单条命令与流水线各计一次）
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 已执行的命令总数
    pub fn commands_executed(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    fn apply(data: &mut HashMap<String, Entry>, command: Command) -> Result<Reply, String> {
        if missing_arguments(&command) {
            return Err(format!(
                "ERR wrong number of arguments for '{}' command",
                command.name().to_ascii_lowercase()
            ));
        }

        let key = command.key().to_string();
        match command {
            Command::Get { .. } => match data.get(&key) {
                None => Ok(Reply::Nil),
                Some(Entry::String(s)) => Ok(Reply::Text(s.clone())),
                Some(_) => Err(WRONG_TYPE.to_string()),
            },
            Command::Set { value, .. } => {
                data.insert(key, Entry::String(value.to_arg()));
                Ok(Reply::Text("OK".to_string()))
            }
            Command::HSet { fields, .. } => {
                let hash = match data.entry(key).or_insert_with(|| Entry::Hash(BTreeMap::new())) {
                    Entry::Hash(hash) => hash,
                    _ => return Err(WRONG_TYPE.to_string()),
                };
                let mut added = 0;
                for (field, value) in fields {
                    if hash.insert(field, value.to_arg()).is_none() {
                        added += 1;
                    }
                }
                Ok(Reply::Integer(added))
            }
            Command::HGet { field, .. } => match data.get(&key) {
                None => Ok(Reply::Nil),
                Some(Entry::Hash(hash)) => {
                    Ok(hash.get(&field).cloned().map_or(Reply::Nil, Reply::Text))
                }
                Some(_) => Err(WRONG_TYPE.to_string()),
            },
            Command::HGetAll { .. } => match data.get(&key) {
                None => Ok(Reply::Array(Vec::new())),
                Some(Entry::Hash(hash)) => Ok(Reply::Array(
                    hash.iter()
                        .flat_map(|(f, v)| [Reply::Text(f.clone()), Reply::Text(v.clone())])
                        .collect(),
                )),
                Some(_) => Err(WRONG_TYPE.to_string()),
            },
            Command::SAdd { members, .. } => {
                let set = match data.entry(key).or_insert_with(|| Entry::Set(BTreeSet::new())) {
                    Entry::Set(set) => set,
                    _ => return Err(WRONG_TYPE.to_string()),
                };
                let added = members.iter().filter(|m| set.insert(m.to_arg())).count();
                Ok(Reply::Integer(added as i64))
            }
            Command::SRem { members, .. } => {
                let (removed, now_empty) = match data.get_mut(&key) {
                    None => return Ok(Reply::Integer(0)),
                    Some(Entry::Set(set)) => {
                        let removed = members.iter().filter(|m| set.remove(&m.to_arg())).count();
                        (removed, set.is_empty())
                    }
                    Some(_) => return Err(WRONG_TYPE.to_string()),
                };
                if now_empty {
                    data.remove(&key);
                }
                Ok(Reply::Integer(removed as i64))
            }
            Command::SMembers { .. } => match data.get(&key) {
                None => Ok(Reply::Array(Vec::new())),
                Some(Entry::Set(set)) => {
                    Ok(Reply::Array(set.iter().cloned().map(Reply::Text).collect()))
                }
                Some(_) => Err(WRONG_TYPE.to_string()),
            },
            Command::SCard { .. } => match data.get(&key) {
                None => Ok(Reply::Integer(0)),
                Some(Entry::Set(set)) => Ok(Reply::Integer(set.len() as i64)),
                Some(_) => Err(WRONG_TYPE.to_string()),
            },
            Command::ZAdd { score, member, .. } => {
                if score.is_nan() {
                    return Err("ERR value is not a valid float".to_string());
                }
                let zset = match data.entry(key).or_insert_with(|| Entry::SortedSet(Vec::new())) {
                    Entry::SortedSet(zset) => zset,
                    _ => return Err(WRONG_TYPE.to_string()),
                };
                let existing = zset.iter().position(|(_, m)| *m == member);
                let added = match existing {
                    Some(index) => {
                        zset.remove(index);
                        0
                    }
                    None => 1,
                };
                zset.push((score, member));
                zset.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
                Ok(Reply::Integer(added))
            }
            Command::ZRangeByScore { min, max, .. } => match data.get(&key) {
                None => Ok(Reply::Array(Vec::new())),
                Some(Entry::SortedSet(zset)) => Ok(Reply::Array(
                    zset.iter()
                        .filter(|(score, _)| *score >= min && *score <= max)
                        .map(|(_, member)| Reply::Text(member.clone()))
                        .collect(),
                )),
                Some(_) => Err(WRONG_TYPE.to_string()),
            },
            Command::LRange { start, stop, .. } => match data.get(&key) {
                None => Ok(Reply::Array(Vec::new())),
                Some(Entry::List(list)) => Ok(Reply::Array(
                    list_range(list, start, stop)
                        .iter()
                        .cloned()
                        .map(Reply::Text)
                        .collect(),
                )),
                Some(_) => Err(WRONG_TYPE.to_string()),
            },
            Command::RPush { values, .. } => {
                let list = match data.entry(key).or_insert_with(|| Entry::List(Vec::new())) {
                    Entry::List(list) => list,
                    _ => return Err(WRONG_TYPE.to_string()),
                };
                list.extend(values.iter().map(|v| v.to_arg()));
                Ok(Reply::Integer(list.len() as i64))
            }
            Command::Exists { .. } => Ok(Reply::Integer(data.contains_key(&key) as i64)),
            Command::Del { .. } => Ok(Reply::Integer(data.remove(&key).is_some() as i64)),
        }
    }
}

/// 需要至少一个字段或成员的命令缺少参数
fn missing_arguments(command: &Command) -> bool {
    match command {
        Command::HSet { fields, .. } => fields.is_empty(),
        Command::SAdd { members, .. } | Command::SRem { members, .. } => members.is_empty(),
        Command::RPush { values, .. } => values.is_empty(),
        _ => false,
    }
}

/// LRANGE 的下标语义：负数从尾部计数，越界截断，结束下标包含在内
fn list_range(list: &[String], start: i64, stop: i64) -> &[String] {
    let len = list.len() as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return &[];
    }
    &list[start as usize..=stop as usize]
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.commands.fetch_add(1, Ordering::SeqCst);

        let mut data = self
            .data
            .lock()
            .map_err(|e| StoreError::Other(format!("Failed to acquire lock: {}", e)))?;
        Self::apply(&mut data, command).map_err(StoreError::Command)
    }

    async fn execute_pipeline(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.commands.fetch_add(commands.len(), Ordering::SeqCst);

        let mut data = self
            .data
            .lock()
            .map_err(|e| StoreError::Other(format!("Failed to acquire lock: {}", e)))?;

        let mut replies = Vec::with_capacity(commands.len());
        let mut first_error = None;
        for (index, command) in commands.into_iter().enumerate() {
            match Self::apply(&mut data, command) {
                Ok(reply) => replies.push(reply),
                Err(message) => {
                    replies.push(Reply::Nil);
                    first_error.get_or_insert(StoreError::Pipeline { index, message });
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(replies),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::key::Key;
    use crate::kv::value::Value;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_list_range() {
        let l = list(&["a", "b", "c", "d"]);
        assert_eq!(list_range(&l, 0, -1), &l[..]);
        assert_eq!(list_range(&l, 1, 2), &l[1..=2]);
        assert_eq!(list_range(&l, -2, -1), &l[2..]);
        assert_eq!(list_range(&l, 0, 100), &l[..]);
        assert_eq!(list_range(&l, -100, 0), &l[..1]);
        assert!(list_range(&l, 3, 1).is_empty());
        assert!(list_range(&l, 5, 10).is_empty());
        assert!(list_range(&[], 0, -1).is_empty());
    }

    #[tokio::test]
    async fn test_execute_counts_calls() {
        let transport = MemoryTransport::new();
        transport
            .execute(Command::Set { key: Key::raw("k"), value: Value::from("v") })
            .await
            .unwrap();
        let reply = transport.execute(Command::Get { key: Key::raw("k") }).await.unwrap();

        assert_eq!(reply, Reply::Text("v".to_string()));
        assert_eq!(transport.calls(), 2);
        assert_eq!(transport.commands_executed(), 2);
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let transport = MemoryTransport::new();
        transport
            .execute(Command::Set { key: Key::raw("k"), value: Value::from("v") })
            .await
            .unwrap();
        let result = transport.execute(Command::SMembers { key: Key::raw("k") }).await;
        assert!(matches!(result, Err(StoreError::Command(msg)) if msg.starts_with("WRONGTYPE")));
    }

    #[tokio::test]
    async fn test_empty_arguments_rejected() {
        let transport = MemoryTransport::new();
        let key = Key::raw("h");

        let result = transport
            .execute(Command::HSet { key: key.clone(), fields: Vec::new() })
            .await;
        assert!(matches!(result, Err(StoreError::Command(msg)) if msg.contains("'hset'")));

        let result = transport
            .execute(Command::SAdd { key: key.clone(), members: Vec::new() })
            .await;
        assert!(matches!(result, Err(StoreError::Command(msg)) if msg.contains("'sadd'")));

        let result = transport
            .execute(Command::RPush { key: key.clone(), values: Vec::new() })
            .await;
        assert!(matches!(result, Err(StoreError::Command(_))));

        let exists = transport.execute(Command::Exists { key }).await.unwrap();
        assert_eq!(exists, Reply::Integer(0));
    }

    #[tokio::test]
    async fn test_srem_last_member_deletes_key() {
        let transport = MemoryTransport::new();
        let key = Key::raw("s");
        transport
            .execute(Command::SAdd { key: key.clone(), members: vec![Value::from("x")] })
            .await
            .unwrap();
        transport
            .execute(Command::SRem { key: key.clone(), members: vec![Value::from("x")] })
            .await
            .unwrap();
        let exists = transport.execute(Command::Exists { key }).await.unwrap();
        assert_eq!(exists, Reply::Integer(0));
    }

    #[tokio::test]
    async fn test_pipeline_is_not_atomic() {
        let transport = MemoryTransport::new();
        transport
            .execute(Command::Set { key: Key::raw("str"), value: Value::from("v") })
            .await
            .unwrap();

        let result = transport
            .execute_pipeline(vec![
                Command::SAdd { key: Key::raw("str"), members: vec![Value::from("x")] },
                Command::Set { key: Key::raw("other"), value: Value::from("w") },
            ])
            .await;
        assert!(matches!(result, Err(StoreError::Pipeline { index: 0, .. })));

        let reply = transport.execute(Command::Get { key: Key::raw("other") }).await.unwrap();
        assert_eq!(reply, Reply::Text("w".to_string()));
        assert_eq!(transport.calls(), 3);
        assert_eq!(transport.commands_executed(), 4);
    }

    #[tokio::test]
    async fn test_zadd_updates_score() {
        let transport = MemoryTransport::new();
        let key = Key::raw("z");
        let add = |score: f64, member: &str| Command::ZAdd {
            key: key.clone(),
            score,
            member: member.to_string(),
        };
        assert_eq!(transport.execute(add(1.0, "a")).await.unwrap(), Reply::Integer(1));
        assert_eq!(transport.execute(add(3.0, "b")).await.unwrap(), Reply::Integer(1));
        assert_eq!(transport.execute(add(5.0, "a")).await.unwrap(), Reply::Integer(0));

        let reply = transport
            .execute(Command::ZRangeByScore { key: key.clone(), min: 0.0, max: 10.0 })
            .await
            .unwrap();
        assert_eq!(
            reply,
            Reply::Array(vec![Reply::Text("b".to_string()), Reply::Text("a".to_string())])
        );
    }
}
