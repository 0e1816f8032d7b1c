use super::key::Key;
use super::value::Value;

/// 远端命令
///
/// 每个变体对应一个远端原语，在执行时由传输层翻译为具体调用。
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Get { key: Key },
    Set { key: Key, value: Value },
    HSet { key: Key, fields: Vec<(String, Value)> },
    HGet { key: Key, field: String },
    HGetAll { key: Key },
    SAdd { key: Key, members: Vec<Value> },
    SRem { key: Key, members: Vec<Value> },
    SMembers { key: Key },
    SCard { key: Key },
    ZAdd { key: Key, score: f64, member: String },
    ZRangeByScore { key: Key, min: f64, max: f64 },
    LRange { key: Key, start: i64, stop: i64 },
    RPush { key: Key, values: Vec<Value> },
    Exists { key: Key },
    Del { key: Key },
}

impl Command {
    /// 命令名
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::HSet { .. } => "HSET",
            Command::HGet { .. } => "HGET",
            Command::HGetAll { .. } => "HGETALL",
            Command::SAdd { .. } => "SADD",
            Command::SRem { .. } => "SREM",
            Command::SMembers { .. } => "SMEMBERS",
            Command::SCard { .. } => "SCARD",
            Command::ZAdd { .. } => "ZADD",
            Command::ZRangeByScore { .. } => "ZRANGEBYSCORE",
            Command::LRange { .. } => "LRANGE",
            Command::RPush { .. } => "RPUSH",
            Command::Exists { .. } => "EXISTS",
            Command::Del { .. } => "DEL",
        }
    }

    pub fn key(&self) -> &Key {
        match self {
            Command::Get { key }
            | Command::Set { key, .. }
            | Command::HSet { key, .. }
            | Command::HGet { key, .. }
            | Command::HGetAll { key }
            | Command::SAdd { key, .. }
            | Command::SRem { key, .. }
            | Command::SMembers { key }
            | Command::SCard { key }
            | Command::ZAdd { key, .. }
            | Command::ZRangeByScore { key, .. }
            | Command::LRange { key, .. }
            | Command::RPush { key, .. }
            | Command::Exists { key }
            | Command::Del { key } => key,
        }
    }

    /// 命令参数（不含命令名），第一个参数总是键
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.key().to_string()];
        match self {
            Command::Set { value, .. } => args.push(value.to_arg()),
            Command::HSet { fields, .. } => {
                for (field, value) in fields {
                    args.push(field.clone());
                    args.push(value.to_arg());
                }
            }
            Command::HGet { field, .. } => args.push(field.clone()),
            Command::SAdd { members, .. } | Command::SRem { members, .. } => {
                args.extend(members.iter().map(Value::to_arg));
            }
            Command::RPush { values, .. } => args.extend(values.iter().map(Value::to_arg)),
            Command::ZAdd { score, member, .. } => {
                args.push(format_score(*score));
                args.push(member.clone());
            }
            Command::ZRangeByScore { min, max, .. } => {
                args.push(format_score(*min));
                args.push(format_score(*max));
            }
            Command::LRange { start, stop, .. } => {
                args.push(start.to_string());
                args.push(stop.to_string());
            }
            Command::Get { .. }
            | Command::HGetAll { .. }
            | Command::SMembers { .. }
            | Command::SCard { .. }
            | Command::Exists { .. }
            | Command::Del { .. } => {}
        }
        args
    }

    /// 完整的命令行：命令名加参数
    pub fn to_command_line(&self) -> Vec<String> {
        let mut line = vec![self.name().to_string()];
        line.extend(self.args());
        line
    }
}

/// 分数参数的文本形式，无穷大使用 `+inf` / `-inf`
pub fn format_score(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}
