use async_trait::async_trait;

use crate::kv::command::Command;
use crate::kv::core::{StoreError, Transport};
use crate::kv::reply::Reply;

/// 基于 redis 原生协议的传输实现
///
/// 访问令牌作为密码注入连接地址；每次调用获取一个多路复用连接，
/// 流水线使用 `redis::pipe()` 一次往返发送。
///
/// # 示例
/// ```ignore
/// use storekit::kv::RedisTransport;
///
/// let transport = RedisTransport::new("redis://localhost:6379", "secret").unwrap();
/// ```
pub struct RedisTransport {
    client: redis::Client,
}

impl RedisTransport {
    pub fn new(url: &str, token: &str) -> Result<Self, StoreError> {
        let url = with_credentials(url, token)?;
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::InvalidConfig(format!("Invalid connection URL: {}", e)))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

/// 在地址中注入认证信息，令牌为空或地址已带认证信息时保持不变
fn with_credentials(url: &str, token: &str) -> Result<String, StoreError> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| StoreError::InvalidConfig(format!("Invalid connection URL: {}", url)))?;

    let authority = rest.split('/').next().unwrap_or_default();
    if token.is_empty() || authority.contains('@') {
        return Ok(url.to_string());
    }

    Ok(format!(
        "{}://default:{}@{}",
        scheme,
        urlencoding::encode(token),
        rest
    ))
}

fn to_redis_cmd(command: &Command) -> redis::Cmd {
    let mut cmd = redis::cmd(command.name());
    for arg in command.args() {
        cmd.arg(arg);
    }
    cmd
}

/// redis::Value 转为原始 Reply，RESP3 的 Map 展平为 `[k, v, ...]`
fn reply_from_value(value: redis::Value) -> Result<Reply, StoreError> {
    match value {
        redis::Value::Nil => Ok(Reply::Nil),
        redis::Value::Int(n) => Ok(Reply::Integer(n)),
        redis::Value::BulkString(bytes) => {
            Ok(Reply::Text(String::from_utf8_lossy(&bytes).into_owned()))
        }
        redis::Value::SimpleString(s) => Ok(Reply::Text(s)),
        redis::Value::Okay => Ok(Reply::Text("OK".to_string())),
        redis::Value::Double(f) => Ok(Reply::Text(f.to_string())),
        redis::Value::Boolean(b) => Ok(Reply::Integer(b as i64)),
        redis::Value::VerbatimString { text, .. } => Ok(Reply::Text(text)),
        redis::Value::Array(items) | redis::Value::Set(items) => Ok(Reply::Array(
            items
                .into_iter()
                .map(reply_from_value)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        redis::Value::Map(pairs) => {
            let mut flat = Vec::with_capacity(pairs.len() * 2);
            for (k, v) in pairs {
                flat.push(reply_from_value(k)?);
                flat.push(reply_from_value(v)?);
            }
            Ok(Reply::Array(flat))
        }
        redis::Value::ServerError(err) => Err(StoreError::Command(server_error_message(&err))),
        other => Err(StoreError::UnexpectedReply(format!("{:?}", other))),
    }
}

fn server_error_message(err: &redis::ServerError) -> String {
    match err.details() {
        Some(details) => format!("{} {}", err.code(), details),
        None => err.code().to_string(),
    }
}

/// 流水线结果逐条转换，第一条服务端错误转为 `StoreError::Pipeline`
fn replies_from_pipeline(values: Vec<redis::Value>) -> Result<Vec<Reply>, StoreError> {
    if let Some((index, err)) = values.iter().enumerate().find_map(|(i, v)| match v {
        redis::Value::ServerError(err) => Some((i, err)),
        _ => None,
    }) {
        return Err(StoreError::Pipeline {
            index,
            message: server_error_message(err),
        });
    }

    values.into_iter().map(reply_from_value).collect()
}

#[async_trait]
impl Transport for RedisTransport {
    async fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        let mut con = self.connection().await?;
        let value: redis::Value = to_redis_cmd(&command).query_async(&mut con).await?;
        reply_from_value(value)
    }

    async fn execute_pipeline(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError> {
        let mut con = self.connection().await?;

        let mut pipe = redis::pipe();
        pipe.ignore_errors();
        for command in &commands {
            pipe.add_command(to_redis_cmd(command));
        }

        let values: Vec<redis::Value> = pipe.query_async(&mut con).await?;
        replies_from_pipeline(values)
    }
}
