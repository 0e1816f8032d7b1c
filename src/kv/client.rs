use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use smart_default::SmartDefault;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use super::command::Command;
use super::core::{StoreError, Transport};
use super::key::Key;
use super::pipeline::{build_write_commands, sorted_fields, ReadPlan, ReadShape, WriteOp};
use super::reply::Reply;
use super::transport::{RedisTransport, RestTransport};
use super::value::{retain_truthy, StoreValue, Value};
use crate::log::{LogError, Logger};

/// 物化空集合时临时写入的占位成员
pub const SENTINEL_MEMBER: &str = "placeholder";

/// StoreClient 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, SmartDefault, Validate)]
#[serde(default)]
pub struct StoreClientConfig {
    /// 访问地址：`https://...` 使用 HTTP 协议，`redis://...` 使用原生协议
    #[garde(required, length(min = 1))]
    pub url: Option<String>,

    /// 访问令牌
    #[garde(required, length(min = 1))]
    pub token: Option<String>,

    /// 单次请求超时（秒），仅 HTTP 协议生效
    #[garde(range(min = 1))]
    #[default = 3]
    pub command_timeout: u64,
}

/// 键值存储门面
///
/// 对字符串、哈希、集合、有序集合、列表五种形状提供类型化操作，
/// 并通过流水线把 N 次往返合并为一次。句柄可廉价克隆，不持有可变状态。
///
/// # 示例
/// ```ignore
/// use storekit::kv::{StoreClient, StoreClientConfig, ReadShape, Key};
///
/// let client = StoreClient::new(StoreClientConfig {
///     url: Some("https://example.upstash.io".to_string()),
///     token: Some("secret".to_string()),
///     ..Default::default()
/// })?;
///
/// client.set_string(&["greeting"], "hello").await?;
/// let results = client
///     .pipeline_read(&[Key::build(&["greeting"])], &[ReadShape::String])
///     .await?;
/// ```
#[derive(Clone)]
pub struct StoreClient {
    transport: Arc<dyn Transport>,
    logger: Option<Arc<Logger>>,
}

impl StoreClient {
    /// 校验配置并按地址协议选择传输层
    pub fn new(config: StoreClientConfig) -> Result<Self, StoreError> {
        if let Err(errors) = config.validate() {
            return Err(StoreError::InvalidConfig(format!(
                "Please provide both url and token: {}",
                errors
            )));
        }

        let url = config.url.unwrap_or_default();
        let token = config.token.unwrap_or_default();

        let transport: Arc<dyn Transport> = if url.starts_with("http://") || url.starts_with("https://") {
            Arc::new(RestTransport::new(
                url,
                token,
                Duration::from_secs(config.command_timeout),
            )?)
        } else if url.starts_with("redis://") || url.starts_with("rediss://") {
            Arc::new(RedisTransport::new(&url, &token)?)
        } else {
            return Err(StoreError::InvalidConfig(format!(
                "Unsupported url scheme: {}",
                url
            )));
        };

        Ok(Self::with_transport(transport))
    }

    /// 使用已有的传输层创建
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            logger: None,
        }
    }

    /// 挂载日志器：流水线输出 DEBUG 日志，传输失败输出 ERROR 日志
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    async fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        let name = command.name();
        let key = command.key().to_string();
        match self.transport.execute(command).await {
            Ok(reply) => Ok(reply),
            Err(err) => {
                let metadata = vec![
                    ("command", JsonValue::from(name)),
                    ("key", JsonValue::from(key)),
                ];
                self.report_failure(&err, metadata).await;
                Err(err)
            }
        }
    }

    async fn execute_pipeline(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        let count = commands.len();
        if let Some(logger) = &self.logger {
            if let Err(e) = logger
                .debugm("executing pipeline", vec![("commands", JsonValue::from(count))])
                .await
            {
                eprintln!("failed to write log: {}", e);
            }
        }

        match self.transport.execute_pipeline(commands).await {
            Ok(replies) => Ok(replies),
            Err(err) => {
                self.report_failure(&err, vec![("commands", JsonValue::from(count))])
                    .await;
                Err(err)
            }
        }
    }

    async fn report_failure(&self, err: &StoreError, metadata: Vec<(&str, JsonValue)>) {
        if let Some(logger) = &self.logger {
            let error = LogError::new(format!("store request failed: {}", err))
                .with_error_code("STORE_TRANSPORT");
            if let Err(e) = logger.errorm(error, metadata).await {
                eprintln!("failed to write log: {}", e);
            }
        }
    }

    // ===== 哈希 =====

    /// 写入哈希字段，只覆盖给出的字段，返回新增字段数
    ///
    /// `data` 为空时直接返回 0，不访问传输层
    pub async fn set_hash<S: AsRef<str>>(
        &self,
        key_parts: &[S],
        data: &HashMap<String, Value>,
    ) -> Result<i64, StoreError> {
        if data.is_empty() {
            return Ok(0);
        }

        let command = Command::HSet {
            key: Key::build(key_parts),
            fields: sorted_fields(data),
        };
        self.execute(command).await?.into_integer()
    }

    /// 读取整个哈希，键不存在时返回空映射
    pub async fn get_hash<S: AsRef<str>>(
        &self,
        key_parts: &[S],
    ) -> Result<HashMap<String, String>, StoreError> {
        let command = Command::HGetAll { key: Key::build(key_parts) };
        self.execute(command).await?.into_hash()
    }

    pub async fn get_hash_field<S: AsRef<str>>(
        &self,
        key_parts: &[S],
        field: &str,
    ) -> Result<Option<String>, StoreError> {
        let command = Command::HGet {
            key: Key::build(key_parts),
            field: field.to_string(),
        };
        self.execute(command).await?.into_optional_text()
    }

    pub async fn set_hash_field<S: AsRef<str>>(
        &self,
        key_parts: &[S],
        field: &str,
        value: impl Into<Value>,
    ) -> Result<i64, StoreError> {
        let command = Command::HSet {
            key: Key::build(key_parts),
            fields: vec![(field.to_string(), value.into())],
        };
        self.execute(command).await?.into_integer()
    }

    // ===== 字符串 =====

    pub async fn set_string<S: AsRef<str>>(
        &self,
        key_parts: &[S],
        value: impl Into<Value>,
    ) -> Result<(), StoreError> {
        let command = Command::Set {
            key: Key::build(key_parts),
            value: value.into(),
        };
        self.execute(command).await?.into_ack()
    }

    pub async fn get_string<S: AsRef<str>>(
        &self,
        key_parts: &[S],
    ) -> Result<Option<String>, StoreError> {
        let command = Command::Get { key: Key::build(key_parts) };
        self.execute(command).await?.into_optional_text()
    }

    // ===== 集合 =====

    /// 添加成员；假值被过滤，过滤后为空时直接返回 0，不访问传输层
    pub async fn add_to_set<S, I, V>(&self, key_parts: &[S], values: I) -> Result<i64, StoreError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let members = retain_truthy(values);
        if members.is_empty() {
            return Ok(0);
        }

        let command = Command::SAdd {
            key: Key::build(key_parts),
            members,
        };
        self.execute(command).await?.into_integer()
    }

    /// 移除成员；过滤规则同 [`StoreClient::add_to_set`]
    pub async fn remove_from_set<S, I, V>(
        &self,
        key_parts: &[S],
        values: I,
    ) -> Result<i64, StoreError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let members = retain_truthy(values);
        if members.is_empty() {
            return Ok(0);
        }

        let command = Command::SRem {
            key: Key::build(key_parts),
            members,
        };
        self.execute(command).await?.into_integer()
    }

    pub async fn get_set_members<S: AsRef<str>>(
        &self,
        key_parts: &[S],
    ) -> Result<HashSet<String>, StoreError> {
        let command = Command::SMembers { key: Key::build(key_parts) };
        self.execute(command).await?.into_text_set()
    }

    pub async fn get_set_length<S: AsRef<str>>(&self, key_parts: &[S]) -> Result<i64, StoreError> {
        let command = Command::SCard { key: Key::build(key_parts) };
        self.execute(command).await?.into_integer()
    }

    /// 创建集合
    ///
    /// 有效成员非空时等同于 SADD。没有有效成员时：键不存在则写入并立即移除
    /// 占位成员，返回移除数量；键已存在则不做任何修改，返回 0。
    pub async fn create_set<S, I, V>(&self, key_parts: &[S], values: I) -> Result<i64, StoreError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let key = Key::build(key_parts);
        let members = retain_truthy(values);
        if !members.is_empty() {
            return self.execute(Command::SAdd { key, members }).await?.into_integer();
        }

        let exists = self
            .execute(Command::Exists { key: key.clone() })
            .await?
            .into_integer()?;
        if exists > 0 {
            return Ok(0);
        }

        let sentinel = vec![Value::from(SENTINEL_MEMBER)];
        self.execute(Command::SAdd {
            key: key.clone(),
            members: sentinel.clone(),
        })
        .await?;
        self.execute(Command::SRem {
            key,
            members: sentinel,
        })
        .await?
        .into_integer()
    }

    // ===== 有序集合 =====

    pub async fn add_to_sorted_set<S: AsRef<str>>(
        &self,
        key_parts: &[S],
        score: f64,
        member: &str,
    ) -> Result<i64, StoreError> {
        let command = Command::ZAdd {
            key: Key::build(key_parts),
            score,
            member: member.to_string(),
        };
        self.execute(command).await?.into_integer()
    }

    /// 按分数升序返回 `[min_score, max_score]` 闭区间内的成员
    pub async fn get_sorted_set_by_score<S: AsRef<str>>(
        &self,
        key_parts: &[S],
        min_score: f64,
        max_score: f64,
    ) -> Result<Vec<String>, StoreError> {
        let command = Command::ZRangeByScore {
            key: Key::build(key_parts),
            min: min_score,
            max: max_score,
        };
        self.execute(command).await?.into_text_list()
    }

    // ===== 列表 =====

    /// 读取列表区间，负下标从尾部计数，`stop` 包含在内
    pub async fn l_range<S: AsRef<str>>(
        &self,
        key_parts: &[S],
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        let command = Command::LRange {
            key: Key::build(key_parts),
            start,
            stop,
        };
        self.execute(command).await?.into_text_list()
    }

    /// 追加到列表尾部，返回追加后的长度；没有值时返回 0
    pub async fn r_push<S, I, V>(&self, key_parts: &[S], values: I) -> Result<i64, StoreError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Ok(0);
        }

        let command = Command::RPush {
            key: Key::build(key_parts),
            values,
        };
        self.execute(command).await?.into_integer()
    }

    pub async fn del_key<S: AsRef<str>>(&self, key_parts: &[S]) -> Result<i64, StoreError> {
        let command = Command::Del { key: Key::build(key_parts) };
        self.execute(command).await?.into_integer()
    }

    // ===== 流水线 =====

    /// 批量读取
    ///
    /// 结果与输入等长、同序；`ReadShape::None` 的位置恒为 `None` 且不发送命令。
    pub async fn pipeline_read(
        &self,
        keys: &[Key],
        shapes: &[ReadShape],
    ) -> Result<Vec<Option<StoreValue>>, StoreError> {
        let (commands, mapping) = ReadPlan::build(keys, shapes)?.into_commands();
        let replies = self.execute_pipeline(commands).await?;
        mapping.assemble(replies)
    }

    /// 批量写入，按输入顺序执行并返回原始结果
    ///
    /// 任一操作非法时整批拒绝，不会有命令发送到传输层。
    pub async fn pipeline_write(&self, ops: &[WriteOp]) -> Result<Vec<Reply>, StoreError> {
        let commands = build_write_commands(ops)?;
        self.execute_pipeline(commands).await
    }

    /// 批量读取 `items:<id>:basic` 哈希，结果与输入同序
    pub async fn get_basic_info_for_items<S: AsRef<str>>(
        &self,
        item_ids: &[S],
    ) -> Result<Vec<HashMap<String, String>>, StoreError> {
        let commands = item_ids
            .iter()
            .map(|id| Command::HGetAll {
                key: Key::build(&["items", id.as_ref(), "basic"]),
            })
            .collect();

        self.execute_pipeline(commands)
            .await?
            .into_iter()
            .map(Reply::into_hash)
            .collect()
    }
}
