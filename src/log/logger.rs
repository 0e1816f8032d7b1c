use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smart_default::SmartDefault;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::console_appender::{ConsoleAppender, ConsoleAppenderConfig};
use super::core::{LogAppender, LogFormatter};
use super::json_formatter::{JsonFormatter, JsonFormatterConfig};
use super::level::LogLevel;
use super::log_record::{LogError, LogRecord};

/// Logger 配置
///
/// 字段使用 snake_case，同时接受 camelCase 写法（如 `prettyLogs`）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct LoggerConfig {
    /// 输出便于阅读的多行 JSON，否则输出紧凑 JSON
    #[serde(alias = "prettyLogs")]
    pub pretty_logs: bool,

    /// 是否输出 DEBUG 日志
    pub debug: bool,

    /// 每条日志的 worker 标识
    #[default = "default-worker"]
    #[serde(alias = "workerName")]
    pub worker_name: String,

    #[serde(alias = "chainName")]
    pub chain_name: Option<String>,

    #[serde(alias = "chainId")]
    pub chain_id: Option<String>,

    pub environment: Option<String>,

    /// 合并到每条日志中的默认 metadata，可被单次调用覆盖
    pub metadata: Map<String, Value>,
}

/// 结构化 JSON 日志器
///
/// 由调用方显式创建并持有，不存在全局状态。
///
/// # 示例
///
/// ```rust,no_run
/// use storekit::log::{Logger, LoggerConfig, LogError};
///
/// # async fn run() -> anyhow::Result<()> {
/// let config: LoggerConfig = json5::from_str(r#"{ workerName: "indexer", environment: "prod" }"#)?;
/// let logger = Logger::new(config);
///
/// logger.info("worker started").await?;
/// logger.error(LogError::new("fetch failed").with_error_code("E_FETCH")).await?;
/// # Ok(())
/// # }
/// ```
pub struct Logger {
    config: LoggerConfig,
    metadata: RwLock<Map<String, Value>>,
    formatter: Arc<dyn LogFormatter>,
    appender: Arc<dyn LogAppender>,
}

impl Logger {
    /// 使用终端输出创建 Logger
    pub fn new(config: LoggerConfig) -> Self {
        let appender = Arc::new(ConsoleAppender::new(ConsoleAppenderConfig::default()));
        Self::with_appender(config, appender)
    }

    /// 使用自定义输出器创建 Logger
    pub fn with_appender(config: LoggerConfig, appender: Arc<dyn LogAppender>) -> Self {
        let formatter = Arc::new(JsonFormatter::new(JsonFormatterConfig {
            pretty: config.pretty_logs,
        }));

        Self {
            metadata: RwLock::new(config.metadata.clone()),
            config,
            formatter,
            appender,
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// 设置一个默认 metadata 键
    pub async fn set_metadata(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.write().await.insert(key.into(), value.into());
    }

    /// 移除一个默认 metadata 键，返回被移除的值
    pub async fn remove_metadata_key(&self, key: &str) -> Option<Value> {
        self.metadata.write().await.remove(key)
    }

    /// 当前默认 metadata 的快照
    pub async fn metadata(&self) -> Map<String, Value> {
        self.metadata.read().await.clone()
    }

    /// 按配置填充 worker、链与环境信息，并合并默认 metadata
    async fn record(&self, level: LogLevel, message: String) -> LogRecord {
        let mut record = LogRecord::new(level, message, self.config.worker_name.clone());
        record.chain = self.config.chain_id.clone();
        record.chain_name = self.config.chain_name.clone();
        record.environment = self.config.environment.clone();
        record.metadata = self.metadata.read().await.clone();
        record
    }

    /// 输出一条日志，DEBUG 级别在未开启 debug 时被丢弃
    pub async fn log(&self, record: LogRecord) -> Result<()> {
        if record.level == LogLevel::Debug && !self.config.debug {
            return Ok(());
        }

        let formatted = self.formatter.format(&record)?;
        self.appender.append(&formatted).await
    }

    /// 记录带 metadata 的日志，单次 metadata 覆盖同名默认值
    ///
    /// # 示例
    ///
    /// ```ignore
    /// logger.logm(
    ///     LogLevel::Info,
    ///     "batch flushed",
    ///     vec![("count", 12.into()), ("queue", "items".into())],
    /// ).await?;
    /// ```
    pub async fn logm(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        metadata: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Result<()> {
        let mut record = self.record(level, message.into()).await;
        for (key, value) in metadata {
            record.metadata.insert(key.into(), value);
        }
        self.log(record).await
    }

    async fn log_error(&self, level: LogLevel, error: LogError) -> Result<()> {
        let record = self
            .record(level, error.message)
            .await
            .with_error(error.error_code, error.trace);
        self.log(record).await
    }

    async fn log_error_with(
        &self,
        level: LogLevel,
        error: LogError,
        metadata: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Result<()> {
        let mut record = self
            .record(level, error.message)
            .await
            .with_error(error.error_code, error.trace);
        for (key, value) in metadata {
            record.metadata.insert(key.into(), value);
        }
        self.log(record).await
    }

    pub async fn debug(&self, message: impl Into<String>) -> Result<()> {
        let record = self.record(LogLevel::Debug, message.into()).await;
        self.log(record).await
    }

    pub async fn info(&self, message: impl Into<String>) -> Result<()> {
        let record = self.record(LogLevel::Info, message.into()).await;
        self.log(record).await
    }

    /// 记录 WARN 日志，可传入字符串或带错误码的 [`LogError`]
    pub async fn warn(&self, error: impl Into<LogError>) -> Result<()> {
        self.log_error(LogLevel::Warn, error.into()).await
    }

    pub async fn error(&self, error: impl Into<LogError>) -> Result<()> {
        self.log_error(LogLevel::Error, error.into()).await
    }

    pub async fn critical(&self, error: impl Into<LogError>) -> Result<()> {
        self.log_error(LogLevel::Critical, error.into()).await
    }

    pub async fn debugm(
        &self,
        message: impl Into<String>,
        metadata: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Result<()> {
        self.logm(LogLevel::Debug, message, metadata).await
    }

    pub async fn infom(
        &self,
        message: impl Into<String>,
        metadata: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Result<()> {
        self.logm(LogLevel::Info, message, metadata).await
    }

    pub async fn warnm(
        &self,
        error: impl Into<LogError>,
        metadata: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Result<()> {
        self.log_error_with(LogLevel::Warn, error.into(), metadata).await
    }

    pub async fn errorm(
        &self,
        error: impl Into<LogError>,
        metadata: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Result<()> {
        self.log_error_with(LogLevel::Error, error.into(), metadata).await
    }

    pub async fn criticalm(
        &self,
        error: impl Into<LogError>,
        metadata: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Result<()> {
        self.log_error_with(LogLevel::Critical, error.into(), metadata).await
    }

    pub async fn flush(&self) -> Result<()> {
        self.appender.flush().await
    }
}

impl From<LoggerConfig> for Logger {
    fn from(config: LoggerConfig) -> Self {
        Logger::new(config)
    }
}
