use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::level::LogLevel;

/// 错误描述：消息、可选错误码与调用栈
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogError {
    pub message: String,
    pub error_code: Option<String>,
    pub trace: Option<String>,
}

impl LogError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}

impl From<&str> for LogError {
    fn from(message: &str) -> Self {
        LogError::new(message)
    }
}

impl From<String> for LogError {
    fn from(message: String) -> Self {
        LogError::new(message)
    }
}

/// 日志记录
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// 产生日志的 worker 标识
    pub worker: String,
    /// 链标识
    pub chain: Option<String>,
    pub chain_name: Option<String>,
    pub environment: Option<String>,
    pub error_code: Option<String>,
    pub stack_trace: Option<String>,
    pub metadata: Map<String, Value>,
}

impl LogRecord {
    /// 创建新的日志记录，时间戳取当前时间
    pub fn new(level: LogLevel, message: impl Into<String>, worker: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            worker: worker.into(),
            chain: None,
            chain_name: None,
            environment: None,
            error_code: None,
            stack_trace: None,
            metadata: Map::new(),
        }
    }

    /// 附加错误码与调用栈，仅 WARN / ERROR / CRITICAL 生效
    pub fn with_error(mut self, error_code: Option<String>, stack_trace: Option<String>) -> Self {
        if self.level.carries_error_details() {
            self.error_code = error_code;
            self.stack_trace = stack_trace;
        }
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Serialize for LogRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        // 与 ISO 8601 毫秒精度一致，例如 2024-01-01T00:00:00.000Z
        map.serialize_entry(
            "timestamp",
            &self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("worker", &self.worker)?;

        let optional = [
            ("chain", &self.chain),
            ("chain_name", &self.chain_name),
            ("environment", &self.environment),
            ("error_code", &self.error_code),
            ("stack_trace", &self.stack_trace),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                map.serialize_entry(name, value)?;
            }
        }

        if !self.metadata.is_empty() {
            map.serialize_entry("metadata", &self.metadata)?;
        }

        map.end()
    }
}
