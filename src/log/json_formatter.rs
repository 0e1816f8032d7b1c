use anyhow::Result;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use super::core::LogFormatter;
use super::log_record::LogRecord;

/// JsonFormatter 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct JsonFormatterConfig {
    /// 是否输出便于阅读的多行 JSON
    #[default = false]
    pub pretty: bool,
}

/// JSON 格式化器
///
/// 默认输出紧凑的单行 JSON，开启 `pretty` 后输出缩进格式
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(config: JsonFormatterConfig) -> Self {
        Self {
            pretty: config.pretty,
        }
    }
}

impl LogFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(record)?)
        } else {
            Ok(serde_json::to_string(record)?)
        }
    }
}
