use anyhow::Result;

use super::log_record::LogRecord;

/// 日志格式化器：把一条记录渲染为一次输出的文本
pub trait LogFormatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> Result<String>;
}

/// 日志输出器：每次调用写出一条已格式化的日志
#[async_trait::async_trait]
pub trait LogAppender: Send + Sync {
    async fn append(&self, formatted: &str) -> Result<()>;

    /// 刷新缓冲区，默认无操作
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
