//! 日志模块
//!
//! 结构化 JSON 日志，每次调用输出一条记录。
//!
//! # 特性
//!
//! - 日志级别：Debug, Info, Warn, Error, Critical，Debug 需显式开启
//! - 紧凑 JSON 或便于阅读的多行 JSON
//! - 记录携带 worker、链、环境等上下文，以及可合并覆盖的 metadata
//! - 输出器可替换，默认输出到终端
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use storekit::log::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config: LoggerConfig = json5::from_str(r#"
//!         {
//!             worker_name: "indexer",
//!             pretty_logs: false,
//!             debug: true,
//!             metadata: { region: "eu" }
//!         }
//!     "#)?;
//!
//!     let logger = Logger::new(config);
//!
//!     logger.info("Application started").await?;
//!     logger.warn(LogError::new("Slow upstream").with_error_code("W_SLOW")).await?;
//!
//!     Ok(())
//! }
//! ```

mod console_appender;
mod core;
mod json_formatter;
mod level;
mod log_record;
mod logger;

pub use self::core::{LogAppender, LogFormatter};
pub use console_appender::{ConsoleAppender, ConsoleAppenderConfig, Target};
pub use json_formatter::{JsonFormatter, JsonFormatterConfig};
pub use level::LogLevel;
pub use log_record::{LogError, LogRecord};
pub use logger::{Logger, LoggerConfig};
