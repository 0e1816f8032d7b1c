use anyhow::Result;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::io::{self, Write};

use super::core::LogAppender;

/// 输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SmartDefault)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Stdout,
    Stderr,
}

/// ConsoleAppender 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct ConsoleAppenderConfig {
    pub target: Target,
}

/// 终端输出器
pub struct ConsoleAppender {
    target: Target,
}

impl ConsoleAppender {
    pub fn new(config: ConsoleAppenderConfig) -> Self {
        Self {
            target: config.target,
        }
    }
}

#[async_trait::async_trait]
impl LogAppender for ConsoleAppender {
    async fn append(&self, formatted: &str) -> Result<()> {
        match self.target {
            Target::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", formatted)?;
                out.flush()?;
            }
            Target::Stderr => {
                let mut out = io::stderr().lock();
                writeln!(out, "{}", formatted)?;
                out.flush()?;
            }
        }
        Ok(())
    }
}
