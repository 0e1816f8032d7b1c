use async_trait::async_trait;
use thiserror::Error;

use super::command::Command;
use super::reply::Reply;

/// 存储访问相关错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Pipeline command {index} failed: {message}")]
    Pipeline { index: usize, message: String },

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// 远端存储传输层
///
/// 负责把 [`Command`] 发送到远端并返回原始 [`Reply`]。
/// 流水线按输入顺序执行，一次往返；其中任一命令失败时整体返回
/// [`StoreError::Pipeline`]。
#[async_trait]
pub trait Transport: Send + Sync {
    /// 执行单条命令
    async fn execute(&self, command: Command) -> Result<Reply, StoreError>;

    /// 以一次往返执行一批有序命令，返回与输入等长、同序的结果
    async fn execute_pipeline(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError>;
}
