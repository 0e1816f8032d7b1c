//! 键值存储模块
//!
//! 在 Redis 兼容存储之上提供类型化的读写接口：
//!
//! - 由多段拼接的命名空间键（[`Key`]）
//! - 字符串、哈希、集合、有序集合、列表的单条操作（[`StoreClient`]）
//! - 批量读取与批量写入，一次往返完成（[`ReadPlan`]、[`WriteOp`]）
//! - 可替换的传输层：HTTP（[`RestTransport`]）、原生协议（[`RedisTransport`]）
//!   以及测试用的内存实现（[`MemoryTransport`]）

mod client;
mod command;
mod core;
mod key;
mod pipeline;
mod reply;
mod transport;
mod value;

pub use self::core::{StoreError, Transport};
pub use client::{StoreClient, StoreClientConfig, SENTINEL_MEMBER};
pub use command::{format_score, Command};
pub use key::{Key, KEY_DELIMITER};
pub use pipeline::{build_write_commands, ReadMapping, ReadPlan, ReadShape, WriteOp};
pub use reply::Reply;
pub use transport::{MemoryTransport, RedisTransport, RestTransport};
pub use value::{StoreValue, Value};
