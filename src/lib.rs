//! StoreKit - Redis 兼容存储的类型化访问库
//!
//! 把字符串、哈希、集合、有序集合、列表的读写封装为类型化接口，
//! 并支持把多次读写合并为一次流水线往返。
//!
//! ## 模块
//!
//! - **kv**: 键构造、类型化操作、批量读写、HTTP/原生协议传输层
//! - **log**: 结构化 JSON 日志
//! - **cfg**: 从 JSON/JSON5/YAML/TOML 文件加载配置
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use storekit::kv::{Key, ReadShape, StoreClient, StoreClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = StoreClient::new(StoreClientConfig {
//!         url: Some("https://example.upstash.io".to_string()),
//!         token: Some("secret".to_string()),
//!         ..Default::default()
//!     })?;
//!
//!     client.set_string(&["user", "1", "name"], "alice").await?;
//!     let values = client
//!         .pipeline_read(&[Key::build(&["user", "1", "name"])], &[ReadShape::String])
//!         .await?;
//!     println!("{:?}", values);
//!
//!     Ok(())
//! }
//! ```

pub mod cfg;
pub mod kv;
pub mod log;

pub use kv::{
    Key, ReadShape, StoreClient, StoreClientConfig, StoreError, StoreValue, Transport, Value,
    WriteOp,
};

pub use log::{LogError, LogLevel, Logger, LoggerConfig};
