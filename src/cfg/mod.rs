//! 配置加载模块
//!
//! 从 JSON/JSON5/YAML/TOML 文件加载任意可反序列化的配置结构，
//! 格式根据文件扩展名自动选择。

mod loader;

pub use loader::{load_config, parse_config, ConfigFormat};
