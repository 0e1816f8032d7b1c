use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    Json5,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// 根据扩展名识别格式
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(ConfigFormat::Json),
            "json5" => Ok(ConfigFormat::Json5),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(anyhow!("不支持的文件格式: {}", ext)),
        }
    }

    /// 根据文件路径识别格式
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| anyhow!("无法识别配置文件格式: {}", path.display()))?;
        Self::from_extension(ext)
    }
}

/// 按指定格式解析配置
///
/// `Json` 同样使用 json5 解析，允许注释、尾随逗号和未加引号的键
pub fn parse_config<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T> {
    match format {
        ConfigFormat::Json | ConfigFormat::Json5 => Ok(json5::from_str(content)?),
        ConfigFormat::Yaml => Ok(serde_yaml::from_str(content)?),
        ConfigFormat::Toml => Ok(toml::from_str(content)?),
    }
}

/// 从文件加载配置，格式由扩展名决定
///
/// # 示例
/// ```no_run
/// use storekit::cfg::load_config;
/// use storekit::kv::StoreClientConfig;
///
/// let config: StoreClientConfig = load_config("config/store.yaml").unwrap();
/// ```
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("读取配置文件失败 {}: {}", path.display(), e))?;
    parse_config(&content, format)
}
