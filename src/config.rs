use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::services::cache::FileCache;

/// 缓存后端
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    File,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "file" => Ok(CacheBackend::File),
            other => Err(format!("未知的缓存后端: {}", other)),
        }
    }
}

/// 客户端配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 默认镜像站代码
    pub country: String,
    /// 是否启用缓存
    pub enable_cache: bool,
    /// 缓存后端
    pub cache_backend: CacheBackend,
    /// 文件缓存路径
    pub cache_file: PathBuf,
    /// 本地 GraphQL 查询文件，未设置时使用 `~/.brainlyscraper2/search.graphql`
    pub query_file: Option<PathBuf>,
    /// 本地文件不存在时下载查询文本的地址
    pub query_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// 默认返回的结果数量
    pub default_result_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            country: "id".to_string(),
            enable_cache: true,
            cache_backend: CacheBackend::File,
            cache_file: FileCache::default_path(),
            query_file: None,
            query_url: "https://gist.github.com/hanifdwyputras/913246458dd9beb1df433786b19caecd/raw/"
                .to_string(),
            request_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:98.0) Gecko/20100101 Firefox/98.0"
                .to_string(),
            default_result_count: 10,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置或无法解析的项使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            country: std::env::var("BRAINLY_COUNTRY").unwrap_or(default.country),
            enable_cache: std::env::var("BRAINLY_ENABLE_CACHE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.enable_cache),
            cache_backend: std::env::var("BRAINLY_CACHE_BACKEND").ok().and_then(|v| v.parse().ok()).unwrap_or(default.cache_backend),
            cache_file: std::env::var("BRAINLY_CACHE_FILE").map(PathBuf::from).unwrap_or(default.cache_file),
            query_file: std::env::var("BRAINLY_QUERY_FILE").ok().map(PathBuf::from).or(default.query_file),
            query_url: std::env::var("BRAINLY_QUERY_URL").unwrap_or(default.query_url),
            request_timeout_secs: std::env::var("BRAINLY_REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            user_agent: std::env::var("BRAINLY_USER_AGENT").unwrap_or(default.user_agent),
            default_result_count: std::env::var("BRAINLY_RESULT_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_result_count),
        }
    }

    /// 从 TOML 文件读取配置，缺失的项使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }
}
