//! GraphQL 查询文本 - 基础设施层
//!
//! 查询文本对本库是不透明的配置值：从本地文件读取，或者下载一次后保存到
//! `~/.brainlyscraper2/` 下。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info};

use crate::clients::Transport;
use crate::config::Config;
use crate::error::{BrainlyError, Result};

/// 本地配置目录名
pub const CONFIG_DIR_NAME: &str = ".brainlyscraper2";

/// 本地查询文件名
pub const QUERY_FILE_NAME: &str = "search.graphql";

/// GraphQL 查询文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphqlQuery {
    text: Arc<str>,
}

impl GraphqlQuery {
    pub fn from_text(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// 默认的本地查询文件路径
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(CONFIG_DIR_NAME)
            .join(QUERY_FILE_NAME)
    }

    /// 从本地文件读取
    pub async fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| BrainlyError::QueryUnavailable {
                path: path.display().to_string(),
                source: e,
            })?;
        debug!("已读取 GraphQL 查询: {} ({} 字节)", path.display(), text.len());
        Ok(Self::from_text(text))
    }

    /// 下载查询文本并写入本地文件（目录不存在时自动创建）
    pub async fn fetch_and_store(
        url: &str,
        path: &Path,
        transport: &dyn Transport,
    ) -> Result<Self> {
        info!("📥 正在下载 GraphQL 查询: {}", url);
        let text = transport.fetch_text(url).await.map_err(|e| match e {
            BrainlyError::RequestFailed { source, .. } => BrainlyError::QueryFetchFailed {
                url: url.to_string(),
                source,
            },
            other => other,
        })?;

        let unavailable = |e: std::io::Error| BrainlyError::QueryUnavailable {
            path: path.display().to_string(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(unavailable)?;
        }
        fs::write(path, &text).await.map_err(unavailable)?;

        info!("✓ GraphQL 查询已保存至: {}", path.display());
        Ok(Self::from_text(text))
    }

    /// 优先读取本地文件，不存在时下载并保存
    pub async fn load_or_fetch(config: &Config, transport: &dyn Transport) -> Result<Self> {
        let path = config.query_file.clone().unwrap_or_else(Self::default_path);
        if fs::try_exists(&path).await.unwrap_or(false) {
            return Self::from_file(&path).await;
        }
        Self::fetch_and_store(&config.query_url, &path, transport).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::TransportRequest;
    use crate::error::RequestFailure;
    use async_trait::async_trait;
    use serde_json::Value as JsonValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TextTransport {
        body: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl TextTransport {
        fn new(body: Option<&'static str>) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for TextTransport {
        async fn execute(&self, _request: TransportRequest) -> Result<JsonValue> {
            unreachable!("查询下载只应调用 fetch_text")
        }

        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body
                .map(str::to_string)
                .ok_or_else(|| BrainlyError::request_failed(url, RequestFailure::Status(404)))
        }
    }

    #[tokio::test]
    async fn test_load_prefers_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.graphql");
        std::fs::write(&path, "query SearchQuery { local }").unwrap();

        let transport = TextTransport::new(Some("remote"));
        let config = Config {
            query_file: Some(path),
            ..Config::default()
        };

        let query = GraphqlQuery::load_or_fetch(&config, &transport).await.unwrap();
        assert_eq!(query.as_str(), "query SearchQuery { local }");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_stores_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("search.graphql");

        let transport = TextTransport::new(Some("query SearchQuery { remote }"));
        let config = Config {
            query_file: Some(path.clone()),
            ..Config::default()
        };

        let query = GraphqlQuery::load_or_fetch(&config, &transport).await.unwrap();
        assert_eq!(query.as_str(), "query SearchQuery { remote }");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "query SearchQuery { remote }"
        );

        // 第二次直接读本地文件
        GraphqlQuery::load_or_fetch(&config, &transport).await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let transport = TextTransport::new(None);
        let config = Config {
            query_file: Some(dir.path().join("missing.graphql")),
            ..Config::default()
        };

        let err = GraphqlQuery::load_or_fetch(&config, &transport).await.unwrap_err();
        assert!(matches!(err, BrainlyError::QueryFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_from_file_missing() {
        let err = GraphqlQuery::from_file(Path::new("/no/such/query.graphql"))
            .await
            .unwrap_err();
        assert!(matches!(err, BrainlyError::QueryUnavailable { .. }));
    }
}
