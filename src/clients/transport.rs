/// HTTP 传输层
///
/// 只负责"把 JSON 发到 URL 并拿回 JSON"，不认识题目、镜像站或缓存。
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{BrainlyError, RequestFailure, Result};

/// 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// 一次 HTTP 请求的全部信息
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
}

impl TransportRequest {
    /// 创建 POST JSON 请求
    pub fn post(url: impl Into<String>, body: JsonValue) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// 创建 GET 请求
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// 设置请求头，同名（不区分大小写）的旧值会被替换
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |req, (k, v)| req.header(k, v))
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// 读取请求头（不区分大小写）
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// 传输层接口
#[async_trait]
pub trait Transport: Send + Sync {
    /// 发送请求并把响应体解析为 JSON
    ///
    /// 网络错误或非 2xx 返回 `RequestFailed`，响应体不是 JSON 返回 `MalformedResponse`。
    async fn execute(&self, request: TransportRequest) -> Result<JsonValue>;

    /// 下载纯文本
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// 基于 reqwest 的默认传输层
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// 根据配置创建传输层
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| BrainlyError::request_failed("client-builder", e))?;
        Ok(Self { client })
    }

    /// 使用已有的 reqwest 客户端
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<JsonValue> {
        debug!("{:?} {}", request.method, request.url);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BrainlyError::request_failed(&request.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrainlyError::request_failed(
                &request.url,
                RequestFailure::Status(status.as_u16()),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| BrainlyError::request_failed(&request.url, e))?;

        serde_json::from_str(&text).map_err(|e| BrainlyError::malformed(&request.url, e))
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BrainlyError::request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrainlyError::request_failed(
                url,
                RequestFailure::Status(status.as_u16()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| BrainlyError::request_failed(url, e))
    }
}
