/// Brainly 镜像站客户端
///
/// 负责单个镜像站的请求构造、发送和响应解析，不做校验、缓存和多站竞速。
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::debug;

use crate::clients::transport::{Transport, TransportRequest};
use crate::error::{BrainlyError, Result};
use crate::infrastructure::GraphqlQuery;
use crate::model::raw::{RawEnvelope, RawGraphqlError, RawSearchData, RawUserData};
use crate::model::{Author, Mirror, MirrorRegistry, SearchItem};
use crate::services::converter;

/// 搜索操作名
pub const SEARCH_OPERATION: &str = "SearchQuery";

/// 用户主页的持久化查询
pub const PROFILE_OPERATION: &str = "ProfilePage";
pub const PROFILE_QUERY_HASH: &str =
    "9ea2aac464a0101bac6fa1dd67758aea88f5052f7281952a16ea9658c252674b";

const GUEST_TOKEN_LEN: usize = 80;

/// 单次调用的请求选项
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// 实际发送请求的镜像站（默认使用客户端所属国家）
    pub mirror: Option<String>,
    /// 追加或覆盖的请求头
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mirror(mut self, code: impl Into<String>) -> Self {
        self.mirror = Some(code.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// 波兰站的访客 Cookie
pub fn zadane_guest_cookie() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GUEST_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!(
        "Zadanepl_cookie[Token][Guest]={};path=/;max-age=63072000",
        token
    )
}

/// 镜像站客户端
#[derive(Clone)]
pub struct BrainlyClient {
    transport: Arc<dyn Transport>,
    registry: MirrorRegistry,
    query: GraphqlQuery,
    user_agent: String,
}

impl BrainlyClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: MirrorRegistry,
        query: GraphqlQuery,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            registry,
            query,
            user_agent: user_agent.into(),
        }
    }

    pub fn registry(&self) -> &MirrorRegistry {
        &self.registry
    }

    pub fn query(&self) -> &GraphqlQuery {
        &self.query
    }

    /// 某个镜像站的默认请求头
    pub fn headers(&self, mirror: Mirror) -> Vec<(String, String)> {
        let base = self.registry.base_url(mirror).to_string();
        let mut headers = vec![
            ("Origin".to_string(), base.clone()),
            ("Referer".to_string(), base),
            ("Sec-Fetch-Dest".to_string(), "empty".to_string()),
            ("Sec-Fetch-Mode".to_string(), "cors".to_string()),
            ("Sec-Fetch-Site".to_string(), "same-origin".to_string()),
            ("TE".to_string(), "trailers".to_string()),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ];
        if mirror == Mirror::Pl {
            headers.push(("Cookie".to_string(), zadane_guest_cookie()));
        }
        headers
    }

    /// 构造批量 GraphQL 请求体：只含一个操作的数组
    pub fn request_params(&self, operation_name: &str, variables: JsonValue) -> JsonValue {
        json!([{
            "operationName": operation_name,
            "query": self.query.as_str(),
            "variables": variables,
        }])
    }

    /// 在指定镜像站上搜索题目
    ///
    /// # 参数
    /// - `mirror`: 发送请求的镜像站（已校验）
    /// - `language`: 目标语言（已校验）
    /// - `question`: 题目文本
    /// - `count`: 返回数量
    /// - `options`: 额外请求头；`options.mirror` 由调用方解析，这里不再读取
    ///
    /// # 返回
    /// 按站点返回顺序排列的搜索结果
    pub async fn search_on(
        &self,
        mirror: Mirror,
        language: Mirror,
        question: &str,
        count: usize,
        options: &RequestOptions,
    ) -> Result<Vec<SearchItem>> {
        let endpoint = self.registry.graphql_endpoint(mirror, language);
        let body = self.request_params(
            SEARCH_OPERATION,
            json!({ "query": question, "first": count, "after": null }),
        );
        let request = TransportRequest::post(&endpoint, body)
            .headers(self.headers(mirror))
            .headers(options.headers.iter().cloned());

        let response = self.transport.execute(request).await?;
        let data: RawSearchData = parse_operation(mirror, &endpoint, response)?;

        debug!(
            "镜像站 {} 返回 {} 条结果",
            mirror,
            data.question_search.edges.len()
        );

        data.question_search
            .edges
            .iter()
            .map(|edge| converter::convert_search_item(&edge.node))
            .collect()
    }

    /// 在指定镜像站上按数字 ID 查询用户
    ///
    /// 站点返回 `null` 时为 `Ok(None)`。
    pub async fn find_user_on(
        &self,
        mirror: Mirror,
        language: Mirror,
        user_id: i64,
    ) -> Result<Option<Author>> {
        let endpoint = self.registry.graphql_endpoint(mirror, language);
        let variables = json!({ "userId": user_id });
        let extensions = json!({
            "persistedQuery": { "version": 1, "sha256Hash": PROFILE_QUERY_HASH }
        });
        let request = TransportRequest::get(&endpoint)
            .headers(self.headers(mirror))
            .query_param("operationName", PROFILE_OPERATION)
            .query_param("variables", variables.to_string())
            .query_param("extensions", extensions.to_string());

        let response = self.transport.execute(request).await?;
        let data: RawUserData = parse_operation(mirror, &endpoint, response)?;

        data.into_author()
            .map(|raw| converter::convert_author(&raw))
            .transpose()
    }
}

/// 取出批量响应中的唯一操作结果，识别站点错误后解析 `data`
fn parse_operation<T: DeserializeOwned>(
    mirror: Mirror,
    endpoint: &str,
    response: JsonValue,
) -> Result<T> {
    let operation = match response {
        JsonValue::Array(items) => items.into_iter().next().ok_or_else(|| {
            BrainlyError::malformed_msg(endpoint, "批量响应为空数组")
        })?,
        other => other,
    };

    if let Some(message) = site_error(&operation) {
        return Err(BrainlyError::SiteRejected {
            mirror: mirror.code().to_string(),
            message,
        });
    }

    let envelope: RawEnvelope<T> =
        serde_json::from_value(operation).map_err(|e| BrainlyError::malformed(endpoint, e))?;
    Ok(envelope.data)
}

/// 站点错误：`{"err": "..."}` 或非空的 GraphQL `errors` 数组
fn site_error(operation: &JsonValue) -> Option<String> {
    if let Some(err) = operation.get("err").and_then(JsonValue::as_str) {
        return Some(err.to_string());
    }

    let errors: Vec<RawGraphqlError> = operation
        .get("errors")
        .and_then(|e| serde_json::from_value(e.clone()).ok())
        .unwrap_or_default();
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
    )
}
