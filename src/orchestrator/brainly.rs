/// Brainly 查询编排
///
/// 一次请求的流程：校验 → 查缓存 → 发送（单站或多站竞速）→ 转换 → 写缓存。
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::clients::{BrainlyClient, ReqwestTransport, RequestOptions, Transport};
use crate::config::{CacheBackend, Config};
use crate::error::{BrainlyError, Result};
use crate::infrastructure::GraphqlQuery;
use crate::model::{Author, Mirror, MirrorRegistry, SearchItem};
use crate::services::cache::{FileCache, MemoryCache, ResultCache};
use crate::utils::{codec, logging};

/// 用户 ID：数据库数字 ID、`"User:123"` 或 base64 编码的原始 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserId {
    Database(i64),
    Raw(String),
}

impl UserId {
    /// 解析出数据库数字 ID
    pub fn database_id(&self) -> Result<i64> {
        let raw = match self {
            UserId::Database(id) => return Ok(*id),
            UserId::Raw(raw) => raw.trim(),
        };

        if let Ok(id) = raw.parse::<i64>() {
            return Ok(id);
        }
        if let Some((_, number)) = raw.split_once(':') {
            return number
                .parse()
                .map_err(|_| BrainlyError::MalformedIdentifier {
                    raw: raw.to_string(),
                    reason: format!("'{}' 不是整数", number),
                });
        }
        Ok(codec::decode(raw)?.number)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Database(id)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        UserId::Raw(raw.to_string())
    }
}

impl From<String> for UserId {
    fn from(raw: String) -> Self {
        UserId::Raw(raw)
    }
}

/// `Brainly` 构造器
#[derive(Default)]
pub struct BrainlyBuilder {
    config: Option<Config>,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<dyn ResultCache>>,
    registry: Option<MirrorRegistry>,
    query: Option<GraphqlQuery>,
}

impl BrainlyBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 自定义缓存；`enable_cache = false` 时不会被使用
    pub fn cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn registry(mut self, registry: MirrorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 直接指定查询文本，跳过本地文件和下载
    pub fn query(mut self, query: GraphqlQuery) -> Self {
        self.query = Some(query);
        self
    }

    /// 构建客户端
    ///
    /// 国家代码无效时返回 `InvalidMirror`，此时不会发出任何网络请求。
    pub async fn build(self) -> Result<Brainly> {
        let config = self.config.unwrap_or_default();
        let registry = self.registry.unwrap_or_default();
        let country = registry.resolve(&config.country)?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(&config)?),
        };

        let query = match self.query {
            Some(q) => q,
            None => GraphqlQuery::load_or_fetch(&config, transport.as_ref()).await?,
        };

        let cache: Option<Arc<dyn ResultCache>> = if config.enable_cache {
            Some(self.cache.unwrap_or_else(|| match config.cache_backend {
                CacheBackend::Memory => Arc::new(MemoryCache::new()),
                CacheBackend::File => Arc::new(FileCache::new(&config.cache_file)),
            }))
        } else {
            None
        };

        logging::log_startup(country.code(), cache.is_some());

        Ok(Brainly {
            country,
            default_count: config.default_result_count,
            client: Arc::new(BrainlyClient::new(
                transport,
                registry,
                query,
                config.user_agent,
            )),
            cache,
        })
    }
}

/// Brainly 查询入口
pub struct Brainly {
    country: Mirror,
    default_count: usize,
    client: Arc<BrainlyClient>,
    cache: Option<Arc<dyn ResultCache>>,
}

impl Brainly {
    pub fn builder() -> BrainlyBuilder {
        BrainlyBuilder::default()
    }

    /// 使用环境变量配置创建客户端，覆盖国家和缓存开关
    pub async fn new(country: &str, enable_cache: bool) -> Result<Self> {
        let config = Config {
            country: country.to_string(),
            enable_cache,
            ..Config::from_env()
        };
        Self::from_config(config).await
    }

    pub async fn from_config(config: Config) -> Result<Self> {
        Self::builder().config(config).build().await
    }

    /// 默认镜像站
    pub fn country(&self) -> Mirror {
        self.country
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn default_count(&self) -> usize {
        self.default_count
    }

    fn registry(&self) -> &MirrorRegistry {
        self.client.registry()
    }

    /// 语言代码是否有效（不区分大小写）
    pub fn is_valid_language(&self, code: &str) -> bool {
        self.registry().is_valid(code)
    }

    /// 镜像站基础 URL
    pub fn base_url(&self, code: &str) -> Result<&str> {
        let mirror = self.registry().resolve(code)?;
        Ok(self.registry().base_url(mirror))
    }

    /// 题目页面 URL
    pub fn question_url(&self, code: &str, database_id: i64) -> Result<String> {
        let mirror = self.registry().resolve(code)?;
        Ok(self.registry().question_url(mirror, database_id))
    }

    /// 批量 GraphQL 请求体
    pub fn request_params(
        &self,
        operation_name: &str,
        variables: serde_json::Value,
    ) -> serde_json::Value {
        self.client.request_params(operation_name, variables)
    }

    /// 清空缓存（未启用缓存时什么也不做）
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
            info!("🧹 缓存已清空");
        }
    }

    /// 某个语言下已缓存的全部题目
    pub fn cached_questions(&self, language: &str) -> Result<BTreeMap<String, Vec<SearchItem>>> {
        let language = self.registry().resolve_language(language)?;
        Ok(self
            .cache
            .as_ref()
            .map(|cache| cache.questions_by_language(language))
            .unwrap_or_default())
    }

    /// 读缓存；文件缓存是阻塞 I/O，放到 blocking 线程池执行
    async fn cached(&self, language: Mirror, question: &str) -> Option<Vec<SearchItem>> {
        let cache = Arc::clone(self.cache.as_ref()?);
        let key = question.to_string();
        let hit = tokio::task::spawn_blocking(move || cache.get(language, &key))
            .await
            .unwrap_or_else(|e| {
                warn!("缓存读取任务异常，按未命中处理: {}", e);
                None
            })?;
        info!(
            "✓ 缓存命中 [{}] {}",
            language,
            logging::truncate_text(question, 40)
        );
        Some(hit)
    }

    async fn store(&self, language: Mirror, question: &str, items: &[SearchItem]) {
        let Some(cache) = self.cache.as_ref().map(Arc::clone) else {
            return;
        };
        let key = question.to_string();
        let items = items.to_vec();
        if let Err(e) =
            tokio::task::spawn_blocking(move || cache.set(language, &key, items)).await
        {
            warn!("缓存写入任务异常: {}", e);
        }
    }

    /// 在默认镜像站上搜索
    pub async fn search(
        &self,
        question: &str,
        language: &str,
        count: usize,
    ) -> Result<Vec<SearchItem>> {
        self.search_with(question, language, count, RequestOptions::default())
            .await
    }

    /// 使用配置中的默认数量搜索
    pub async fn search_default(
        &self,
        question: &str,
        language: &str,
    ) -> Result<Vec<SearchItem>> {
        self.search(question, language, self.default_count).await
    }

    /// 单站搜索
    ///
    /// # 参数
    /// - `question`: 题目文本
    /// - `language`: 目标语言代码
    /// - `count`: 返回数量
    /// - `options`: 指定镜像站或追加请求头
    ///
    /// # 返回
    /// 搜索结果；请求失败不重试
    pub async fn search_with(
        &self,
        question: &str,
        language: &str,
        count: usize,
        options: RequestOptions,
    ) -> Result<Vec<SearchItem>> {
        let language = self.registry().resolve_language(language)?;
        let mirror = match &options.mirror {
            Some(code) => self.registry().resolve(code)?,
            None => self.country,
        };

        if let Some(hit) = self.cached(language, question).await {
            return Ok(hit);
        }

        info!(
            "🔍 搜索 [{} → {}] {}",
            mirror,
            language,
            logging::truncate_text(question, 40)
        );
        let items = self
            .client
            .search_on(mirror, language, question, count, &options)
            .await?;

        self.store(language, question, &items).await;
        Ok(items)
    }

    /// 多站竞速搜索
    pub async fn search_racing(
        &self,
        question: &str,
        language: &str,
        count: usize,
    ) -> Result<Vec<SearchItem>> {
        self.search_racing_with(question, language, count, RequestOptions::default())
            .await
    }

    /// 使用配置中的默认数量竞速搜索
    pub async fn search_racing_default(
        &self,
        question: &str,
        language: &str,
    ) -> Result<Vec<SearchItem>> {
        self.search_racing(question, language, self.default_count).await
    }

    /// 多站竞速搜索：同时向所有镜像站发送，第一个成功的结果胜出
    ///
    /// `options.mirror` 仍会校验，但竞速模式下不生效；请求头对每个镜像站都生效。
    /// 其余仍在进行的请求不会被取消，结果直接丢弃。
    pub async fn search_racing_with(
        &self,
        question: &str,
        language: &str,
        count: usize,
        options: RequestOptions,
    ) -> Result<Vec<SearchItem>> {
        let language = self.registry().resolve_language(language)?;
        if let Some(code) = &options.mirror {
            self.registry().resolve(code)?;
        }

        if let Some(hit) = self.cached(language, question).await {
            return Ok(hit);
        }

        info!(
            "🏁 竞速搜索 [{}] {} 个镜像站: {}",
            language,
            self.registry().mirrors().len(),
            logging::truncate_text(question, 40)
        );

        let options = Arc::new(options);
        let question_owned: Arc<str> = Arc::from(question);
        let items = self
            .race(|client, mirror| {
                let options = Arc::clone(&options);
                let question = Arc::clone(&question_owned);
                async move {
                    client
                        .search_on(mirror, language, &question, count, &options)
                        .await
                        .map(Some)
                }
                .boxed()
            })
            .await?
            .ok_or_else(|| BrainlyError::AllMirrorsFailed { attempts: Vec::new() })?;

        // 第一个成功结果即写入缓存，不等待其余镜像站
        self.store(language, question, &items).await;
        Ok(items)
    }

    /// 按 ID 查找用户
    ///
    /// 向所有镜像站同时查询，第一个返回用户的镜像站胜出。
    /// 全部完成且至少一个镜像站明确返回"无此用户"时为 `Ok(None)`。
    pub async fn find_user_by_id(
        &self,
        country: &str,
        user_id: impl Into<UserId>,
    ) -> Result<Option<Author>> {
        let language = self.registry().resolve(country)?;
        let user_id = user_id.into().database_id()?;

        debug!("查找用户 {} [{}]", user_id, language);
        self.race(|client, mirror| {
            async move { client.find_user_on(mirror, language, user_id).await }.boxed()
        })
        .await
    }

    /// 在所有已注册镜像站上竞速执行同一个操作
    ///
    /// `Ok(Some)` 立即胜出；`Ok(None)` 记为"无结果"；错误记入尝试列表。
    /// 全部结束时：有"无结果"则返回 `Ok(None)`，否则 `AllMirrorsFailed`。
    async fn race<T, F>(&self, make: F) -> Result<Option<T>>
    where
        T: Send + 'static,
        F: Fn(Arc<BrainlyClient>, Mirror) -> BoxFuture<'static, Result<Option<T>>>,
    {
        let mut join_set = JoinSet::new();
        for mirror in self.registry().mirrors() {
            let task = make(Arc::clone(&self.client), mirror);
            join_set.spawn(async move { (mirror, task.await) });
        }

        let mut attempts = Vec::new();
        let mut saw_empty = false;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((mirror, Ok(Some(value)))) => {
                    info!("✓ 镜像站 {} 胜出", mirror);
                    join_set.detach_all();
                    return Ok(Some(value));
                }
                Ok((mirror, Ok(None))) => {
                    debug!("镜像站 {} 无结果", mirror);
                    saw_empty = true;
                }
                Ok((mirror, Err(e))) => {
                    warn!("镜像站 {} 失败: {}", mirror, e);
                    attempts.push((mirror.code().to_string(), e.to_string()));
                }
                Err(e) => {
                    warn!("镜像站任务异常退出: {}", e);
                    attempts.push(("?".to_string(), e.to_string()));
                }
            }
        }

        if saw_empty {
            return Ok(None);
        }
        Err(BrainlyError::AllMirrorsFailed { attempts })
    }
}
