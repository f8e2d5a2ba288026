use async_trait::async_trait;
use brainly_scraper::model::Mirror;
use brainly_scraper::{
    Brainly, BrainlyError, CacheBackend, Config, GraphqlQuery, MemoryCache, MirrorRegistry,
    RequestFailure, RequestOptions, ResultCache, SearchItem, Transport, TransportRequest,
};
use serde_json::{json, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

/// 按镜像站返回预设响应的传输层，并统计请求次数
#[derive(Default)]
struct StubTransport {
    replies: HashMap<Mirror, JsonValue>,
    calls: AtomicUsize,
    last_body: Mutex<Option<JsonValue>>,
}

impl StubTransport {
    fn with(mut self, mirror: Mirror, reply: JsonValue) -> Self {
        self.replies.insert(mirror, reply);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_body(&self) -> Option<JsonValue> {
        self.last_body.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: TransportRequest) -> brainly_scraper::Result<JsonValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = request.body.clone();
        let registry = MirrorRegistry::new();
        let mirror = Mirror::ALL
            .into_iter()
            .find(|m| {
                request
                    .url
                    .starts_with(&format!("{}/graphql/", registry.base_url(*m)))
            });

        match mirror.and_then(|m| self.replies.get(&m)) {
            Some(reply) => Ok(reply.clone()),
            None => Err(BrainlyError::request_failed(
                &request.url,
                RequestFailure::Status(503),
            )),
        }
    }

    async fn fetch_text(&self, _url: &str) -> brainly_scraper::Result<String> {
        Ok("query SearchQuery { stub }".to_string())
    }
}

fn author(id: &str, nick: &str) -> JsonValue {
    json!({
        "id": id,
        "nick": nick,
        "friends": { "count": 0 },
        "questions": { "count": 0, "edges": [] }
    })
}

fn no_comments() -> JsonValue {
    json!({ "count": 0, "edges": [] })
}

fn question_node(id: &str, content: &str) -> JsonValue {
    json!({
        "id": id,
        "content": content,
        "points": 10,
        "created": "2021-05-01T10:00:00+07:00",
        "subject": { "name": "Matematika" },
        "grade": { "name": "SMP" },
        "author": author("VXNlcjo3", "budi"),
        "answers": { "hasVerified": false, "nodes": [] },
        "similar": null
    })
}

fn search_payload() -> JsonValue {
    let mut sari = author("VXNlcjo0Mg==", "sari");
    sari["rank"] = json!({ "name": "Jenius" });

    let mut node = question_node("cXVlc3Rpb246MTAx", "<p>Apa itu <b>teorema</b> Pythagoras?</p>");
    node["answers"] = json!({
        "hasVerified": true,
        "nodes": [
            {
                "id": "QW5zd2VyOjE=",
                "content": "a<sup>2</sup> + b<sup>2</sup> = c<sup>2</sup><br/>",
                "isBest": true,
                "qualityScore": 4.5,
                "author": sari,
                "comments": no_comments()
            },
            {
                "id": "QW5zd2VyOjI=",
                "content": "[tex]c = \\sqrt{a^2+b^2}[/tex]",
                "author": null,
                "comments": no_comments()
            }
        ]
    });
    json!([{ "data": { "questionSearch": { "edges": [{ "node": node }] } } }])
}

/// 三条结果，数字 ID 故意不按大小排列
fn multi_edge_payload() -> JsonValue {
    let edges: Vec<JsonValue> = [
        ("cXVlc3Rpb246MTAy", "kedua"),
        ("cXVlc3Rpb246MTAx", "pertama"),
        ("cXVlc3Rpb246OQ==", "ketiga"),
    ]
    .into_iter()
    .map(|(id, content)| json!({ "node": question_node(id, content) }))
    .collect();
    json!([{ "data": { "questionSearch": { "edges": edges } } }])
}

fn user_payload() -> JsonValue {
    let mut user = author("VXNlcjo0Mg==", "sari");
    user["points"] = json!(900);
    json!({ "data": { "userById": user } })
}

fn memory_config() -> Config {
    Config {
        country: "id".to_string(),
        enable_cache: true,
        cache_backend: CacheBackend::Memory,
        ..Config::default()
    }
}

async fn brainly(transport: Arc<StubTransport>, config: Config) -> Brainly {
    assert_ok!(
        Brainly::builder()
            .config(config)
            .transport(transport)
            .query(GraphqlQuery::from_text("query SearchQuery { stub }"))
            .build()
            .await
    )
}

#[tokio::test]
async fn test_invalid_codes_never_reach_transport() {
    let transport = Arc::new(StubTransport::default().with(Mirror::Id, search_payload()));
    let client = brainly(transport.clone(), memory_config()).await;

    let err = assert_err!(client.search("pythagoras", "xx", 10).await);
    assert!(matches!(err, BrainlyError::InvalidLanguage { .. }));
    assert_eq!(err.offending_code(), Some("xx"));

    let err = assert_err!(client.search_racing("pythagoras", "zz", 10).await);
    assert!(matches!(err, BrainlyError::InvalidLanguage { .. }));

    let options = RequestOptions::new().mirror("mars");
    let err = assert_err!(client.search_with("pythagoras", "id", 10, options).await);
    assert!(matches!(err, BrainlyError::InvalidMirror { .. }));

    let err = assert_err!(client.find_user_by_id("xx", 42i64).await);
    assert!(err.is_validation_error());

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_invalid_country_fails_at_build() {
    let transport = Arc::new(StubTransport::default());
    let config = Config {
        country: "atlantis".to_string(),
        ..memory_config()
    };
    let result = Brainly::builder()
        .config(config)
        .transport(transport.clone())
        .query(GraphqlQuery::from_text("q"))
        .build()
        .await;

    assert!(matches!(result, Err(BrainlyError::InvalidMirror { .. })));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_single_mirror_search_converts_payload() {
    let transport = Arc::new(StubTransport::default().with(Mirror::Id, search_payload()));
    let client = brainly(transport.clone(), memory_config()).await;

    let items = assert_ok!(client.search("pythagoras", "id", 10).await);
    assert_eq!(items.len(), 1);

    let item = &items[0];
    assert_eq!(item.question.id, "question:101");
    assert_eq!(item.question.database_id, 101);
    assert_eq!(item.question.content, "Apa itu teorema Pythagoras?");
    assert_eq!(item.question.education, "Matematika");
    assert!(item.question.verified_answer);
    assert!(item.question.similars.is_empty());

    assert_eq!(item.answers.len(), 2);
    let first = &item.answers[0];
    assert_eq!(first.author.as_ref().map(|a| a.rank.as_str()), Some("Jenius"));
    assert_eq!(first.score, 4.5);
    assert!(item.answers[1].author.is_none());
    assert_eq!(item.answers[1].score, 0.0);

    for content in item.answers.iter().map(|a| a.content.as_str()) {
        assert!(!content.contains('<'), "残留标签: {content}");
    }
    assert_eq!(item.answers[0].content, "a2 + b2 = c2\n");
    assert_eq!(item.answers[1].content, "c = \\sqrt{a^2+b^2}");

    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_cache_hit_skips_network() {
    let transport = Arc::new(StubTransport::default().with(Mirror::Id, search_payload()));
    let client = brainly(transport.clone(), memory_config()).await;

    let first = assert_ok!(client.search("Pythagoras", "id", 10).await);
    let second = assert_ok!(client.search("PYTHAGORAS", "ID", 10).await);
    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);

    let cached = assert_ok!(client.cached_questions("id"));
    assert!(cached.contains_key("pythagoras"));

    client.clear_cache();
    assert_ok!(client.search("pythagoras", "id", 10).await);
    assert_eq!(transport.calls(), 2);
}

/// 统计读操作次数的缓存
#[derive(Default)]
struct CountingCache {
    inner: MemoryCache,
    has_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl ResultCache for CountingCache {
    fn has(&self, mirror: Mirror, question: &str) -> bool {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.has(mirror, question)
    }

    fn get(&self, mirror: Mirror, question: &str) -> Option<Vec<SearchItem>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(mirror, question)
    }

    fn set(&self, mirror: Mirror, question: &str, results: Vec<SearchItem>) {
        self.inner.set(mirror, question, results)
    }

    fn clear(&self) {
        self.inner.clear()
    }

    fn questions_by_language(&self, mirror: Mirror) -> BTreeMap<String, Vec<SearchItem>> {
        self.inner.questions_by_language(mirror)
    }
}

#[tokio::test]
async fn test_cache_lookup_is_a_single_read() {
    let transport = Arc::new(StubTransport::default().with(Mirror::Id, search_payload()));
    let cache = Arc::new(CountingCache::default());
    let client = assert_ok!(
        Brainly::builder()
            .config(memory_config())
            .transport(transport.clone())
            .cache(cache.clone())
            .query(GraphqlQuery::from_text("query SearchQuery { stub }"))
            .build()
            .await
    );

    assert_ok!(client.search("pythagoras", "id", 10).await);
    assert_ok!(client.search_racing("Pythagoras", "id", 10).await);

    assert_eq!(transport.calls(), 1);
    assert_eq!(cache.get_calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.has_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cache_disabled_always_dispatches() {
    let transport = Arc::new(StubTransport::default().with(Mirror::Id, search_payload()));
    let config = Config {
        enable_cache: false,
        ..memory_config()
    };
    let client = brainly(transport.clone(), config).await;
    assert!(!client.cache_enabled());

    assert_ok!(client.search("pythagoras", "id", 10).await);
    assert_ok!(client.search("pythagoras", "id", 10).await);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_single_mirror_failure_is_not_retried() {
    let transport = Arc::new(StubTransport::default().with(Mirror::Ph, search_payload()));
    let client = brainly(transport.clone(), memory_config()).await;

    let err = assert_err!(client.search("pythagoras", "id", 10).await);
    assert!(matches!(err, BrainlyError::RequestFailed { .. }));
    assert_eq!(transport.calls(), 1);

    // 指定镜像站后走 ph
    let options = RequestOptions::new().mirror("PH");
    let items = assert_ok!(client.search_with("pythagoras", "id", 10, options).await);
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_racing_takes_the_only_success() {
    let transport = Arc::new(
        StubTransport::default()
            .with(Mirror::Ru, json!([{ "errors": [{ "message": "INVALID_LANGUAGE" }] }]))
            .with(Mirror::Ph, search_payload()),
    );
    let client = brainly(transport.clone(), memory_config()).await;

    let items = assert_ok!(client.search_racing("pythagoras", "id", 10).await);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].answers.len(), 2);

    // 胜出结果已写入缓存
    let again = assert_ok!(client.search_racing("pythagoras", "id", 10).await);
    assert_eq!(items, again);
    assert!(transport.calls() <= Mirror::ALL.len());
}

#[tokio::test]
async fn test_racing_all_failed() {
    let transport = Arc::new(
        StubTransport::default().with(Mirror::Tr, json!({ "err": "INVALID_LANGUAGE" })),
    );
    let client = brainly(transport.clone(), memory_config()).await;

    let err = assert_err!(client.search_racing("pythagoras", "id", 10).await);
    match err {
        BrainlyError::AllMirrorsFailed { attempts } => {
            assert_eq!(attempts.len(), Mirror::ALL.len());
            assert!(attempts.iter().any(|(m, _)| m == "tr"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(transport.calls(), Mirror::ALL.len());
}

#[tokio::test]
async fn test_results_keep_site_order() {
    let transport = Arc::new(StubTransport::default().with(Mirror::Id, multi_edge_payload()));
    let client = brainly(transport, memory_config()).await;

    let items = assert_ok!(client.search("urutan", "id", 3).await);
    let ids: Vec<i64> = items.iter().map(|i| i.question.database_id).collect();
    assert_eq!(ids, vec![102, 101, 9]);

    let contents: Vec<&str> = items.iter().map(|i| i.question.content.as_str()).collect();
    assert_eq!(contents, vec!["kedua", "pertama", "ketiga"]);
}

#[tokio::test]
async fn test_racing_tolerates_malformed_mirror() {
    let transport = Arc::new(
        StubTransport::default()
            .with(Mirror::Id, json!([{ "data": { "questionSearch": null } }]))
            .with(Mirror::Es, json!([{ "data": { "questionSearch": { "edges": [{
                "node": { "id": "cXVlc3Rpb246MTAx", "content": "tanpa answers" }
            }]}}}]))
            .with(Mirror::Fr, multi_edge_payload()),
    );
    let client = brainly(transport, memory_config()).await;

    let items = assert_ok!(client.search_racing("urutan", "id", 3).await);
    let ids: Vec<i64> = items.iter().map(|i| i.question.database_id).collect();
    assert_eq!(ids, vec![102, 101, 9]);
}

#[tokio::test]
async fn test_racing_validates_requested_mirror() {
    let transport = Arc::new(StubTransport::default().with(Mirror::Id, search_payload()));
    let client = brainly(transport.clone(), memory_config()).await;

    let options = RequestOptions::new().mirror("mars");
    let err = assert_err!(client.search_racing_with("pythagoras", "id", 10, options).await);
    assert!(matches!(err, BrainlyError::InvalidMirror { .. }));
    assert_eq!(err.offending_code(), Some("mars"));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_default_count_is_sent() {
    let transport = Arc::new(StubTransport::default().with(Mirror::Id, search_payload()));
    let config = Config {
        default_result_count: 7,
        enable_cache: false,
        ..memory_config()
    };
    let client = brainly(transport.clone(), config).await;
    assert_eq!(client.default_count(), 7);

    let items = assert_ok!(client.search_default("pythagoras", "id").await);
    assert_eq!(items.len(), 1);
    assert_eq!(transport.calls(), 1);

    let last = transport.last_body().unwrap();
    assert_eq!(last[0]["variables"]["first"], 7);
}

#[tokio::test]
async fn test_find_user_by_id() {
    let transport = Arc::new(
        StubTransport::default()
            .with(Mirror::Id, json!({ "data": { "userById": null } }))
            .with(Mirror::Pl, user_payload()),
    );
    let client = brainly(transport, memory_config()).await;

    let user = assert_ok!(client.find_user_by_id("id", "User:42").await).unwrap();
    assert_eq!(user.id, "User:42");
    assert_eq!(user.database_id, 42);
    assert_eq!(user.username.as_deref(), Some("sari"));
    assert_eq!(user.rank, "-");

    let user = assert_ok!(client.find_user_by_id("id", "VXNlcjo0Mg==").await);
    assert!(user.is_some());
}

#[tokio::test]
async fn test_find_user_absent_or_unreachable() {
    let transport = Arc::new(
        StubTransport::default().with(Mirror::Us, json!({ "data": { "userById": null } })),
    );
    let client = brainly(transport, memory_config()).await;
    let user = assert_ok!(client.find_user_by_id("us", 1i64).await);
    assert!(user.is_none());

    let client = brainly(Arc::new(StubTransport::default()), memory_config()).await;
    let err = assert_err!(client.find_user_by_id("us", 1i64).await);
    assert!(matches!(err, BrainlyError::AllMirrorsFailed { .. }));
}

#[tokio::test]
async fn test_helpers() {
    let client = brainly(Arc::new(StubTransport::default()), memory_config()).await;

    assert!(client.is_valid_language("PL"));
    assert!(!client.is_valid_language("xx"));
    assert_eq!(assert_ok!(client.base_url("tr")), "https://eodev.com");
    assert_eq!(
        assert_ok!(client.question_url("id", 101)),
        "https://brainly.co.id/tugas/101"
    );
    assert_eq!(
        assert_ok!(client.question_url("us", 5)),
        "https://brainly.com/question/5"
    );

    let params = client.request_params("SearchQuery", json!({ "query": "x" }));
    assert_eq!(params[0]["query"], "query SearchQuery { stub }");
}

#[tokio::test]
#[ignore] // 需要网络：cargo test -- --ignored
async fn test_live_racing_search() {
    brainly_scraper::utils::logging::init();

    let client = Brainly::new("id", false).await.expect("创建客户端失败");
    let items = client
        .search_racing("Pythagoras", "id", 3)
        .await
        .expect("竞速搜索失败");

    assert!(!items.is_empty(), "应该至少返回一条结果");
}
