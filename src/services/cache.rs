//! 结果缓存 - 业务能力层
//!
//! 键为（镜像站，小写题目文本），同一个键只保存第一次写入的值。
//! 缓存只用于加速：任何存储层错误都按"未命中"处理，不会让请求失败。

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use tracing::{debug, warn};

use crate::model::{Mirror, SearchItem};

/// 缓存接口
pub trait ResultCache: Send + Sync {
    /// 是否已有该键
    fn has(&self, mirror: Mirror, question: &str) -> bool;

    /// 读取缓存的结果
    fn get(&self, mirror: Mirror, question: &str) -> Option<Vec<SearchItem>>;

    /// 写入结果；键已存在时不做任何事
    fn set(&self, mirror: Mirror, question: &str, results: Vec<SearchItem>);

    /// 清空全部缓存
    fn clear(&self);

    /// 某个镜像站下缓存的全部题目
    fn questions_by_language(&self, mirror: Mirror) -> BTreeMap<String, Vec<SearchItem>>;
}

/// 题目文本归一化（大小写折叠）
pub fn normalize_question(question: &str) -> String {
    question.to_lowercase()
}

/// 组合键：`mirror + "\0" + 小写题目`
pub fn composite_key(mirror: Mirror, question: &str) -> String {
    format!("{}\u{0}{}", mirror.code(), normalize_question(question))
}

/// 内存缓存
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<SearchItem>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultCache for MemoryCache {
    fn has(&self, mirror: Mirror, question: &str) -> bool {
        self.entries
            .read()
            .map(|map| map.contains_key(&composite_key(mirror, question)))
            .unwrap_or(false)
    }

    fn get(&self, mirror: Mirror, question: &str) -> Option<Vec<SearchItem>> {
        self.entries
            .read()
            .ok()?
            .get(&composite_key(mirror, question))
            .cloned()
    }

    fn set(&self, mirror: Mirror, question: &str, results: Vec<SearchItem>) {
        match self.entries.write() {
            Ok(mut map) => {
                map.entry(composite_key(mirror, question)).or_insert(results);
            }
            Err(e) => warn!("内存缓存写入失败: {}", e),
        }
    }

    fn clear(&self) {
        if let Ok(mut map) = self.entries.write() {
            map.clear();
        }
    }

    fn questions_by_language(&self, mirror: Mirror) -> BTreeMap<String, Vec<SearchItem>> {
        let prefix = format!("{}\u{0}", mirror.code());
        let Ok(map) = self.entries.read() else {
            return BTreeMap::new();
        };
        map.iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|question| (question.to_string(), value.clone()))
            })
            .collect()
    }
}

/// 磁盘上的缓存文档：`{ "<镜像站>": { "<小写题目>": [...] } }`
type CacheDocument = BTreeMap<String, BTreeMap<String, Vec<SearchItem>>>;

/// 文件缓存
///
/// 整个缓存保存在一个 JSON 文件中，默认放在系统临时目录，重启后自然失效。
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCache {
    /// 默认文件名
    pub const DEFAULT_FILE_NAME: &'static str = "brainly-scraper2-cache.json";

    /// 使用指定文件创建缓存；文件不存在时写入空文档
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let cache = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };
        if !cache.path.exists() {
            cache.write_document(&CacheDocument::new());
        }
        cache
    }

    /// 系统临时目录下的默认缓存文件
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(Self::DEFAULT_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> CacheDocument {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("读取缓存文件失败 {}: {}", self.path.display(), e);
                return CacheDocument::new();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("缓存文件已损坏，按空缓存处理 {}: {}", self.path.display(), e);
            CacheDocument::new()
        })
    }

    fn write_document(&self, doc: &CacheDocument) {
        let result = serde_json::to_string(doc)
            .map_err(std::io::Error::other)
            .and_then(|json| {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&self.path, json)
            });
        if let Err(e) = result {
            warn!("写入缓存文件失败 {}: {}", self.path.display(), e);
        }
    }
}

impl ResultCache for FileCache {
    fn has(&self, mirror: Mirror, question: &str) -> bool {
        self.read_document()
            .get(mirror.code())
            .is_some_and(|m| m.contains_key(&normalize_question(question)))
    }

    fn get(&self, mirror: Mirror, question: &str) -> Option<Vec<SearchItem>> {
        self.read_document()
            .remove(mirror.code())?
            .remove(&normalize_question(question))
    }

    fn set(&self, mirror: Mirror, question: &str, results: Vec<SearchItem>) {
        // 读-改-写 需要串行，否则并发写入会互相覆盖
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut doc = self.read_document();
        let bucket = doc.entry(mirror.code().to_string()).or_default();
        let key = normalize_question(question);
        if bucket.contains_key(&key) {
            return;
        }
        bucket.insert(key, results);
        self.write_document(&doc);
    }

    fn clear(&self) {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.write_document(&CacheDocument::new());
    }

    fn questions_by_language(&self, mirror: Mirror) -> BTreeMap<String, Vec<SearchItem>> {
        self.read_document()
            .remove(mirror.code())
            .unwrap_or_default()
    }
}
