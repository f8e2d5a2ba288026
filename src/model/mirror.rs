//! 镜像站注册表
//!
//! 固定的镜像站集合以及每个镜像站的基础 URL。所有发起网络请求的代码都必须
//! 先经过这里校验。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{BrainlyError, Result};

/// 镜像站代码 → 基础 URL
static BASE_URLS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "id" => "https://brainly.co.id",
    "us" => "https://brainly.com",
    "es" => "https://brainly.lat",
    "pt" => "https://brainly.com.br",
    "ru" => "https://znanija.com",
    "ro" => "https://brainly.ro",
    "tr" => "https://eodev.com",
    "ph" => "https://brainly.ph",
    "pl" => "https://brainly.pl",
    "hi" => "https://brainly.in",
    "fr" => "https://nosdevoirs.fr",
};

/// 镜像站代码 → 内容 URL 中使用的"作业"一词
static WORK_NAMES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "id" => "tugas",
    "pl" => "zadanie",
    "pt" => "tarefa",
    "es" => "tarea",
    "tr" => "gorev",
    "ro" => "tema",
    "ru" => "task",
};

/// 未列出的镜像站统一使用的词
pub const DEFAULT_WORK_NAME: &str = "question";

/// 镜像站枚举
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mirror {
    /// 印度尼西亚
    Id,
    /// 美国
    Us,
    /// 拉丁美洲（西班牙语）
    Es,
    /// 巴西
    Pt,
    /// 俄罗斯
    Ru,
    /// 罗马尼亚
    Ro,
    /// 土耳其
    Tr,
    /// 菲律宾
    Ph,
    /// 波兰
    Pl,
    /// 印度
    Hi,
    /// 法国
    Fr,
}

impl Mirror {
    /// 全部镜像站（注册顺序）
    pub const ALL: [Mirror; 11] = [
        Mirror::Id,
        Mirror::Us,
        Mirror::Es,
        Mirror::Pt,
        Mirror::Ru,
        Mirror::Ro,
        Mirror::Tr,
        Mirror::Ph,
        Mirror::Pl,
        Mirror::Hi,
        Mirror::Fr,
    ];

    /// 获取镜像站代码
    pub fn code(self) -> &'static str {
        match self {
            Mirror::Id => "id",
            Mirror::Us => "us",
            Mirror::Es => "es",
            Mirror::Pt => "pt",
            Mirror::Ru => "ru",
            Mirror::Ro => "ro",
            Mirror::Tr => "tr",
            Mirror::Ph => "ph",
            Mirror::Pl => "pl",
            Mirror::Hi => "hi",
            Mirror::Fr => "fr",
        }
    }

    /// 从代码解析镜像站（不区分大小写）
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        Mirror::ALL.into_iter().find(|m| m.code() == code)
    }

    /// 默认基础 URL
    pub fn default_base_url(self) -> &'static str {
        // BASE_URLS 与 ALL 一一对应
        BASE_URLS.get(self.code()).copied().unwrap_or_default()
    }

    /// 内容 URL 中使用的"作业"一词
    pub fn work_name(self) -> &'static str {
        resolve_work_name(self.code())
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Mirror {
    type Err = BrainlyError;

    fn from_str(s: &str) -> Result<Self> {
        Mirror::from_code(s).ok_or_else(|| BrainlyError::InvalidMirror {
            code: s.to_string(),
        })
    }
}

/// 判断代码是否为合法镜像站（不区分大小写）
pub fn is_valid_mirror(code: &str) -> bool {
    BASE_URLS.contains_key(code.trim().to_lowercase().as_str())
}

/// 把镜像站代码解析为内容 URL 中的"作业"一词
///
/// 未列出的代码一律返回 [`DEFAULT_WORK_NAME`]。
pub fn resolve_work_name(code: &str) -> &'static str {
    WORK_NAMES
        .get(code.trim().to_lowercase().as_str())
        .copied()
        .unwrap_or(DEFAULT_WORK_NAME)
}

/// 镜像站注册表
///
/// 不可变，构造后在各组件间共享。默认使用内置 URL 表，测试或代理场景可以覆盖单个镜像站的地址。
#[derive(Debug, Clone)]
pub struct MirrorRegistry {
    base_urls: BTreeMap<Mirror, String>,
}

impl MirrorRegistry {
    /// 使用内置 URL 表创建注册表
    pub fn new() -> Self {
        let base_urls = Mirror::ALL
            .into_iter()
            .map(|m| (m, m.default_base_url().to_string()))
            .collect();
        Self { base_urls }
    }

    /// 覆盖某个镜像站的基础 URL
    pub fn with_base_url(mut self, mirror: Mirror, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_urls
            .insert(mirror, url.trim_end_matches('/').to_string());
        self
    }

    /// 已注册的全部镜像站
    pub fn mirrors(&self) -> Vec<Mirror> {
        self.base_urls.keys().copied().collect()
    }

    /// 代码是否在注册表内
    pub fn is_valid(&self, code: &str) -> bool {
        Mirror::from_code(code).is_some_and(|m| self.base_urls.contains_key(&m))
    }

    /// 校验并解析镜像站代码
    pub fn resolve(&self, code: &str) -> Result<Mirror> {
        match Mirror::from_code(code) {
            Some(m) if self.base_urls.contains_key(&m) => Ok(m),
            _ => Err(BrainlyError::InvalidMirror {
                code: code.to_string(),
            }),
        }
    }

    /// 校验并解析语言代码
    pub fn resolve_language(&self, code: &str) -> Result<Mirror> {
        self.resolve(code).map_err(|_| BrainlyError::InvalidLanguage {
            code: code.to_string(),
        })
    }

    /// 获取镜像站的基础 URL
    pub fn base_url(&self, mirror: Mirror) -> &str {
        self.base_urls
            .get(&mirror)
            .map(String::as_str)
            .unwrap_or_else(|| mirror.default_base_url())
    }

    /// GraphQL 端点：`<base>/graphql/<language>`
    pub fn graphql_endpoint(&self, mirror: Mirror, language: Mirror) -> String {
        format!("{}/graphql/{}", self.base_url(mirror), language.code())
    }

    /// 题目页面 URL：`<base>/<作业词>/<数字 ID>`
    pub fn question_url(&self, mirror: Mirror, database_id: i64) -> String {
        format!(
            "{}/{}/{}",
            self.base_url(mirror),
            mirror.work_name(),
            database_id
        )
    }
}

impl Default for MirrorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
