//! 站点 GraphQL 原始响应结构
//!
//! 这里只做反序列化校验：必需字段缺失时 serde 报错，由调用方包装为
//! `MalformedResponse`。可选字段和 `null` 列表在这里统一收敛。

use serde::{Deserialize, Deserializer};

use super::entities::{AnswerStreak, CommentAuthor, Verification};

/// `null` 和缺失都视为默认值
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// GraphQL 连接中的一条边
#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttachment {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNamed {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
}

/// 科目：新版接口返回 name，旧版只有 slug
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubject {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub slug: String,
}

impl RawSubject {
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.slug
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAvatar {
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCount {
    #[serde(default, deserialize_with = "null_default")]
    pub count: i64,
}

/// 用户节点
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuthor {
    pub id: String,
    #[serde(default)]
    pub database_id: Option<i64>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub avatar: Option<RawAvatar>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub helped_users_count: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub gender: String,
    #[serde(default, deserialize_with = "null_default")]
    pub created: String,
    #[serde(default, deserialize_with = "null_default")]
    pub special_ranks: Vec<RawNamed>,
    #[serde(default, deserialize_with = "null_default")]
    pub best_answers_count: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub received_thanks: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub points: i64,
    #[serde(default)]
    pub rank: Option<RawNamed>,
    pub friends: RawCount,
    #[serde(default)]
    pub answering_streak: Option<AnswerStreak>,
    #[serde(
        rename = "bestAnswersCountInLast30Days",
        default,
        deserialize_with = "null_default"
    )]
    pub best_answers_count_in_last_30_days: i64,
    pub questions: RawAuthorQuestions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAuthorQuestions {
    #[serde(default, deserialize_with = "null_default")]
    pub count: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub edges: Vec<RawEdge<RawAuthorQuestion>>,
}

/// 用户提问列表中的精简题目节点
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuthorQuestion {
    pub content: String,
    #[serde(default)]
    pub grade: Option<RawNamed>,
    #[serde(default)]
    pub subject: Option<RawSubject>,
    #[serde(default, deserialize_with = "null_default")]
    pub points: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub points_for_best_answer: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub points_for_answer: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub is_closed: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub can_be_answered: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub created: String,
    #[serde(default, deserialize_with = "null_default")]
    pub attachments: Vec<RawAttachment>,
    #[serde(default)]
    pub edu_level: Option<i64>,
}

/// 评论节点
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    pub id: String,
    #[serde(default)]
    pub deleted: Option<bool>,
    pub content: String,
    #[serde(default)]
    pub author: Option<CommentAuthor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCommentConnection {
    #[serde(default, deserialize_with = "null_default")]
    pub count: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub edges: Vec<RawEdge<RawComment>>,
}

/// 回答节点
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnswer {
    pub id: String,
    pub content: String,
    #[serde(default, deserialize_with = "null_default")]
    pub created: String,
    #[serde(default, deserialize_with = "null_default")]
    pub is_best: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub is_confirmed: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub points: i64,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub thanks_count: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub rates_count: i64,
    #[serde(default)]
    pub author: Option<RawAuthor>,
    #[serde(default)]
    pub verification: Option<Verification>,
    #[serde(default, deserialize_with = "null_default")]
    pub attachments: Vec<RawAttachment>,
    #[serde(default, deserialize_with = "null_default")]
    pub can_comment: bool,
    pub comments: RawCommentConnection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnswerConnection {
    #[serde(default, deserialize_with = "null_default")]
    pub has_verified: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub nodes: Vec<RawAnswer>,
}

/// 相似题目
///
/// 在解析边界上区分"响应带有相似题目"和"没有"，转换时不再探测字段。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Option<RawSimilarBlock>")]
pub enum SimilarQuestions {
    #[default]
    Absent,
    Present(Vec<RawQuestion>),
}

/// 站点返回的两种相似题目结构
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSimilarBlock {
    /// `{ "question": [ ... ] }`
    Grouped {
        #[serde(default, deserialize_with = "null_default")]
        question: Vec<RawQuestion>,
    },
    /// `[ { "question": { ... } }, ... ]`
    Entries(Vec<RawSimilarEntry>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSimilarEntry {
    pub question: RawQuestion,
}

impl From<Option<RawSimilarBlock>> for SimilarQuestions {
    fn from(block: Option<RawSimilarBlock>) -> Self {
        match block {
            None => SimilarQuestions::Absent,
            Some(RawSimilarBlock::Grouped { question }) => SimilarQuestions::Present(question),
            Some(RawSimilarBlock::Entries(entries)) => {
                SimilarQuestions::Present(entries.into_iter().map(|e| e.question).collect())
            }
        }
    }
}

/// 题目节点
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<RawAuthor>,
    #[serde(default, deserialize_with = "null_default")]
    pub attachments: Vec<RawAttachment>,
    #[serde(default, deserialize_with = "null_default")]
    pub points: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub points_for_answer: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub points_for_best_answer: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub created: String,
    #[serde(default, deserialize_with = "null_default")]
    pub is_closed: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub can_be_answered: bool,
    pub grade: RawNamed,
    #[serde(default)]
    pub last_activity: Option<String>,
    pub subject: RawSubject,
    #[serde(default)]
    pub edu_level: Option<i64>,
    pub answers: RawAnswerConnection,
    #[serde(default)]
    pub similar: SimilarQuestions,
}

/// GraphQL 错误项
#[derive(Debug, Clone, Deserialize)]
pub struct RawGraphqlError {
    #[serde(default)]
    pub message: String,
}

/// 单个 GraphQL 操作的响应
#[derive(Debug, Clone, Deserialize)]
pub struct RawEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchData {
    pub question_search: RawQuestionSearch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestionSearch {
    pub edges: Vec<RawEdge<RawQuestion>>,
}

/// 用户查询响应：新接口用 `userById`，旧接口用 `user`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserData {
    #[serde(default)]
    pub user_by_id: Option<RawAuthor>,
    #[serde(default)]
    pub user: Option<RawAuthor>,
}

impl RawUserData {
    pub fn into_author(self) -> Option<RawAuthor> {
        self.user_by_id.or(self.user)
    }
}
