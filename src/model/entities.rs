use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// 创建时间：原始字符串 + 解析后的时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub iso: String,
    /// 无法解析时为 None
    pub date: Option<DateTime<FixedOffset>>,
}

impl Timestamp {
    pub fn parse(iso: &str) -> Self {
        Self {
            iso: iso.to_string(),
            date: DateTime::parse_from_rfc3339(iso).ok(),
        }
    }
}

/// 回答题目可获得的积分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointsAnswer {
    pub for_best: i64,
    pub normal: i64,
}

/// 题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// 解码后的 ID，形如 `question:123`
    pub id: String,
    pub database_id: i64,
    /// 清理后的题目内容
    pub content: String,
    pub closed: bool,
    pub created: Timestamp,
    /// 附件 URL，可能为空列表
    pub attachments: Vec<String>,
    /// 提问者，账号被删除时为 None
    pub author: Option<Author>,
    /// 科目
    pub education: String,
    pub education_level: Option<i64>,
    pub can_be_answered: bool,
    pub points_answer: PointsAnswer,
    /// 提问者悬赏的积分
    pub points_question: i64,
    /// 年级
    pub grade: String,
    pub last_activity: Option<String>,
    /// 是否至少有一个回答被认证
    pub verified_answer: bool,
    /// 相似题目
    pub similars: Vec<Question>,
}

/// 回答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: String,
    pub database_id: i64,
    pub content: String,
    /// 回答者，账号被删除时为 None
    pub author: Option<Author>,
    pub is_best: bool,
    pub points: i64,
    pub confirmed: bool,
    /// 质量评分，缺失时为 0
    pub score: f64,
    pub rates_count: i64,
    pub thanks_count: i64,
    pub attachments: Vec<String>,
    pub created: Timestamp,
    pub can_comment: bool,
    pub verification: Option<Verification>,
    pub comments: Vec<Comment>,
}

/// 用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// 解码后的 ID，形如 `user:123`
    pub id: String,
    /// 站点原始的 base64 ID
    pub raw_id: String,
    pub database_id: i64,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    /// 等级名称，缺失时为 `-`
    pub rank: String,
    pub description: Option<String>,
    pub gender: String,
    pub points: i64,
    pub received_thanks: i64,
    pub best_answers_count: i64,
    pub helped_users_count: i64,
    pub special_ranks: Vec<String>,
    pub friends_count: i64,
    pub created: Timestamp,
    pub best_answers: BestAnswers,
    pub answer_streak: Option<AnswerStreak>,
    pub questions: AuthorQuestions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BestAnswers {
    pub count: i64,
    pub in_last_30_days: i64,
}

/// 连续回答记录
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerStreak {
    pub points_for_today: i64,
    #[serde(rename = "pointForTommorow", alias = "pointsForTomorrow")]
    pub points_for_tomorrow: i64,
    pub progress_increased_today: bool,
    pub progress: i64,
    pub can_lottery_points_be_claimed: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthorQuestions {
    pub count: i64,
    pub data: Vec<AuthorQuestionData>,
}

/// 用户提问列表中的精简题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorQuestionData {
    pub content: String,
    pub created: Timestamp,
    pub closed: bool,
    pub education: String,
    pub can_be_answered: bool,
    pub attachments: Vec<String>,
    pub education_level: Option<i64>,
    pub points_answer: PointsAnswer,
    pub points_question: i64,
    pub grade: String,
}

/// 评论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub database_id: i64,
    /// 站点返回的原始作者结构
    pub author: Option<CommentAuthor>,
    pub content: String,
    pub deleted: Option<bool>,
}

/// 评论作者（原样保留站点结构）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentAuthor {
    pub database_id: Option<i64>,
    pub nick: Option<String>,
    pub avatar: Option<Avatar>,
    pub friends: Option<Count>,
    pub received_thanks: Option<i64>,
    pub points: Option<i64>,
    pub created: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Avatar {
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Count {
    pub count: i64,
}

/// 回答的认证信息
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Verification {
    pub approval: Option<Approval>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Approval {
    pub approver: Option<Approver>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Approver {
    pub nick: Option<String>,
    pub database_id: Option<i64>,
}

/// 一条搜索结果：题目及其回答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    pub question: Question,
    pub answers: Vec<Answer>,
}
