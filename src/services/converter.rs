//! 实体转换 - 业务能力层
//!
//! 把原始 GraphQL 节点转换为领域模型。纯函数，不做任何 I/O；
//! 节点 ID 无法解码时直接返回错误，不吞掉。

use crate::error::Result;
use crate::model::entities::{
    Answer, Author, AuthorQuestionData, AuthorQuestions, BestAnswers, Comment, PointsAnswer,
    Question, SearchItem, Timestamp,
};
use crate::model::raw::{
    RawAnswer, RawAttachment, RawAuthor, RawAuthorQuestion, RawComment, RawNamed, RawQuestion,
    RawSubject, SimilarQuestions,
};
use crate::utils::{codec, sanitize};

const MISSING_RANK: &str = "-";

fn attachment_urls(attachments: &[RawAttachment]) -> Vec<String> {
    attachments.iter().map(|a| a.url.clone()).collect()
}

fn name_of(named: Option<&RawNamed>) -> String {
    named.map(|n| n.name.clone()).unwrap_or_default()
}

fn subject_of(subject: Option<&RawSubject>) -> String {
    subject.map(|s| s.label().to_string()).unwrap_or_default()
}

/// 转换用户
pub fn convert_author(raw: &RawAuthor) -> Result<Author> {
    let id = codec::decode(&raw.id)?;

    let questions = AuthorQuestions {
        count: raw.questions.count,
        data: raw
            .questions
            .edges
            .iter()
            .map(|edge| convert_author_question(&edge.node))
            .collect(),
    };

    Ok(Author {
        id: id.to_string(),
        raw_id: raw.id.clone(),
        database_id: id.number,
        username: raw.nick.clone(),
        avatar_url: raw.avatar.as_ref().and_then(|a| a.url.clone()),
        rank: raw
            .rank
            .as_ref()
            .map(|r| r.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| MISSING_RANK.to_string()),
        description: raw.description.clone(),
        gender: raw.gender.clone(),
        points: raw.points,
        received_thanks: raw.received_thanks,
        best_answers_count: raw.best_answers_count,
        helped_users_count: raw.helped_users_count,
        special_ranks: raw.special_ranks.iter().map(|r| r.name.clone()).collect(),
        friends_count: raw.friends.count,
        created: Timestamp::parse(&raw.created),
        best_answers: BestAnswers {
            count: raw.best_answers_count,
            in_last_30_days: raw.best_answers_count_in_last_30_days,
        },
        answer_streak: raw.answering_streak.clone(),
        questions,
    })
}

/// 转换用户提问列表中的精简题目
pub fn convert_author_question(raw: &RawAuthorQuestion) -> AuthorQuestionData {
    AuthorQuestionData {
        content: sanitize::clean(&raw.content),
        created: Timestamp::parse(&raw.created),
        closed: raw.is_closed,
        education: subject_of(raw.subject.as_ref()),
        can_be_answered: raw.can_be_answered,
        attachments: attachment_urls(&raw.attachments),
        education_level: raw.edu_level,
        points_answer: PointsAnswer {
            for_best: raw.points_for_best_answer,
            normal: raw.points_for_answer,
        },
        points_question: raw.points,
        grade: name_of(raw.grade.as_ref()),
    }
}

/// 转换评论
pub fn convert_comment(raw: &RawComment) -> Result<Comment> {
    let id = codec::decode(&raw.id)?;
    Ok(Comment {
        id: id.to_string(),
        database_id: id.number,
        author: raw.author.clone(),
        content: sanitize::clean(&raw.content),
        deleted: raw.deleted,
    })
}

/// 转换回答
pub fn convert_answer(raw: &RawAnswer) -> Result<Answer> {
    let id = codec::decode(&raw.id)?;

    let author = raw.author.as_ref().map(convert_author).transpose()?;
    let comments = raw
        .comments
        .edges
        .iter()
        .map(|edge| convert_comment(&edge.node))
        .collect::<Result<Vec<_>>>()?;

    Ok(Answer {
        id: id.to_string(),
        database_id: id.number,
        content: sanitize::clean(&raw.content),
        author,
        is_best: raw.is_best,
        points: raw.points,
        confirmed: raw.is_confirmed,
        // 0 和缺失都视为 0
        score: raw.quality_score.filter(|s| *s != 0.0).unwrap_or(0.0),
        rates_count: raw.rates_count,
        thanks_count: raw.thanks_count,
        attachments: attachment_urls(&raw.attachments),
        created: Timestamp::parse(&raw.created),
        can_comment: raw.can_comment,
        verification: raw.verification.clone(),
        comments,
    })
}

/// 转换题目（递归转换相似题目）
///
/// 递归深度由站点响应本身的嵌套层数决定。
pub fn convert_question(raw: &RawQuestion) -> Result<Question> {
    let id = codec::decode(&raw.id)?;

    let author = raw.author.as_ref().map(convert_author).transpose()?;
    let similars = match &raw.similar {
        SimilarQuestions::Present(list) => list
            .iter()
            .map(convert_question)
            .collect::<Result<Vec<_>>>()?,
        SimilarQuestions::Absent => Vec::new(),
    };

    Ok(Question {
        id: id.to_string(),
        database_id: id.number,
        content: sanitize::clean(&raw.content),
        closed: raw.is_closed,
        created: Timestamp::parse(&raw.created),
        attachments: attachment_urls(&raw.attachments),
        author,
        education: raw.subject.label().to_string(),
        education_level: raw.edu_level,
        can_be_answered: raw.can_be_answered,
        points_answer: PointsAnswer {
            for_best: raw.points_for_best_answer,
            normal: raw.points_for_answer,
        },
        points_question: raw.points,
        grade: raw.grade.name.clone(),
        last_activity: raw.last_activity.clone(),
        verified_answer: raw.answers.has_verified,
        similars,
    })
}

/// 转换一条搜索结果：题目 + 题目下的全部回答（保持原顺序）
pub fn convert_search_item(raw: &RawQuestion) -> Result<SearchItem> {
    let question = convert_question(raw)?;
    let answers = raw
        .answers
        .nodes
        .iter()
        .map(convert_answer)
        .collect::<Result<Vec<_>>>()?;
    Ok(SearchItem { question, answers })
}
