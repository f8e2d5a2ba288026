pub mod entities;
pub mod mirror;
pub mod raw;

pub use entities::{
    Answer, AnswerStreak, Author, AuthorQuestionData, AuthorQuestions, BestAnswers, Comment,
    CommentAuthor, PointsAnswer, Question, SearchItem, Timestamp, Verification,
};
pub use mirror::{is_valid_mirror, resolve_work_name, Mirror, MirrorRegistry, DEFAULT_WORK_NAME};
