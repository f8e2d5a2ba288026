//! 节点 ID 编解码
//!
//! 站点的节点 ID 是 `base64("<类型>:<数字ID>")`，例如 `VXNlcjoxMjM=` → `("User", 123)`。

use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;

use crate::error::{BrainlyError, Result};

/// 解码后的节点 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub kind: String,
    pub number: i64,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.number)
    }
}

/// 编码的输入：单个值或多段值
#[derive(Debug, Clone, PartialEq)]
pub enum IdPart {
    Text(String),
    Number(i64),
}

impl fmt::Display for IdPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdPart::Text(s) => f.write_str(s),
            IdPart::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for IdPart {
    fn from(s: &str) -> Self {
        IdPart::Text(s.to_string())
    }
}

impl From<String> for IdPart {
    fn from(s: String) -> Self {
        IdPart::Text(s)
    }
}

impl From<i64> for IdPart {
    fn from(n: i64) -> Self {
        IdPart::Number(n)
    }
}

/// 解码节点 ID
///
/// 第二段必须是整数；多于两段时只取前两段。
pub fn decode(raw: &str) -> Result<NodeId> {
    let malformed = |reason: &str| BrainlyError::MalformedIdentifier {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|e| malformed(&format!("base64 解码失败: {}", e)))?;
    let text = String::from_utf8(bytes).map_err(|_| malformed("不是合法的 UTF-8"))?;

    let mut segments = text.split(':');
    let kind = segments.next().unwrap_or_default();
    let number = segments.next().ok_or_else(|| malformed("缺少 ':' 分隔符"))?;
    let number = number
        .trim()
        .parse::<i64>()
        .map_err(|_| malformed("数字部分不是整数"))?;

    Ok(NodeId {
        kind: kind.to_string(),
        number,
    })
}

/// 编码单个 ID
///
/// - 给出 `kind` 时编码为 `kind:id`
/// - 未给出 `kind` 时，文本 ID 原样编码，数字 ID 返回 [`BrainlyError::MissingType`]
pub fn encode(id: impl Into<IdPart>, kind: Option<&str>) -> Result<String> {
    let id = id.into();
    let text = match (kind.filter(|k| !k.is_empty()), &id) {
        (Some(kind), _) => format!("{}:{}", kind, id),
        (None, IdPart::Number(n)) => {
            return Err(BrainlyError::MissingType { id: n.to_string() })
        }
        (None, IdPart::Text(s)) => s.clone(),
    };
    Ok(STANDARD.encode(text))
}

/// 编码多段 ID，各段以 `:` 连接
pub fn encode_parts<I, P>(parts: I) -> String
where
    I: IntoIterator<Item = P>,
    P: Into<IdPart>,
{
    let joined = parts
        .into_iter()
        .map(|p| p.into().to_string())
        .collect::<Vec<_>>()
        .join(":");
    STANDARD.encode(joined)
}
