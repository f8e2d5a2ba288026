use thiserror::Error;

/// 单次 HTTP 交互失败的原因
#[derive(Debug, Error)]
pub enum RequestFailure {
    /// 服务端返回非 2xx 状态码
    #[error("HTTP 状态码 {0}")]
    Status(u16),
    /// 网络层错误（连接、超时、TLS 等）
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    /// 自定义传输层返回的错误
    #[error("{0}")]
    Other(String),
}

/// 库的统一错误类型
#[derive(Debug, Error)]
pub enum BrainlyError {
    /// 镜像站代码不在注册表中
    #[error("无效的镜像站代码: {code}")]
    InvalidMirror { code: String },

    /// 目标语言代码不在注册表中
    #[error("无效的语言代码: {code}")]
    InvalidLanguage { code: String },

    /// 节点 ID 无法解码
    #[error("无法解析节点 ID '{raw}': {reason}")]
    MalformedIdentifier { raw: String, reason: String },

    /// 数字 ID 缺少类型前缀
    #[error("ID {id} 需要指定类型")]
    MissingType { id: String },

    /// 响应 JSON 缺少预期字段
    #[error("响应格式错误 ({context}): {source}")]
    MalformedResponse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// 单个镜像站请求失败
    #[error("请求 {endpoint} 失败: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: RequestFailure,
    },

    /// 站点返回了错误结构的响应
    #[error("镜像站 {mirror} 拒绝了请求: {message}")]
    SiteRejected { mirror: String, message: String },

    /// 所有镜像站都失败
    #[error("所有镜像站均请求失败 (共 {} 个)", .attempts.len())]
    AllMirrorsFailed { attempts: Vec<(String, String)> },

    /// 本地 GraphQL 查询文件无法读写
    #[error("无法读取 GraphQL 查询文件 {path}: {source}")]
    QueryUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 远程 GraphQL 查询文本下载失败
    #[error("无法下载 GraphQL 查询 ({url}): {source}")]
    QueryFetchFailed {
        url: String,
        #[source]
        source: RequestFailure,
    },
}

impl BrainlyError {
    /// 创建响应格式错误
    pub fn malformed(context: impl Into<String>, source: serde_json::Error) -> Self {
        BrainlyError::MalformedResponse {
            context: context.into(),
            source,
        }
    }

    /// 用一段描述创建响应格式错误（没有底层 serde 错误时使用）
    pub fn malformed_msg(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::malformed(context, <serde_json::Error as serde::de::Error>::custom(message))
    }

    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: impl Into<RequestFailure>) -> Self {
        BrainlyError::RequestFailed {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// 是否为参数校验错误（发生在任何网络请求之前）
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            BrainlyError::InvalidMirror { .. } | BrainlyError::InvalidLanguage { .. }
        )
    }

    /// 出错的镜像站 / 语言代码
    pub fn offending_code(&self) -> Option<&str> {
        match self {
            BrainlyError::InvalidMirror { code } | BrainlyError::InvalidLanguage { code } => {
                Some(code)
            }
            BrainlyError::SiteRejected { mirror, .. } => Some(mirror),
            _ => None,
        }
    }
}

/// 库结果类型
pub type Result<T> = std::result::Result<T, BrainlyError>;
