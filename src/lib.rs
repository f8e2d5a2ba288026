//! # Brainly Scraper
//!
//! Brainly 问答站点的 GraphQL 客户端库
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `clients::transport` - HTTP 传输接口与 reqwest 实现
//! - `infrastructure::query_store` - GraphQL 查询文本的读取与下载
//!
//! ### ② 模型层（Model）
//! - `model::mirror` - 镜像站注册表与"作业"词表
//! - `model::raw` - 站点返回的原始节点结构，在解析边界完成校验
//! - `model::entities` - 转换后的题目、回答、用户、评论
//!
//! ### ③ 工具层（Utils）
//! - `utils::codec` - 节点 ID 编解码
//! - `utils::sanitize` - 内容清洗
//! - `utils::logging` - 日志初始化与格式化
//!
//! ### ④ 业务能力层（Services）
//! - `services::converter` - 原始节点 → 领域模型
//! - `services::cache` - 结果缓存（内存 / 文件）
//! - `clients::brainly_client` - 单个镜像站的请求构造与响应解析
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator::Brainly` - 校验 → 缓存 → 单站或竞速发送 → 转换 → 写缓存
//!
//! ## 使用示例
//!
//! ```no_run
//! # async fn run() -> brainly_scraper::Result<()> {
//! let brainly = brainly_scraper::Brainly::new("id", true).await?;
//! let results = brainly.search_racing("Pythagoras", "id", 10).await?;
//! for item in results {
//!     println!("{} ({} 个回答)", item.question.content, item.answers.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod model;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{RequestOptions, ReqwestTransport, Transport, TransportRequest};
pub use config::{CacheBackend, Config};
pub use error::{BrainlyError, RequestFailure, Result};
pub use infrastructure::GraphqlQuery;
pub use model::{
    is_valid_mirror, resolve_work_name, Answer, Author, Comment, Mirror, MirrorRegistry,
    Question, SearchItem,
};
pub use orchestrator::{Brainly, BrainlyBuilder, UserId};
pub use services::{FileCache, MemoryCache, ResultCache};
