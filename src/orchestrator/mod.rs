//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 对外唯一入口 `Brainly`：校验参数、查缓存、选择发送策略、写缓存。
//!
//! ## 发送策略
//!
//! - 单站：只向一个镜像站发送，失败直接返回，不重试
//! - 竞速：同时向所有镜像站发送，第一个成功的结果胜出，其余结果丢弃
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::Brainly
//!     ↓
//! clients::BrainlyClient (单个镜像站的请求与解析)
//!     ↓
//! services (converter / cache)
//!     ↓
//! clients::Transport + infrastructure::GraphqlQuery
//! ```

pub mod brainly;

pub use brainly::{Brainly, BrainlyBuilder, UserId};
