/// 日志工具模块
///
/// 提供订阅器初始化和日志格式化的辅助函数。库本身不会安装全局订阅器，由调用方决定。
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志订阅器
///
/// 默认级别为 `info`，可通过 `RUST_LOG` 覆盖。重复调用不会报错。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录客户端启动信息
///
/// # 参数
/// - `country`: 默认镜像站
/// - `cache_enabled`: 是否启用缓存
pub fn log_startup(country: &str, cache_enabled: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 Brainly 客户端已创建");
    info!("🌐 默认镜像站: {}", country);
    info!("💾 缓存: {}", if cache_enabled { "启用" } else { "禁用" });
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
