/// 日志工具模块
///
/// 提供日志初始化和格式化辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 级别默认 info，可通过 RUST_LOG 覆盖。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `bind_addr`: 监听地址
pub fn log_startup(bind_addr: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 试卷生成服务启动");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📡 监听地址: {}", bind_addr);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
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
