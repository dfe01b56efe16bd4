// crates/fv_runtime/src/logging.rs

//! 日志初始化
//!
//! 库代码只通过 `log` 门面输出，由可执行程序或测试调用
//! [`init_logging`] 安装 `env_logger`。

use std::io::Write;

use chrono::Local;
use log::LevelFilter;

/// 解析日志级别：显式参数 > `RUST_LOG` > `Info`
pub fn resolve_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Info)
}

/// 安装全局日志器，格式为 `[HH:MM:SS LEVEL] message`
///
/// 重复调用无副作用，返回本次是否真正完成了安装。
pub fn init_logging(level: Option<&str>) -> bool {
    let log_level = resolve_level(level);
    let installed = env_logger::Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5}] {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .is_ok();
    if installed {
        log::info!("Logger initialized (level: {})", log_level);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_wins() {
        assert_eq!(resolve_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(resolve_level(Some("WARN")), LevelFilter::Warn);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Some("error"));
        assert!(!init_logging(Some("error")));
    }
}
