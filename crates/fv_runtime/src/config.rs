// crates/fv_runtime/src/config.rs

//! 运行时配置
//!
//! 控制进程级运行时的线程池规模、GPU 启用与日志级别。所有字段都有
//! 默认值，JSON 中缺失的字段按默认值补齐。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },
}

impl From<ConfigError> for RuntimeError {
    fn from(err: ConfigError) -> Self {
        RuntimeError::Config(err.to_string())
    }
}

/// 线程池配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadConfig {
    /// 线程数，`None` 表示使用逻辑核数
    #[serde(default)]
    pub num_threads: Option<usize>,

    /// 工作线程名前缀
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

fn default_thread_name_prefix() -> String {
    "fv-worker".to_string()
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name_prefix: default_thread_name_prefix(),
        }
    }
}

/// GPU 电源偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PowerMode {
    /// 低功耗（集成显卡优先）
    LowPower,
    /// 高性能（独立显卡优先）
    #[default]
    HighPerformance,
}

impl From<PowerMode> for wgpu::PowerPreference {
    fn from(mode: PowerMode) -> Self {
        match mode {
            PowerMode::LowPower => wgpu::PowerPreference::LowPower,
            PowerMode::HighPerformance => wgpu::PowerPreference::HighPerformance,
        }
    }
}

/// GPU 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GpuConfig {
    /// 是否在初始化时请求 GPU 设备
    #[serde(default)]
    pub enabled: bool,

    /// 电源偏好
    #[serde(default)]
    pub power_preference: PowerMode,
}

/// 运行时配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// 线程池
    #[serde(default)]
    pub threads: ThreadConfig,

    /// GPU
    #[serde(default)]
    pub gpu: GpuConfig,

    /// 日志级别（"error" / "warn" / "info" / "debug" / "trace"）
    #[serde(default)]
    pub log_level: Option<String>,
}

impl RuntimeConfig {
    /// 固定线程数的配置
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            threads: ThreadConfig {
                num_threads: Some(num_threads),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// 启用 GPU
    pub fn enable_gpu(mut self) -> Self {
        self.gpu.enabled = true;
        self
    }

    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;

        let config: RuntimeConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads.num_threads == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "threads.num_threads".to_string(),
                value: "0".to_string(),
                reason: "线程数必须为正".to_string(),
            });
        }

        if self.threads.thread_name_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "threads.thread_name_prefix".to_string(),
                value: format!("{:?}", self.threads.thread_name_prefix),
                reason: "线程名前缀不能为空".to_string(),
            });
        }

        if let Some(level) = &self.log_level {
            if level.parse::<log::LevelFilter>().is_err() {
                return Err(ConfigError::InvalidValue {
                    key: "log_level".to_string(),
                    value: level.clone(),
                    reason: "未知日志级别".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 保存为 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
