// crates/fv_runtime/src/error.rs

//! 运行时错误类型
//!
//! 定义 Runtime 层的错误类型：后端不可用、参数非法、尺寸不匹配、
//! 索引越界、设备访问错误以及配置错误。

use thiserror::Error;

/// 运行时错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// 后端不可用（运行时未初始化、GPU 未启用或无可用设备）
    #[error("后端 {backend} 不可用: {reason}")]
    BackendUnavailable {
        /// 后端名称
        backend: &'static str,
        /// 原因
        reason: String,
    },

    /// 非法参数（退化的数量等）
    #[error("非法参数 '{operation}': {reason}")]
    InvalidArgument {
        /// 操作描述
        operation: String,
        /// 原因
        reason: String,
    },

    /// 长度不匹配
    #[error("尺寸不匹配 {name}: 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 数组名称
        name: String,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 索引越界
    #[error("{index_type}({index}) 越界，长度为 {len}")]
    IndexOutOfBounds {
        /// 索引类型名称
        index_type: &'static str,
        /// 索引值
        index: usize,
        /// 容量
        len: usize,
    },

    /// 在设备驻留的数据上请求主机访问
    #[error("'{operation}' 需要主机内存，但数据驻留在 {executor} 上")]
    HostAccessDenied {
        /// 操作描述
        operation: &'static str,
        /// 执行器名称
        executor: &'static str,
    },

    /// 设备运行时报告的错误
    #[error("设备错误: {message}")]
    Device {
        /// 错误描述
        message: String,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

impl RuntimeError {
    /// 创建后端不可用错误
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// 创建"运行时未初始化"错误
    pub fn not_initialized(backend: &'static str) -> Self {
        Self::backend_unavailable(
            backend,
            "runtime not initialized, call fv_runtime::initialize first",
        )
    }

    /// 创建非法参数错误
    pub fn invalid_argument(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// 创建尺寸不匹配错误
    pub fn size_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// 创建索引越界错误
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 创建设备错误
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    /// 是否为后端不可用错误
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }

    /// 是否为索引越界错误
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::IndexOutOfBounds { .. })
    }

    /// 是否为尺寸不匹配错误
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self, Self::SizeMismatch { .. })
    }
}

/// 运行时结果类型
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_message() {
        let err = RuntimeError::not_initialized("CPUExecutor");
        assert!(err.is_backend_unavailable());
        let msg = err.to_string();
        assert!(msg.contains("CPUExecutor"));
        assert!(msg.contains("not initialized"));
    }

    #[test]
    fn test_error_display() {
        let err = RuntimeError::index_out_of_bounds("Vector", 10, 5);
        assert!(err.is_out_of_bounds());
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("5"));

        let err = RuntimeError::size_mismatch("cell_volumes", 4, 3);
        assert!(err.is_size_mismatch());
        assert!(err.to_string().contains("cell_volumes"));
    }
}
