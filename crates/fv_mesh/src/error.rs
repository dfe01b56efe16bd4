// crates/fv_mesh/src/error.rs

//! 网格错误类型
//!
//! 包含退化数量、拓扑不一致、数组长度不匹配等错误定义。
//! 所有错误可转换为 `fv_runtime::RuntimeError` 向上传播。

use fv_core::Label;
use fv_runtime::RuntimeError;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// 单元数退化（为零）
    #[error("单元数退化: {operation} 需要至少一个单元, 提供 {n_cells}")]
    DegenerateCellCount {
        /// 操作
        operation: &'static str,
        /// 提供的单元数
        n_cells: usize,
    },

    /// 拓扑错误
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        /// 操作
        operation: &'static str,
        /// 详情
        details: String,
    },

    /// 数组长度与声明的数量不一致
    #[error("元素不匹配: {name} 需要 {required} 个元素, 提供 {provided}")]
    ElementCountMismatch {
        /// 数组名称
        name: &'static str,
        /// 需要的数量
        required: usize,
        /// 实际数量
        provided: usize,
    },

    /// 面引用了不存在的单元
    #[error("无效单元索引: {array}[{face}] = {cell}, 单元数 {n_cells}")]
    InvalidCellIndex {
        /// 数组名称
        array: &'static str,
        /// 面编号
        face: usize,
        /// 引用的单元
        cell: Label,
        /// 单元数
        n_cells: usize,
    },

    /// 数组绑定的执行器与网格不一致
    #[error("执行器不一致: {name} 绑定 {actual}, 网格使用 {expected}")]
    ExecutorMismatch {
        /// 数组名称
        name: &'static str,
        /// 网格执行器
        expected: &'static str,
        /// 数组执行器
        actual: &'static str,
    },

    /// 聚合运行时错误
    #[error("运行时错误: {0}")]
    Runtime(#[from] RuntimeError),
}

/// 转换到 Runtime 层错误
impl From<MeshError> for RuntimeError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::DegenerateCellCount { operation, n_cells } => RuntimeError::invalid_argument(
                operation,
                format!("n_cells must be positive, got {}", n_cells),
            ),
            MeshError::InvalidTopology { operation, details } => {
                RuntimeError::invalid_argument(operation, details)
            }
            MeshError::ElementCountMismatch {
                name,
                required,
                provided,
            } => RuntimeError::size_mismatch(name, required, provided),
            MeshError::InvalidCellIndex {
                array,
                cell,
                n_cells,
                ..
            } => RuntimeError::index_out_of_bounds(array, cell.max(0) as usize, n_cells),
            MeshError::ExecutorMismatch {
                name,
                expected,
                actual,
            } => RuntimeError::invalid_argument(
                "mesh executor",
                format!("{} bound to {}, mesh uses {}", name, actual, expected),
            ),
            MeshError::Runtime(runtime_err) => runtime_err,
        }
    }
}

/// 便捷构造函数
impl MeshError {
    /// 单元数退化
    pub fn degenerate(operation: &'static str, n_cells: usize) -> Self {
        Self::DegenerateCellCount { operation, n_cells }
    }

    /// 拓扑错误
    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }

    /// 长度不匹配
    pub fn count_mismatch(name: &'static str, required: usize, provided: usize) -> Self {
        Self::ElementCountMismatch {
            name,
            required,
            provided,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_error_display() {
        let err = MeshError::degenerate("create_1d_uniform_mesh", 0);
        assert!(err.to_string().contains("create_1d_uniform_mesh"));

        let err = MeshError::count_mismatch("cell_volumes", 3, 2);
        assert!(err.to_string().contains("cell_volumes"));
    }

    #[test]
    fn test_into_runtime_error() {
        let err: RuntimeError = MeshError::count_mismatch("face_owner", 4, 3).into();
        assert!(err.is_size_mismatch());

        let err: RuntimeError = MeshError::degenerate("mesh", 0).into();
        assert!(matches!(err, RuntimeError::InvalidArgument { .. }));

        let inner = RuntimeError::index_out_of_bounds("Vector", 1, 0);
        let err: RuntimeError = MeshError::from(inner.clone()).into();
        assert_eq!(err, inner);
    }
}
