// crates/fv_core/src/lib.rs

//! fv Core Layer (Layer 2)
//!
//! 基础数值类型与执行器绑定的容器。
//!
//! # 模块概览
//!
//! - [`scalar`]: Scalar / Label / LocalIdx 与密封的 Element 约束
//! - [`vec3`]: 三维向量 Vec3
//! - [`vector`]: 执行器绑定的泛型容器 `Vector<T>`
//! - [`ops`]: Vector 自由函数（填充、映射、逐元素运算、比较）
//!
//! # 示例
//!
//! ```
//! use fv_core::{Executor, ScalarVector};
//!
//! let exec = Executor::host();
//! let mut v = ScalarVector::filled(&exec, 3, 1.0);
//! v.resize(5);
//! assert_eq!(v.to_vec().unwrap(), vec![1.0, 1.0, 1.0, 0.0, 0.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ops;
pub mod scalar;
pub mod vec3;
pub mod vector;

/// 层级标识
pub const LAYER: u8 = 2;

pub use scalar::{Element, Label, LocalIdx, Scalar};
pub use vec3::{cross, dot, mag, Vec3};
pub use vector::{LabelVector, ScalarVector, Vector, VectorVector};

// 执行器在上层 crate 中使用频繁，一并重导出
pub use fv_runtime::{Executor, RuntimeError, RuntimeResult};

/// Prelude 模块
pub mod prelude {
    //! 常用类型预导入
    pub use crate::{
        Element, Executor, Label, LabelVector, Scalar, ScalarVector, Vec3, Vector, VectorVector,
    };
}
