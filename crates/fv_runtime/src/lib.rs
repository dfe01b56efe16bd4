// crates/fv_runtime/src/lib.rs

//! fv Runtime Layer (Layer 1)
//!
//! 运行时抽象层，提供执行器、设备缓冲区与进程级运行时。
//!
//! # 模块概览
//!
//! - [`executor`]: Executor 封闭枚举（Serial / CPU / GPU）与能力表
//! - [`memory`]: 内存空间（主机 / 设备）
//! - [`buffer`]: DeviceBuffer trait 设备缓冲区抽象
//! - [`gpu`]: wgpu GPU 上下文与设备缓冲区
//! - [`runtime`]: 进程级运行时（线程池、GPU 上下文）的初始化与释放
//! - [`parallel`]: 执行器无关的并行算法
//! - [`config`]: 运行时配置
//! - [`logging`]: 日志初始化
//! - [`error`]: 运行时错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 3: fv_mesh     ─> UnstructuredMesh, BoundaryMesh, 网格工厂
//! Layer 2: fv_core     ─> Vec3, Vector<T>
//! Layer 1: fv_runtime  ─> Executor, DeviceBuffer, Runtime (本层)
//! ```
//!
//! # 示例
//!
//! ```no_run
//! use fv_runtime::{initialize, CpuExecutor, Executor, RuntimeConfig};
//!
//! initialize(&RuntimeConfig::default()).unwrap();
//! let exec = Executor::from(CpuExecutor::new().unwrap());
//! assert_eq!(exec.name(), "CPUExecutor");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod executor;
pub mod gpu;
pub mod logging;
pub mod memory;
pub mod parallel;
pub mod runtime;

/// 层级标识
pub const LAYER: u8 = 1;

// 重导出核心类型
pub use buffer::DeviceBuffer;
pub use config::{ConfigError, GpuConfig, PowerMode, RuntimeConfig, ThreadConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use executor::{
    executor_name, executor_repr, fence, is_cpu, is_gpu, is_serial, Capabilities, CpuExecutor,
    Executor, ExecutorKind, GpuExecutor, SerialExecutor,
};
pub use gpu::{GpuBuffer, GpuContext};
pub use memory::MemorySpace;
pub use runtime::{finalize, initialize, initialize_scoped, is_initialized, RuntimeGuard};

/// Prelude 模块
pub mod prelude {
    //! 常用类型预导入
    pub use crate::{
        fence, is_cpu, is_gpu, is_serial, CpuExecutor, DeviceBuffer, Executor, GpuExecutor,
        MemorySpace, RuntimeError, RuntimeResult, SerialExecutor,
    };
}
