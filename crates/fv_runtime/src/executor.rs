// crates/fv_runtime/src/executor.rs

//! Executor - 执行器
//!
//! 执行器决定数据驻留在哪个内存空间、算法在哪里运行：
//!
//! | 执行器 | 内存空间 | 并行 | 异步 |
//! |--------|----------|------|------|
//! | [`SerialExecutor`] | 主机 | 否 | 否 |
//! | [`CpuExecutor`]    | 主机 | 是（rayon 线程池） | 否 |
//! | [`GpuExecutor`]    | 设备 | 是 | 是（wgpu 队列） |
//!
//! [`Executor`] 是三者的封闭枚举。容器按值持有执行器（克隆只复制共享
//! 句柄），同一变体的两个执行器总是相等，与句柄身份无关。

use std::fmt;
use std::sync::Arc;

use log::debug;
use rayon::ThreadPool;

use crate::error::RuntimeResult;
use crate::gpu::GpuContext;
use crate::memory::MemorySpace;
use crate::runtime;

// =============================================================================
// 能力表
// =============================================================================

/// 执行器种类标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutorKind {
    /// 串行
    Serial = 0,
    /// 多核 CPU
    Cpu = 1,
    /// GPU
    Gpu = 2,
}

/// 执行器能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// 执行器名称
    pub name: &'static str,
    /// 数据是否可由主机直接访问
    pub host_accessible: bool,
    /// 是否并行执行
    pub parallel: bool,
    /// 提交是否异步（需要 [`fence`] 同步）
    pub asynchronous: bool,
}

static CAPABILITIES: [Capabilities; 3] = [
    Capabilities {
        name: SerialExecutor::NAME,
        host_accessible: true,
        parallel: false,
        asynchronous: false,
    },
    Capabilities {
        name: CpuExecutor::NAME,
        host_accessible: true,
        parallel: true,
        asynchronous: false,
    },
    Capabilities {
        name: GpuExecutor::NAME,
        host_accessible: false,
        parallel: true,
        asynchronous: true,
    },
];

impl ExecutorKind {
    /// 查询静态能力表
    #[inline]
    pub fn capabilities(self) -> &'static Capabilities {
        &CAPABILITIES[self as usize]
    }

    /// 执行器名称
    #[inline]
    pub fn name(self) -> &'static str {
        self.capabilities().name
    }
}

// =============================================================================
// 串行执行器
// =============================================================================

/// 串行执行器：主机内存，单线程同步执行
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SerialExecutor;

impl SerialExecutor {
    /// 名称
    pub const NAME: &'static str = "SerialExecutor";

    /// 创建串行执行器
    pub const fn new() -> Self {
        Self
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl fmt::Debug for SerialExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", Self::NAME)
    }
}

// =============================================================================
// CPU 执行器
// =============================================================================

/// 多核 CPU 执行器：主机内存，在进程级 rayon 线程池上并行
#[derive(Clone)]
pub struct CpuExecutor {
    pool: Arc<ThreadPool>,
}

impl CpuExecutor {
    /// 名称
    pub const NAME: &'static str = "CPUExecutor";

    /// 创建 CPU 执行器
    ///
    /// 运行时未初始化时返回 `BackendUnavailable`。
    pub fn new() -> RuntimeResult<Self> {
        let pool = runtime::thread_pool(Self::NAME)?;
        debug!("{} created ({} threads)", Self::NAME, pool.current_num_threads());
        Ok(Self { pool })
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// 线程数
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// 在线程池内执行闭包
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(op)
    }
}

impl PartialEq for CpuExecutor {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for CpuExecutor {}

impl fmt::Debug for CpuExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", Self::NAME)
    }
}

// =============================================================================
// GPU 执行器
// =============================================================================

/// GPU 执行器：设备内存，经 wgpu 队列异步提交
#[derive(Clone)]
pub struct GpuExecutor {
    context: Arc<GpuContext>,
}

impl GpuExecutor {
    /// 名称
    pub const NAME: &'static str = "GPUExecutor";

    /// 创建 GPU 执行器
    ///
    /// 运行时未初始化、配置未启用 GPU 或没有可用设备时返回
    /// `BackendUnavailable`。
    pub fn new() -> RuntimeResult<Self> {
        let context = runtime::gpu_context(Self::NAME)?;
        debug!("{} created on {}", Self::NAME, context.name());
        Ok(Self { context })
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// GPU 上下文
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.context
    }

    /// 阻塞直到已提交的工作完成
    pub fn synchronize(&self) {
        self.context.synchronize();
    }
}

impl PartialEq for GpuExecutor {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for GpuExecutor {}

impl fmt::Debug for GpuExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", Self::NAME)
    }
}

// =============================================================================
// Executor
// =============================================================================

/// 执行器（封闭枚举）
#[derive(Clone, PartialEq, Eq)]
pub enum Executor {
    /// 串行
    Serial(SerialExecutor),
    /// 多核 CPU
    Cpu(CpuExecutor),
    /// GPU
    Gpu(GpuExecutor),
}

impl Executor {
    /// 主机拷贝使用的串行执行器
    pub const fn host() -> Self {
        Self::Serial(SerialExecutor::new())
    }

    /// 种类标签
    pub fn kind(&self) -> ExecutorKind {
        match self {
            Self::Serial(_) => ExecutorKind::Serial,
            Self::Cpu(_) => ExecutorKind::Cpu,
            Self::Gpu(_) => ExecutorKind::Gpu,
        }
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// 能力
    pub fn capabilities(&self) -> &'static Capabilities {
        self.kind().capabilities()
    }

    /// 数据所在的内存空间
    pub fn memory_space(&self) -> MemorySpace {
        match self {
            Self::Serial(_) | Self::Cpu(_) => MemorySpace::Host,
            Self::Gpu(gpu) => MemorySpace::Device(gpu.context.device_id()),
        }
    }

    /// 数据是否可由主机直接访问
    pub fn is_host_accessible(&self) -> bool {
        self.capabilities().host_accessible
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Executor: {}>", self.name())
    }
}

impl fmt::Display for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<SerialExecutor> for Executor {
    fn from(exec: SerialExecutor) -> Self {
        Self::Serial(exec)
    }
}

impl From<CpuExecutor> for Executor {
    fn from(exec: CpuExecutor) -> Self {
        Self::Cpu(exec)
    }
}

impl From<GpuExecutor> for Executor {
    fn from(exec: GpuExecutor) -> Self {
        Self::Gpu(exec)
    }
}

// =============================================================================
// 自由函数
// =============================================================================

/// 是否为串行执行器
#[inline]
pub fn is_serial(exec: &Executor) -> bool {
    matches!(exec, Executor::Serial(_))
}

/// 是否为 CPU 执行器
#[inline]
pub fn is_cpu(exec: &Executor) -> bool {
    matches!(exec, Executor::Cpu(_))
}

/// 是否为 GPU 执行器
#[inline]
pub fn is_gpu(exec: &Executor) -> bool {
    matches!(exec, Executor::Gpu(_))
}

/// 执行器名称
pub fn executor_name(exec: &Executor) -> &'static str {
    exec.name()
}

/// 执行器的调试表示，形如 `<Executor: SerialExecutor>`
pub fn executor_repr(exec: &Executor) -> String {
    format!("{:?}", exec)
}

/// 阻塞直到执行器上已提交的工作全部完成，同步执行器为空操作
pub fn fence(exec: &Executor) {
    if let Executor::Gpu(gpu) = exec {
        gpu.synchronize();
    }
}
