// crates/fv_runtime/src/runtime.rs

//! 进程级运行时
//!
//! 持有 CPU 执行器共享的 rayon 线程池以及可选的 GPU 上下文。
//! 必须在构造 [`CpuExecutor`](crate::CpuExecutor) /
//! [`GpuExecutor`](crate::GpuExecutor) 之前调用 [`initialize`]。
//!
//! 已构造的执行器持有资源的 `Arc`，[`finalize`] 之后它们仍然有效，
//! 但新的执行器无法再构造。

use std::sync::Arc;

use log::{info, warn};
use parking_lot::RwLock;
use rayon::ThreadPool;

use crate::config::{RuntimeConfig, ThreadConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::gpu::GpuContext;
use crate::logging;

/// GPU 槽位状态
enum GpuSlot {
    /// 配置中未启用
    Disabled,
    /// 已请求但不可用，附带原因
    Unavailable(String),
    /// 可用
    Ready(Arc<GpuContext>),
}

struct RuntimeState {
    pool: Arc<ThreadPool>,
    gpu: GpuSlot,
    config: RuntimeConfig,
}

static RUNTIME: RwLock<Option<RuntimeState>> = RwLock::new(None);

/// 初始化进程级运行时
///
/// 配置了 `log_level` 时顺带安装日志器。重复初始化返回
/// [`RuntimeError::InvalidArgument`]。请求了 GPU 但没有
/// 可用设备时只记录警告，CPU 执行仍然可用。
pub fn initialize(config: &RuntimeConfig) -> RuntimeResult<()> {
    config.validate()?;

    let mut guard = RUNTIME.write();
    if guard.is_some() {
        return Err(RuntimeError::invalid_argument(
            "initialize",
            "runtime already initialized",
        ));
    }
    // 被拒绝的初始化不安装日志器
    if let Some(level) = config.log_level.as_deref() {
        logging::init_logging(Some(level));
    }

    let pool = build_pool(&config.threads)?;
    let gpu = if config.gpu.enabled {
        match GpuContext::request(config.gpu.power_preference.into()) {
            Ok(Some(context)) => {
                info!("GPU executor available on {}", context.name());
                GpuSlot::Ready(Arc::new(context))
            }
            Ok(None) => {
                warn!("GPU requested but no adapter was found");
                GpuSlot::Unavailable("no GPU adapter found".to_string())
            }
            Err(e) => {
                warn!("GPU requested but device creation failed: {}", e);
                GpuSlot::Unavailable(e.to_string())
            }
        }
    } else {
        GpuSlot::Disabled
    };

    info!(
        "Runtime initialized: {} CPU threads, GPU {}",
        pool.current_num_threads(),
        match &gpu {
            GpuSlot::Ready(_) => "ready",
            GpuSlot::Unavailable(_) => "unavailable",
            GpuSlot::Disabled => "disabled",
        }
    );

    *guard = Some(RuntimeState {
        pool: Arc::new(pool),
        gpu,
        config: config.clone(),
    });
    Ok(())
}

/// 释放进程级运行时，返回之前是否已初始化
pub fn finalize() -> bool {
    let state = RUNTIME.write().take();
    if state.is_some() {
        info!("Runtime finalized");
    }
    state.is_some()
}

/// 运行时是否已初始化
pub fn is_initialized() -> bool {
    RUNTIME.read().is_some()
}

/// 当前生效的配置
pub fn current_config() -> Option<RuntimeConfig> {
    RUNTIME.read().as_ref().map(|s| s.config.clone())
}

/// 初始化运行时并返回作用域守卫，守卫析构时调用 [`finalize`]
pub fn initialize_scoped(config: &RuntimeConfig) -> RuntimeResult<RuntimeGuard> {
    initialize(config)?;
    Ok(RuntimeGuard { _private: () })
}

/// 运行时作用域守卫
#[derive(Debug)]
#[must_use = "守卫被丢弃时运行时立即释放"]
pub struct RuntimeGuard {
    _private: (),
}

impl Drop for RuntimeGuard {
    fn drop(&mut self) {
        finalize();
    }
}

pub(crate) fn thread_pool(backend: &'static str) -> RuntimeResult<Arc<ThreadPool>> {
    RUNTIME
        .read()
        .as_ref()
        .map(|s| Arc::clone(&s.pool))
        .ok_or_else(|| RuntimeError::not_initialized(backend))
}

pub(crate) fn gpu_context(backend: &'static str) -> RuntimeResult<Arc<GpuContext>> {
    let guard = RUNTIME.read();
    let state = guard
        .as_ref()
        .ok_or_else(|| RuntimeError::not_initialized(backend))?;
    match &state.gpu {
        GpuSlot::Ready(context) => Ok(Arc::clone(context)),
        GpuSlot::Unavailable(reason) => {
            Err(RuntimeError::backend_unavailable(backend, reason.clone()))
        }
        GpuSlot::Disabled => Err(RuntimeError::backend_unavailable(
            backend,
            "GPU disabled in runtime config",
        )),
    }
}

fn build_pool(config: &ThreadConfig) -> RuntimeResult<ThreadPool> {
    let prefix = config.thread_name_prefix.clone();
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads.unwrap_or(0))
        .thread_name(move |i| format!("{}-{}", prefix, i))
        .build()
        .map_err(|e| RuntimeError::backend_unavailable("CPUExecutor", e.to_string()))
}
