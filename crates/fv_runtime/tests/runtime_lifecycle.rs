// crates/fv_runtime/tests/runtime_lifecycle.rs

//! 进程级运行时生命周期测试
//!
//! 全局状态在同一进程内共享，因此整个生命周期放在单个测试函数中。

use fv_runtime::{
    finalize, initialize, initialize_scoped, is_initialized, CpuExecutor, Executor, GpuExecutor,
    RuntimeConfig, RuntimeError,
};

/// 未初始化 -> 初始化 -> 重复初始化 -> 释放 -> 作用域守卫
#[test]
fn test_runtime_lifecycle() {
    // 未初始化时 CPU/GPU 执行器都无法构造
    assert!(!is_initialized());
    let err = CpuExecutor::new().unwrap_err();
    assert!(err.is_backend_unavailable());
    assert!(err.to_string().contains("not initialized"), "{}", err);
    let err = GpuExecutor::new().unwrap_err();
    assert!(err.to_string().contains("not initialized"), "{}", err);

    // 初始化
    initialize(&RuntimeConfig::with_threads(2)).unwrap();
    assert!(is_initialized());
    let cpu = CpuExecutor::new().unwrap();
    assert_eq!(cpu.num_threads(), 2);

    // GPU 未启用
    let err = GpuExecutor::new().unwrap_err();
    assert!(err.is_backend_unavailable());
    assert!(err.to_string().contains("disabled"), "{}", err);

    // 重复初始化是错误，且不会安装日志器
    let err = initialize(&RuntimeConfig::default()).unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidArgument { .. }));
    let noisy = RuntimeConfig {
        log_level: Some("trace".to_string()),
        ..RuntimeConfig::with_threads(1)
    };
    let err = initialize(&noisy).unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidArgument { .. }));
    assert_eq!(log::max_level(), log::LevelFilter::Off);

    // 释放后已有执行器仍可用，新的无法构造
    assert!(finalize());
    assert!(!is_initialized());
    assert!(!finalize());
    let exec = Executor::from(cpu);
    assert_eq!(exec.name(), "CPUExecutor");
    assert!(CpuExecutor::new().is_err());

    // 非法配置被拒绝
    let err = initialize(&RuntimeConfig::with_threads(0)).unwrap_err();
    assert!(matches!(err, RuntimeError::Config(_)));
    assert!(!is_initialized());

    // 作用域守卫
    {
        let _guard = initialize_scoped(&RuntimeConfig::default()).unwrap();
        assert!(is_initialized());
        assert!(CpuExecutor::new().is_ok());
    }
    assert!(!is_initialized());
}
