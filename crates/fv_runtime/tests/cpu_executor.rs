// crates/fv_runtime/tests/cpu_executor.rs

//! CPU 执行器与并行算法测试

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use fv_runtime::parallel::{parallel_fill_with, parallel_for, parallel_reduce_sum};
use fv_runtime::{
    fence, initialize, is_cpu, is_gpu, is_serial, CpuExecutor, Executor, ExecutorKind,
    MemorySpace, RuntimeConfig, SerialExecutor,
};

fn ensure_runtime() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        initialize(&RuntimeConfig::with_threads(4)).unwrap();
    });
}

fn cpu() -> Executor {
    ensure_runtime();
    Executor::from(CpuExecutor::new().unwrap())
}

/// CPU 执行器的名称、表示与谓词
#[test]
fn test_cpu_identity() {
    let exec = cpu();
    assert_eq!(exec.name(), "CPUExecutor");
    assert_eq!(format!("{:?}", exec), "<Executor: CPUExecutor>");
    assert!(is_cpu(&exec));
    assert!(!is_serial(&exec));
    assert!(!is_gpu(&exec));
    assert_eq!(exec.kind(), ExecutorKind::Cpu);
    assert_eq!(exec.memory_space(), MemorySpace::Host);
    fence(&exec);
}

/// 同一变体的执行器相等，不同变体不等
#[test]
fn test_equality_by_variant() {
    let a = cpu();
    let b = cpu();
    assert_eq!(a, b);
    assert_eq!(a.clone(), a);
    assert_ne!(a, Executor::from(SerialExecutor::new()));
}

/// 串行与并行执行结果一致
#[test]
fn test_parallel_matches_serial() {
    let n = 10_000;
    let serial = Executor::host();
    let parallel = cpu();

    let mut a = vec![0.0_f64; n];
    let mut b = vec![0.0_f64; n];
    parallel_fill_with(&serial, &mut a, |i| (i as f64).sqrt());
    parallel_fill_with(&parallel, &mut b, |i| (i as f64).sqrt());
    assert_eq!(a, b);

    let sum_serial: f64 = parallel_reduce_sum(&serial, 0..n, |i| i as f64);
    let sum_parallel: f64 = parallel_reduce_sum(&parallel, 0..n, |i| i as f64);
    assert!((sum_serial - sum_parallel).abs() < 1e-6);

    let visited = AtomicUsize::new(0);
    parallel_for(&parallel, 0..n, |_| {
        visited.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(visited.load(Ordering::Relaxed), n);
}

/// 并行闭包在配置的线程池内执行
#[test]
fn test_runs_inside_pool() {
    let exec = cpu();
    if let Executor::Cpu(inner) = &exec {
        let name = inner.install(|| std::thread::current().name().map(str::to_string));
        assert!(name.unwrap_or_default().starts_with("fv-worker"));
        assert_eq!(inner.num_threads(), 4);
    } else {
        panic!("expected CPU executor");
    }
}
