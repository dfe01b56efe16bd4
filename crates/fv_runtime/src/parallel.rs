// crates/fv_runtime/src/parallel.rs

//! 执行器无关的并行算法
//!
//! 同一个闭包在三种执行器上运行：串行执行器用普通循环，CPU 执行器
//! 在其 rayon 线程池内并行，GPU 执行器的数据已由调用方暂存到主机，
//! 闭包在主机上顺序执行。

use std::iter::Sum;
use std::ops::Range;

use rayon::prelude::*;

use crate::executor::Executor;

/// 对 `range` 中的每个索引执行 `kernel`
pub fn parallel_for<F>(exec: &Executor, range: Range<usize>, kernel: F)
where
    F: Fn(usize) + Sync + Send,
{
    match exec {
        Executor::Cpu(cpu) => cpu.install(|| range.into_par_iter().for_each(&kernel)),
        Executor::Serial(_) | Executor::Gpu(_) => range.for_each(kernel),
    }
}

/// 对每个元素执行 `kernel(i, &mut x)`
pub fn parallel_for_each_mut<T, F>(exec: &Executor, data: &mut [T], kernel: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    match exec {
        Executor::Cpu(cpu) => cpu.install(|| {
            data.par_iter_mut()
                .enumerate()
                .for_each(|(i, x)| kernel(i, x))
        }),
        Executor::Serial(_) | Executor::Gpu(_) => {
            data.iter_mut().enumerate().for_each(|(i, x)| kernel(i, x))
        }
    }
}

/// 用 `f(i)` 填充每个元素
pub fn parallel_fill_with<T, F>(exec: &Executor, data: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    parallel_for_each_mut(exec, data, |i, x| *x = f(i));
}

/// 对 `range` 求 `f(i)` 之和
pub fn parallel_reduce_sum<T, F>(exec: &Executor, range: Range<usize>, f: F) -> T
where
    T: Send + Sum<T>,
    F: Fn(usize) -> T + Sync + Send,
{
    match exec {
        Executor::Cpu(cpu) => cpu.install(|| range.into_par_iter().map(&f).sum()),
        Executor::Serial(_) | Executor::Gpu(_) => range.map(f).sum(),
    }
}

/// 判断 `range` 内是否所有索引都满足谓词
pub fn parallel_all<F>(exec: &Executor, range: Range<usize>, pred: F) -> bool
where
    F: Fn(usize) -> bool + Sync + Send,
{
    match exec {
        Executor::Cpu(cpu) => cpu.install(|| range.into_par_iter().all(&pred)),
        Executor::Serial(_) | Executor::Gpu(_) => range.into_iter().all(pred),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_serial_for() {
        let exec = Executor::host();
        let count = AtomicUsize::new(0);
        parallel_for(&exec, 0..10, |i| {
            count.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(count.load(Ordering::Relaxed), 45);
    }

    #[test]
    fn test_serial_fill_and_sum() {
        let exec = Executor::host();
        let mut data = vec![0.0_f64; 5];
        parallel_fill_with(&exec, &mut data, |i| i as f64 * 0.5);
        assert_eq!(data, vec![0.0, 0.5, 1.0, 1.5, 2.0]);

        let sum: f64 = parallel_reduce_sum(&exec, 0..data.len(), |i| data[i]);
        assert_eq!(sum, 5.0);
        assert!(parallel_all(&exec, 0..data.len(), |i| data[i] >= 0.0));
    }
}
