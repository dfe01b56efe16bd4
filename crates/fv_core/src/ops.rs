// crates/fv_core/src/ops.rs

//! Vector 自由函数
//!
//! 填充、映射、逐元素运算与比较。所有函数按容器绑定的执行器执行，
//! 区间越界返回 `IndexOutOfBounds`，长度不一致返回 `SizeMismatch`。

use std::iter::Sum;
use std::ops::{Add, Mul, Range, Sub};

use fv_runtime::parallel::{parallel_all, parallel_for_each_mut, parallel_reduce_sum};
use fv_runtime::{RuntimeError, RuntimeResult};

use crate::scalar::{Element, Scalar};
use crate::vector::Vector;

fn check_range(len: usize, range: &Range<usize>) -> RuntimeResult<()> {
    if range.start > range.end || range.end > len {
        return Err(RuntimeError::index_out_of_bounds(
            "Vector range",
            range.end,
            len,
        ));
    }
    Ok(())
}

fn check_same_size(name: &str, expected: usize, actual: usize) -> RuntimeResult<()> {
    if expected != actual {
        return Err(RuntimeError::size_mismatch(name, expected, actual));
    }
    Ok(())
}

/// 所有元素赋值为 `value`
pub fn fill<T: Element>(a: &mut Vector<T>, value: T) {
    a.assign_value(value);
}

/// 区间内元素赋值为 `value`
pub fn fill_range<T: Element>(a: &mut Vector<T>, value: T, range: Range<usize>) -> RuntimeResult<()> {
    check_range(a.size(), &range)?;
    a.modify(|exec, data| parallel_for_each_mut(exec, &mut data[range], |_, x| *x = value))
}

/// `a[i] = f(i)`
pub fn map<T, F>(a: &mut Vector<T>, f: F) -> RuntimeResult<()>
where
    T: Element,
    F: Fn(usize) -> T + Sync + Send,
{
    let range = 0..a.size();
    map_range(a, f, range)
}

/// 区间内 `a[i] = f(i)`，`i` 为全局索引
pub fn map_range<T, F>(a: &mut Vector<T>, f: F, range: Range<usize>) -> RuntimeResult<()>
where
    T: Element,
    F: Fn(usize) -> T + Sync + Send,
{
    check_range(a.size(), &range)?;
    let start = range.start;
    a.modify(|exec, data| parallel_for_each_mut(exec, &mut data[range], |j, x| *x = f(start + j)))
}

/// 用切片替换全部元素，长度必须一致
pub fn set_vector<T: Element>(a: &mut Vector<T>, values: &[T]) -> RuntimeResult<()> {
    check_same_size("set_vector", a.size(), values.len())?;
    let range = 0..a.size();
    set_vector_range(a, values, range)
}

/// 区间内 `a[i] = values[i]`
pub fn set_vector_range<T: Element>(
    a: &mut Vector<T>,
    values: &[T],
    range: Range<usize>,
) -> RuntimeResult<()> {
    check_range(a.size(), &range)?;
    check_range(values.len(), &range)?;
    let start = range.start;
    a.modify(|exec, data| {
        parallel_for_each_mut(exec, &mut data[range], |j, x| *x = values[start + j])
    })
}

/// `a[i] = a[i] * value`
pub fn scalar_mul<T>(a: &mut Vector<T>, value: Scalar) -> RuntimeResult<()>
where
    T: Element + Mul<Scalar, Output = T>,
{
    a.modify(|exec, data| parallel_for_each_mut(exec, data, |_, x| *x = *x * value))
}

fn binary_op<T, U, F>(a: &mut Vector<T>, b: &Vector<U>, name: &str, op: F) -> RuntimeResult<()>
where
    T: Element,
    U: Element,
    F: Fn(T, U) -> T + Sync + Send,
{
    check_same_size(name, a.size(), b.size())?;
    let rhs = b.host_view()?;
    let rhs: &[U] = &rhs;
    a.modify(|exec, data| parallel_for_each_mut(exec, data, |i, x| *x = op(*x, rhs[i])))
}

/// `a[i] = a[i] + b[i]`
pub fn add<T>(a: &mut Vector<T>, b: &Vector<T>) -> RuntimeResult<()>
where
    T: Element + Add<Output = T>,
{
    binary_op(a, b, "add", |x, y| x + y)
}

/// `a[i] = a[i] - b[i]`
pub fn sub<T>(a: &mut Vector<T>, b: &Vector<T>) -> RuntimeResult<()>
where
    T: Element + Sub<Output = T>,
{
    binary_op(a, b, "sub", |x, y| x - y)
}

/// `a[i] = a[i] * b[i]`
pub fn mul<T>(a: &mut Vector<T>, b: &Vector<T>) -> RuntimeResult<()>
where
    T: Element + Mul<Output = T>,
{
    binary_op(a, b, "mul", |x, y| x * y)
}

/// `a[i] = a[i] * s[i]`，按标量场逐元素缩放
pub fn scale<T>(a: &mut Vector<T>, s: &Vector<Scalar>) -> RuntimeResult<()>
where
    T: Element + Mul<Scalar, Output = T>,
{
    binary_op(a, s, "scale", |x, y| x * y)
}

/// 所有元素之和
pub fn sum<T>(a: &Vector<T>) -> RuntimeResult<T>
where
    T: Element + Sum<T>,
{
    let values = a.host_view()?;
    let values: &[T] = &values;
    Ok(parallel_reduce_sum(a.exec(), 0..values.len(), |i| values[i]))
}

/// 所有元素是否都等于 `value`
pub fn equal_value<T: Element>(a: &Vector<T>, value: T) -> RuntimeResult<bool> {
    let values = a.host_view()?;
    let values: &[T] = &values;
    Ok(parallel_all(a.exec(), 0..values.len(), |i| values[i] == value))
}

/// 两个容器的长度与元素是否都相同
pub fn equal<T: Element>(a: &Vector<T>, b: &Vector<T>) -> RuntimeResult<bool> {
    let rhs = b.host_view()?;
    equal_slice(a, &rhs)
}

/// 容器与主机切片的长度与元素是否都相同
pub fn equal_slice<T: Element>(a: &Vector<T>, values: &[T]) -> RuntimeResult<bool> {
    if a.size() != values.len() {
        return Ok(false);
    }
    let lhs = a.host_view()?;
    Ok(*lhs == *values)
}

/// 批量复制到主机
pub fn copy_to_hosts<T: Element>(vectors: &[&Vector<T>]) -> RuntimeResult<Vec<Vector<T>>> {
    vectors.iter().map(|v| v.copy_to_host()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::Vec3;
    use fv_runtime::Executor;

    #[test]
    fn test_fill_and_fill_range() {
        let exec = Executor::host();
        let mut v = Vector::<Scalar>::with_size(&exec, 5);
        fill(&mut v, 1.0);
        fill_range(&mut v, 3.0, 1..3).unwrap();
        assert_eq!(v.to_vec().unwrap(), vec![1.0, 3.0, 3.0, 1.0, 1.0]);

        let err = fill_range(&mut v, 0.0, 2..6).unwrap_err();
        assert!(err.is_out_of_bounds());
    }

    #[test]
    fn test_map_uses_global_index() {
        let exec = Executor::host();
        let mut v = Vector::<i32>::with_size(&exec, 4);
        map(&mut v, |i| i as i32 * 10).unwrap();
        assert_eq!(v.to_vec().unwrap(), vec![0, 10, 20, 30]);
        map_range(&mut v, |i| -(i as i32), 2..4).unwrap();
        assert_eq!(v.to_vec().unwrap(), vec![0, 10, -2, -3]);
    }

    #[test]
    fn test_set_vector() {
        let exec = Executor::host();
        let mut v = Vector::<Vec3>::with_size(&exec, 2);
        set_vector(&mut v, &[Vec3::UNIT_X, Vec3::UNIT_Y]).unwrap();
        assert_eq!(v.get(1).unwrap(), Vec3::UNIT_Y);
        assert!(set_vector(&mut v, &[Vec3::ONE]).unwrap_err().is_size_mismatch());
    }

    #[test]
    fn test_binary_ops_and_scale() {
        let exec = Executor::host();
        let mut a = Vector::from_slice(&exec, &[1.0, 2.0, 3.0]);
        let b = Vector::from_slice(&exec, &[2.0, 2.0, 2.0]);
        mul(&mut a, &b).unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![2.0, 4.0, 6.0]);
        scalar_mul(&mut a, 0.5).unwrap();
        assert!(equal_slice(&a, &[1.0, 2.0, 3.0]).unwrap());

        let mut v = Vector::filled(&exec, 3, Vec3::ONE);
        scale(&mut v, &a).unwrap();
        assert_eq!(v.get(2).unwrap(), Vec3::splat(3.0));

        let short = Vector::<Scalar>::with_size(&exec, 2);
        assert!(add(&mut a, &short).unwrap_err().is_size_mismatch());
    }

    #[test]
    fn test_equal_and_sum() {
        let exec = Executor::host();
        let a = Vector::filled(&exec, 4, 0.25);
        let b = Vector::filled(&exec, 4, 0.25);
        let c = Vector::filled(&exec, 3, 0.25);
        assert!(equal(&a, &b).unwrap());
        assert!(!equal(&a, &c).unwrap());
        assert!(equal_value(&a, 0.25).unwrap());
        assert!(!equal_value(&a, 0.5).unwrap());
        assert_eq!(sum(&a).unwrap(), 1.0);

        let hosts = copy_to_hosts(&[&a, &c]).unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[1].size(), 3);
    }
}
