// crates/fv_core/src/vector.rs

//! Vector - 执行器绑定的泛型容器
//!
//! `Vector<T>` 是长度可变、从 0 开始索引的元素序列，数据驻留在所绑定
//! 执行器的内存空间中：
//!
//! - Serial / CPU 执行器：主机 `Vec<T>`
//! - GPU 执行器：设备 [`GpuBuffer<T>`]
//!
//! 存储形式在构造时按执行器选定一次，执行器绑定此后不可更改。
//! 跨内存空间只有一条路径：[`Vector::copy_to_host`]，它总是分配新的
//! 主机存储并绑定到串行执行器，结果与原容器互不影响。
//!
//! 扩容出的新元素为零值。GPU 上的逐元素运算经主机暂存完成。

use std::borrow::Cow;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};
use std::sync::Arc;

use fv_runtime::parallel::parallel_fill_with;
use fv_runtime::{DeviceBuffer, Executor, GpuBuffer, MemorySpace, RuntimeError, RuntimeResult};
use log::trace;
use serde::{Serialize, Serializer};

use crate::ops;
use crate::scalar::{Element, Label, Scalar};
use crate::vec3::Vec3;

/// 实际存储
#[derive(Clone)]
enum Storage<T: Element> {
    Host(Vec<T>),
    Device(GpuBuffer<T>),
}

/// 执行器绑定的泛型容器
#[derive(Clone)]
pub struct Vector<T: Element> {
    exec: Executor,
    storage: Storage<T>,
}

/// 标量容器
pub type ScalarVector = Vector<Scalar>;
/// 三维向量容器
pub type VectorVector = Vector<Vec3>;
/// 标签容器
pub type LabelVector = Vector<Label>;

impl<T: Element> Vector<T> {
    /// 创建空容器
    pub fn new(exec: &Executor) -> Self {
        Self::with_size(exec, 0)
    }

    /// 创建 `size` 个零元素
    ///
    /// # Panics
    ///
    /// 设备分配失败时 panic，需要处理失败时用 [`try_with_size`](Self::try_with_size)。
    pub fn with_size(exec: &Executor, size: usize) -> Self {
        Self::try_with_size(exec, size).unwrap_or_else(|err| allocation_failed(err))
    }

    /// 创建 `size` 个零元素，设备分配失败时返回错误
    pub fn try_with_size(exec: &Executor, size: usize) -> RuntimeResult<Self> {
        let storage = match exec {
            Executor::Gpu(gpu) => {
                Storage::Device(GpuBuffer::zeroed(Arc::clone(gpu.context()), size)?)
            }
            Executor::Serial(_) | Executor::Cpu(_) => Storage::Host(vec![T::ZERO; size]),
        };
        Ok(Self {
            exec: exec.clone(),
            storage,
        })
    }

    /// 创建 `size` 个值为 `value` 的元素
    ///
    /// # Panics
    ///
    /// 设备分配失败时 panic。
    pub fn filled(exec: &Executor, size: usize, value: T) -> Self {
        Self::try_filled(exec, size, value).unwrap_or_else(|err| allocation_failed(err))
    }

    /// 创建 `size` 个值为 `value` 的元素，设备分配失败时返回错误
    pub fn try_filled(exec: &Executor, size: usize, value: T) -> RuntimeResult<Self> {
        if let Executor::Gpu(gpu) = exec {
            // 先在设备上分配，避免为超限请求构造主机数组
            let mut buf = GpuBuffer::zeroed(Arc::clone(gpu.context()), size)?;
            buf.fill(value);
            return Ok(Self {
                exec: exec.clone(),
                storage: Storage::Device(buf),
            });
        }
        Self::try_from_vec(exec, vec![value; size])
    }

    /// 从主机切片复制
    ///
    /// # Panics
    ///
    /// 设备分配失败时 panic。
    pub fn from_slice(exec: &Executor, data: &[T]) -> Self {
        Self::try_from_slice(exec, data).unwrap_or_else(|err| allocation_failed(err))
    }

    /// 从主机切片复制，设备分配失败时返回错误
    pub fn try_from_slice(exec: &Executor, data: &[T]) -> RuntimeResult<Self> {
        let storage = match exec {
            Executor::Gpu(gpu) => {
                Storage::Device(GpuBuffer::from_slice(Arc::clone(gpu.context()), data)?)
            }
            Executor::Serial(_) | Executor::Cpu(_) => Storage::Host(data.to_vec()),
        };
        Ok(Self {
            exec: exec.clone(),
            storage,
        })
    }

    /// 接管主机 `Vec`（GPU 执行器上会上传到设备）
    ///
    /// # Panics
    ///
    /// 设备分配失败时 panic。
    pub fn from_vec(exec: &Executor, data: Vec<T>) -> Self {
        Self::try_from_vec(exec, data).unwrap_or_else(|err| allocation_failed(err))
    }

    /// 接管主机 `Vec`，设备分配失败时返回错误
    pub fn try_from_vec(exec: &Executor, data: Vec<T>) -> RuntimeResult<Self> {
        match exec {
            Executor::Gpu(_) => Self::try_from_slice(exec, &data),
            Executor::Serial(_) | Executor::Cpu(_) => Ok(Self {
                exec: exec.clone(),
                storage: Storage::Host(data),
            }),
        }
    }

    /// 复制一份绑定同一执行器的容器，设备分配失败时返回错误
    pub fn try_clone(&self) -> RuntimeResult<Self> {
        let storage = match &self.storage {
            Storage::Host(data) => Storage::Host(data.clone()),
            Storage::Device(buf) => Storage::Device(buf.try_clone()?),
        };
        Ok(Self {
            exec: self.exec.clone(),
            storage,
        })
    }

    /// 绑定的执行器
    #[inline]
    pub fn exec(&self) -> &Executor {
        &self.exec
    }

    /// 元素个数
    #[inline]
    pub fn size(&self) -> usize {
        match &self.storage {
            Storage::Host(data) => data.len(),
            Storage::Device(buf) => buf.len(),
        }
    }

    /// 元素个数（同 [`size`](Self::size)）
    #[inline]
    pub fn len(&self) -> usize {
        self.size()
    }

    /// 是否为空
    #[inline]
    pub fn empty(&self) -> bool {
        self.size() == 0
    }

    /// 是否为空（同 [`empty`](Self::empty)）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty()
    }

    /// 索引区间 `(0, size)`
    #[inline]
    pub fn range(&self) -> (usize, usize) {
        (0, self.size())
    }

    /// 数据所在的内存空间
    pub fn memory_space(&self) -> MemorySpace {
        match &self.storage {
            Storage::Host(data) => data.memory_space(),
            Storage::Device(buf) => buf.memory_space(),
        }
    }

    /// 数据是否在主机内存
    #[inline]
    pub fn is_host(&self) -> bool {
        matches!(self.storage, Storage::Host(_))
    }

    /// 主机只读切片，设备驻留时返回 `HostAccessDenied`
    pub fn host_slice(&self) -> RuntimeResult<&[T]> {
        match &self.storage {
            Storage::Host(data) => Ok(data.as_slice()),
            Storage::Device(_) => Err(self.host_access_denied("host_slice")),
        }
    }

    /// 主机可变切片，设备驻留时返回 `HostAccessDenied`
    pub fn host_slice_mut(&mut self) -> RuntimeResult<&mut [T]> {
        match &mut self.storage {
            Storage::Host(data) => Ok(data.as_mut_slice()),
            Storage::Device(_) => Err(RuntimeError::HostAccessDenied {
                operation: "host_slice_mut",
                executor: self.exec.name(),
            }),
        }
    }

    /// 复制到主机 `Vec`（设备驻留时阻塞至传输完成）
    pub fn to_vec(&self) -> RuntimeResult<Vec<T>> {
        match &self.storage {
            Storage::Host(data) => Ok(data.clone()),
            Storage::Device(buf) => buf.copy_to_vec(),
        }
    }

    /// 读取第 `i` 个元素
    pub fn get(&self, i: usize) -> RuntimeResult<T> {
        self.check_index(i)?;
        match &self.storage {
            Storage::Host(data) => Ok(data[i]),
            Storage::Device(buf) => buf.read_at(i),
        }
    }

    /// 写入第 `i` 个元素
    pub fn set(&mut self, i: usize, value: T) -> RuntimeResult<()> {
        self.check_index(i)?;
        match &mut self.storage {
            Storage::Host(data) => {
                data[i] = value;
                Ok(())
            }
            Storage::Device(buf) => buf.write_at(i, value),
        }
    }

    /// 调整大小，保留前 `min(old, new)` 个元素，新元素为零
    ///
    /// # Panics
    ///
    /// 设备重新分配失败时 panic，需要处理失败时用 [`try_resize`](Self::try_resize)。
    pub fn resize(&mut self, size: usize) {
        if let Err(err) = self.try_resize(size) {
            allocation_failed(err)
        }
    }

    /// 调整大小，设备重新分配失败时返回错误且原内容不变
    pub fn try_resize(&mut self, size: usize) -> RuntimeResult<()> {
        match &mut self.storage {
            Storage::Host(data) => DeviceBuffer::resize(data, size),
            Storage::Device(buf) => buf.resize(size),
        }
    }

    /// 复制到新的主机容器（绑定串行执行器）
    pub fn copy_to_host(&self) -> RuntimeResult<Vector<T>> {
        trace!(
            "Vector<{}> copy_to_host: {} elements from {}",
            T::NAME,
            self.size(),
            self.exec
        );
        Ok(Vector {
            exec: Executor::host(),
            storage: Storage::Host(self.to_vec()?),
        })
    }

    /// 复制到已有的主机容器，目标长度随之调整
    pub fn copy_to_host_into(&self, dst: &mut Vector<T>) -> RuntimeResult<()> {
        let values = self.host_view()?;
        let executor = dst.exec.name();
        match &mut dst.storage {
            Storage::Host(data) => DeviceBuffer::copy_from_slice(data, &*values),
            Storage::Device(_) => Err(RuntimeError::HostAccessDenied {
                operation: "copy_to_host_into",
                executor,
            }),
        }
    }

    /// 所有元素赋值为 `value`
    pub fn assign_value(&mut self, value: T) {
        match &mut self.storage {
            Storage::Host(data) => parallel_fill_with(&self.exec, data, |_| value),
            Storage::Device(buf) => buf.fill(value),
        }
    }

    /// 复制 `other` 的内容，长度随之调整
    pub fn assign(&mut self, other: &Vector<T>) -> RuntimeResult<()> {
        let values = other.host_view()?;
        match &mut self.storage {
            Storage::Host(data) => DeviceBuffer::copy_from_slice(data, &*values),
            Storage::Device(buf) => buf.copy_from_slice(&*values),
        }
    }

    /// 主机视图：主机驻留时借用，设备驻留时下载
    pub(crate) fn host_view(&self) -> RuntimeResult<Cow<'_, [T]>> {
        match &self.storage {
            Storage::Host(data) => Ok(Cow::Borrowed(data.as_slice())),
            Storage::Device(buf) => Ok(Cow::Owned(buf.copy_to_vec()?)),
        }
    }

    /// 在主机数据上就地修改，设备驻留时下载、修改、回传
    pub(crate) fn modify<F>(&mut self, f: F) -> RuntimeResult<()>
    where
        F: FnOnce(&Executor, &mut [T]),
    {
        match &mut self.storage {
            Storage::Host(data) => f(&self.exec, data.as_mut_slice()),
            Storage::Device(buf) => {
                let mut staged = buf.copy_to_vec()?;
                f(&self.exec, &mut staged);
                buf.copy_from_slice(&staged)?;
            }
        }
        Ok(())
    }

    fn check_index(&self, i: usize) -> RuntimeResult<()> {
        let len = self.size();
        if i >= len {
            return Err(RuntimeError::index_out_of_bounds("Vector", i, len));
        }
        Ok(())
    }

    fn host_access_denied(&self, operation: &'static str) -> RuntimeError {
        RuntimeError::HostAccessDenied {
            operation,
            executor: self.exec.name(),
        }
    }
}

fn allocation_failed(err: RuntimeError) -> ! {
    panic!("Vector allocation failed: {}", err)
}

impl<T: Element> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("exec", &self.exec)
            .field("type", &T::NAME)
            .field("size", &self.size())
            .finish()
    }
}

impl<T: Element + Serialize> Serialize for Vector<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values = self.host_view().map_err(serde::ser::Error::custom)?;
        values.serialize(serializer)
    }
}

// =============================================================================
// 运算符
//
// 长度不一致时 panic，需要错误值时使用 `ops` 中的同名函数。
// =============================================================================

impl<T> AddAssign<&Vector<T>> for Vector<T>
where
    T: Element + Add<Output = T>,
{
    fn add_assign(&mut self, rhs: &Vector<T>) {
        if let Err(err) = ops::add(self, rhs) {
            panic!("Vector += failed: {}", err);
        }
    }
}

impl<T> SubAssign<&Vector<T>> for Vector<T>
where
    T: Element + Sub<Output = T>,
{
    fn sub_assign(&mut self, rhs: &Vector<T>) {
        if let Err(err) = ops::sub(self, rhs) {
            panic!("Vector -= failed: {}", err);
        }
    }
}

impl<T> MulAssign<Scalar> for Vector<T>
where
    T: Element + Mul<Scalar, Output = T>,
{
    fn mul_assign(&mut self, rhs: Scalar) {
        if let Err(err) = ops::scalar_mul(self, rhs) {
            panic!("Vector *= failed: {}", err);
        }
    }
}

/// 按元素乘以标量场
impl<T> MulAssign<&Vector<Scalar>> for Vector<T>
where
    T: Element + Mul<Scalar, Output = T>,
{
    fn mul_assign(&mut self, rhs: &Vector<Scalar>) {
        if let Err(err) = ops::scale(self, rhs) {
            panic!("Vector *= failed: {}", err);
        }
    }
}

impl<T> Add<&Vector<T>> for &Vector<T>
where
    T: Element + Add<Output = T>,
{
    type Output = Vector<T>;

    fn add(self, rhs: &Vector<T>) -> Vector<T> {
        let mut result = self.clone();
        result += rhs;
        result
    }
}

impl<T> Sub<&Vector<T>> for &Vector<T>
where
    T: Element + Sub<Output = T>,
{
    type Output = Vector<T>;

    fn sub(self, rhs: &Vector<T>) -> Vector<T> {
        let mut result = self.clone();
        result -= rhs;
        result
    }
}

impl<T> Mul<Scalar> for &Vector<T>
where
    T: Element + Mul<Scalar, Output = T>,
{
    type Output = Vector<T>;

    fn mul(self, rhs: Scalar) -> Vector<T> {
        let mut result = self.clone();
        result *= rhs;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial() -> Executor {
        Executor::host()
    }

    #[test]
    fn test_constructors() {
        let exec = serial();
        let empty = Vector::<Scalar>::new(&exec);
        assert!(empty.empty());
        assert_eq!(empty.size(), 0);
        assert_eq!(empty.range(), (0, 0));

        let zeros = Vector::<Scalar>::with_size(&exec, 3);
        assert_eq!(zeros.to_vec().unwrap(), vec![0.0; 3]);

        let filled = Vector::filled(&exec, 4, 2.5);
        assert_eq!(filled.host_slice().unwrap(), &[2.5; 4]);

        let labels = LabelVector::from_slice(&exec, &[1, 2, 3]);
        assert_eq!(labels.size(), 3);
        assert_eq!(labels.exec(), &exec);
        assert_eq!(labels.memory_space(), MemorySpace::Host);
    }

    #[test]
    fn test_resize_preserves_prefix_and_zero_fills() {
        let exec = serial();
        let mut v = ScalarVector::from_slice(&exec, &[1.0, 2.0, 3.0]);
        v.resize(2);
        assert_eq!(v.to_vec().unwrap(), vec![1.0, 2.0]);
        v.resize(4);
        assert_eq!(v.to_vec().unwrap(), vec![1.0, 2.0, 0.0, 0.0]);
        v.resize(0);
        assert!(v.empty());
    }

    #[test]
    fn test_copy_to_host_is_independent() {
        let exec = serial();
        let mut v = VectorVector::filled(&exec, 2, Vec3::ONE);
        let host = v.copy_to_host().unwrap();
        v.assign_value(Vec3::ZERO);
        assert_eq!(host.to_vec().unwrap(), vec![Vec3::ONE; 2]);
        assert_eq!(host.exec(), &Executor::host());
    }

    #[test]
    fn test_get_set_bounds() {
        let exec = serial();
        let mut v = ScalarVector::with_size(&exec, 2);
        v.set(1, 4.0).unwrap();
        assert_eq!(v.get(1).unwrap(), 4.0);
        assert!(v.get(2).unwrap_err().is_out_of_bounds());
        assert!(v.set(5, 1.0).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn test_assign_and_copy_into() {
        let exec = serial();
        let src = LabelVector::from_slice(&exec, &[4, 5, 6]);
        let mut dst = LabelVector::with_size(&exec, 1);
        dst.assign(&src).unwrap();
        assert_eq!(dst.to_vec().unwrap(), vec![4, 5, 6]);

        let mut host = LabelVector::new(&exec);
        src.copy_to_host_into(&mut host).unwrap();
        assert_eq!(host.to_vec().unwrap(), vec![4, 5, 6]);
    }

    #[test]
    fn test_operators() {
        let exec = serial();
        let a = ScalarVector::from_slice(&exec, &[1.0, 2.0, 3.0]);
        let b = ScalarVector::filled(&exec, 3, 1.0);
        assert_eq!((&a + &b).to_vec().unwrap(), vec![2.0, 3.0, 4.0]);
        assert_eq!((&a - &b).to_vec().unwrap(), vec![0.0, 1.0, 2.0]);
        assert_eq!((&a * 2.0).to_vec().unwrap(), vec![2.0, 4.0, 6.0]);

        let mut c = a.clone();
        c += &b;
        c -= &a;
        c *= 3.0;
        assert_eq!(c.to_vec().unwrap(), vec![3.0; 3]);

        let mut v = VectorVector::filled(&exec, 3, crate::Vec3::ONE);
        v *= &a;
        assert_eq!(v.get(2).unwrap(), crate::Vec3::splat(3.0));
    }

    #[test]
    #[should_panic]
    fn test_mismatched_operator_panics() {
        let exec = serial();
        let mut a = ScalarVector::with_size(&exec, 3);
        let b = ScalarVector::with_size(&exec, 2);
        a += &b;
    }

    #[test]
    fn test_debug_format() {
        let v = ScalarVector::with_size(&serial(), 2);
        let s = format!("{:?}", v);
        assert!(s.contains("SerialExecutor"));
        assert!(s.contains("size: 2"));
    }
}
