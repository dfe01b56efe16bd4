// crates/fv_runtime/src/buffer.rs

//! DeviceBuffer - 设备缓冲区抽象
//!
//! 统一主机缓冲区（`Vec<T>`）与 GPU 缓冲区（[`GpuBuffer`](crate::gpu::GpuBuffer)）
//! 的访问接口。容器在构造时按执行器的内存空间选定一种实现，之后
//! 所有操作按缓冲区整体分派，而不是逐元素分派。
//!
//! 约定：`resize` 扩展出的新元素一律为零（`T::zeroed()`）。

use bytemuck::Pod;

use crate::error::RuntimeResult;
use crate::memory::MemorySpace;

/// 设备缓冲区 Trait
pub trait DeviceBuffer<T: Pod + Send + Sync>: Clone + Send + Sync {
    /// 返回缓冲区长度
    fn len(&self) -> usize;

    /// 检查是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 数据所在的内存空间
    fn memory_space(&self) -> MemorySpace;

    /// 尝试获取只读切片（设备缓冲区返回 None）
    fn try_as_slice(&self) -> Option<&[T]>;

    /// 尝试获取可变切片（设备缓冲区返回 None）
    fn try_as_slice_mut(&mut self) -> Option<&mut [T]>;

    /// 用指定值填充
    fn fill(&mut self, value: T);

    /// 用切片内容替换缓冲区，长度随之改变
    ///
    /// 长度变化需要重新分配，设备缓冲区分配失败时返回错误。
    fn copy_from_slice(&mut self, src: &[T]) -> RuntimeResult<()>;

    /// 复制到新的主机 Vec（设备缓冲区会阻塞至传输完成）
    fn copy_to_vec(&self) -> RuntimeResult<Vec<T>>;

    /// 调整大小，保留前缀，新元素置零
    fn resize(&mut self, new_len: usize) -> RuntimeResult<()>;
}

// =============================================================================
// Vec<T> 实现
// =============================================================================

impl<T: Pod + Send + Sync> DeviceBuffer<T> for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn memory_space(&self) -> MemorySpace {
        MemorySpace::Host
    }

    #[inline]
    fn try_as_slice(&self) -> Option<&[T]> {
        Some(self.as_slice())
    }

    #[inline]
    fn try_as_slice_mut(&mut self) -> Option<&mut [T]> {
        Some(self.as_mut_slice())
    }

    #[inline]
    fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    fn copy_from_slice(&mut self, src: &[T]) -> RuntimeResult<()> {
        Vec::clear(self);
        self.extend_from_slice(src);
        Ok(())
    }

    #[inline]
    fn copy_to_vec(&self) -> RuntimeResult<Vec<T>> {
        Ok(self.clone())
    }

    fn resize(&mut self, new_len: usize) -> RuntimeResult<()> {
        Vec::resize(self, new_len, T::zeroed());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_buffer() {
        let mut buf: Vec<f64> = vec![0.0; 10];
        assert_eq!(DeviceBuffer::len(&buf), 10);
        assert!(!DeviceBuffer::is_empty(&buf));
        assert_eq!(buf.memory_space(), MemorySpace::Host);

        DeviceBuffer::fill(&mut buf, 1.0);
        assert!(buf.iter().all(|&x| x == 1.0));

        buf[5] = 2.0;
        assert_eq!(buf.try_as_slice().map(|s| s[5]), Some(2.0));
    }

    #[test]
    fn test_copy_from_slice_changes_length() {
        let mut buf: Vec<f32> = vec![0.0; 5];
        DeviceBuffer::copy_from_slice(&mut buf, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(buf, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_resize_zero_fills() {
        let mut buf: Vec<i32> = vec![7, 8, 9];
        DeviceBuffer::resize(&mut buf, 2).unwrap();
        assert_eq!(buf, vec![7, 8]);
        DeviceBuffer::resize(&mut buf, 4).unwrap();
        assert_eq!(buf, vec![7, 8, 0, 0]);
        assert_eq!(buf.copy_to_vec(), Ok(vec![7, 8, 0, 0]));
    }
}
