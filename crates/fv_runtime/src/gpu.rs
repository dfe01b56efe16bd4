// crates/fv_runtime/src/gpu.rs

//! wgpu GPU 上下文与设备缓冲区
//!
//! 基于 wgpu 提供跨平台的 GPU 设备（Vulkan/Metal/DX12）。
//! [`GpuContext`] 持有设备与命令队列，由进程级运行时创建一次并以
//! `Arc` 共享给所有 GPU 执行器；[`GpuBuffer`] 是驻留在设备内存中的
//! 类型化缓冲区。
//!
//! 写入通过 `Queue::write_buffer` 排队，读取经暂存缓冲区映射并阻塞
//! 等待 (`Maintain::Wait`)，所以读到的数据总是包含之前提交的全部写入。
//!
//! 分配前检查字节数溢出与设备的 `max_buffer_size`，设备内存不足经错误
//! 作用域捕获，三者都以 [`RuntimeError`] 返回。

use std::fmt;
use std::marker::PhantomData;
use std::sync::mpsc;
use std::sync::Arc;

use bytemuck::Pod;
use log::{debug, info};
use wgpu::{
    AdapterInfo, BufferDescriptor, BufferUsages, CommandEncoderDescriptor, Device,
    DeviceDescriptor, ErrorFilter, Features, Instance, InstanceDescriptor, PowerPreference,
    Queue, RequestAdapterOptions,
};

use crate::buffer::DeviceBuffer;
use crate::error::{RuntimeError, RuntimeResult};
use crate::memory::MemorySpace;

/// wgpu 复制对齐（字节）
const COPY_ALIGN: u64 = wgpu::COPY_BUFFER_ALIGNMENT;

/// GPU 上下文
#[derive(Debug)]
pub struct GpuContext {
    /// 适配器信息
    adapter_info: AdapterInfo,
    /// GPU 设备
    device: Device,
    /// 命令队列
    queue: Queue,
    /// 设备序号
    device_id: usize,
}

impl GpuContext {
    /// 异步请求 GPU 上下文
    ///
    /// 返回 `Ok(None)` 表示没有可用的 GPU 适配器。
    pub async fn request_async(power_preference: PowerPreference) -> RuntimeResult<Option<Self>> {
        let instance = Instance::new(InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = match instance
            .request_adapter(&RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
        {
            Some(adapter) => adapter,
            None => return Ok(None),
        };

        let adapter_info = adapter.get_info();
        info!(
            "Found GPU adapter: {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("fv GPU device"),
                    required_features: Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RuntimeError::device(format!("设备创建失败: {}", e)))?;

        Ok(Some(Self {
            adapter_info,
            device,
            queue,
            device_id: 0,
        }))
    }

    /// 同步请求 GPU 上下文（阻塞调用）
    pub fn request(power_preference: PowerPreference) -> RuntimeResult<Option<Self>> {
        pollster::block_on(Self::request_async(power_preference))
    }

    /// 适配器名称
    pub fn name(&self) -> &str {
        &self.adapter_info.name
    }

    /// 适配器信息
    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.adapter_info
    }

    /// wgpu 设备
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// wgpu 队列
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// 设备序号
    pub fn device_id(&self) -> usize {
        self.device_id
    }

    /// 阻塞直到队列中的全部工作完成
    pub fn synchronize(&self) {
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }

    /// 单个缓冲区允许的最大字节数
    pub fn max_buffer_size(&self) -> u64 {
        self.device.limits().max_buffer_size
    }

    /// 创建存储缓冲区（wgpu 保证内容初始化为零）
    ///
    /// 超过设备限制或设备内存不足时返回错误。
    fn create_storage(&self, bytes: u64) -> RuntimeResult<wgpu::Buffer> {
        let size = padded(bytes);
        let limit = self.max_buffer_size();
        if size > limit {
            return Err(RuntimeError::device(format!(
                "缓冲区大小 {} 字节超过设备限制 {} 字节",
                size, limit
            )));
        }

        self.device.push_error_scope(ErrorFilter::OutOfMemory);
        let buffer = self.device.create_buffer(&BufferDescriptor {
            label: Some("fv storage"),
            size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(RuntimeError::device(format!(
                "缓冲区分配失败 ({} 字节): {}",
                size, err
            ))),
            None => Ok(buffer),
        }
    }

    /// 设备内复制前 `bytes` 个字节
    fn copy_bytes(&self, src: &wgpu::Buffer, dst: &wgpu::Buffer, bytes: u64) {
        if bytes == 0 {
            return;
        }
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("copy_buffer"),
        });
        encoder.copy_buffer_to_buffer(src, 0, dst, 0, bytes);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// 读取从 `offset` 开始的 `bytes` 个字节到主机
    fn read_bytes(&self, buffer: &wgpu::Buffer, offset: u64, bytes: u64) -> RuntimeResult<Vec<u8>> {
        if bytes == 0 {
            return Ok(Vec::new());
        }
        let staging = self.device.create_buffer(&BufferDescriptor {
            label: Some("fv staging"),
            size: bytes,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("read_buffer"),
        });
        encoder.copy_buffer_to_buffer(buffer, offset, &staging, 0, bytes);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|e| RuntimeError::device(format!("映射回调丢失: {}", e)))?
            .map_err(|e| RuntimeError::device(format!("缓冲区映射失败: {}", e)))?;

        let data = slice.get_mapped_range();
        let out = data.to_vec();
        drop(data);
        staging.unmap();
        Ok(out)
    }
}

/// 向上取整到复制对齐，且至少一个对齐单位
#[inline]
fn padded(bytes: u64) -> u64 {
    bytes.div_ceil(COPY_ALIGN).max(1).saturating_mul(COPY_ALIGN)
}

/// `len` 个 `T` 的字节数，溢出时返回错误
pub fn checked_byte_len<T>(len: usize) -> RuntimeResult<u64> {
    len.checked_mul(std::mem::size_of::<T>())
        .and_then(|bytes| u64::try_from(bytes).ok())
        .ok_or_else(|| {
            RuntimeError::invalid_argument(
                "GpuBuffer",
                format!(
                    "{} 个 {} 字节元素的总字节数溢出",
                    len,
                    std::mem::size_of::<T>()
                ),
            )
        })
}

/// 元素尺寸必须是复制对齐的整数倍
struct AlignCheck<T>(PhantomData<T>);

impl<T> AlignCheck<T> {
    const OK: () = assert!(
        std::mem::size_of::<T>() % 4 == 0,
        "GpuBuffer 元素尺寸必须是 4 字节的整数倍"
    );
}

// =============================================================================
// GpuBuffer
// =============================================================================

/// 驻留在 GPU 设备内存中的类型化缓冲区
pub struct GpuBuffer<T: Pod> {
    context: Arc<GpuContext>,
    raw: wgpu::Buffer,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod + Send + Sync> GpuBuffer<T> {
    /// 分配 `len` 个零元素
    ///
    /// 字节数溢出、超过设备限制或设备内存不足时返回错误。
    pub fn zeroed(context: Arc<GpuContext>, len: usize) -> RuntimeResult<Self> {
        #[allow(clippy::let_unit_value)]
        let () = AlignCheck::<T>::OK;
        let raw = context.create_storage(checked_byte_len::<T>(len)?)?;
        Ok(Self {
            context,
            raw,
            len,
            _marker: PhantomData,
        })
    }

    /// 从主机切片上传
    pub fn from_slice(context: Arc<GpuContext>, data: &[T]) -> RuntimeResult<Self> {
        let mut buffer = Self::zeroed(context, data.len())?;
        buffer.write_all(data);
        Ok(buffer)
    }

    /// 底层 wgpu 缓冲区
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    /// 所属 GPU 上下文
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.context
    }

    /// 读取第 `i` 个元素，只传输该元素的字节
    pub fn read_at(&self, i: usize) -> RuntimeResult<T> {
        self.check_index(i)?;
        let bytes = self
            .context
            .read_bytes(&self.raw, Self::offset_of(i), Self::byte_len(1))?;
        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    /// 写入第 `i` 个元素，只传输该元素的字节
    pub fn write_at(&mut self, i: usize, value: T) -> RuntimeResult<()> {
        self.check_index(i)?;
        self.context
            .queue
            .write_buffer(&self.raw, Self::offset_of(i), bytemuck::bytes_of(&value));
        Ok(())
    }

    // 已分配缓冲区的长度不会溢出
    #[inline]
    fn byte_len(len: usize) -> u64 {
        (len * std::mem::size_of::<T>()) as u64
    }

    #[inline]
    fn offset_of(i: usize) -> u64 {
        Self::byte_len(i)
    }

    fn check_index(&self, i: usize) -> RuntimeResult<()> {
        if i >= self.len {
            return Err(RuntimeError::index_out_of_bounds("GpuBuffer", i, self.len));
        }
        Ok(())
    }

    fn write_all(&mut self, data: &[T]) {
        debug_assert_eq!(data.len(), self.len);
        if !data.is_empty() {
            self.context
                .queue
                .write_buffer(&self.raw, 0, bytemuck::cast_slice(data));
        }
    }
}

impl<T: Pod + Send + Sync> Clone for GpuBuffer<T> {
    /// 设备内复制
    ///
    /// # Panics
    ///
    /// 设备内存不足时 panic，需要错误值时使用 [`GpuBuffer::try_clone`]。
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("GpuBuffer clone failed: {}", err),
        }
    }
}

impl<T: Pod + Send + Sync> GpuBuffer<T> {
    /// 设备内复制，分配失败时返回错误
    pub fn try_clone(&self) -> RuntimeResult<Self> {
        let copy = Self::zeroed(Arc::clone(&self.context), self.len)?;
        self.context
            .copy_bytes(&self.raw, &copy.raw, Self::byte_len(self.len));
        Ok(copy)
    }
}

impl<T: Pod> fmt::Debug for GpuBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("len", &self.len)
            .field("device", &self.context.name())
            .finish()
    }
}

impl<T: Pod + Send + Sync> DeviceBuffer<T> for GpuBuffer<T> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn memory_space(&self) -> MemorySpace {
        MemorySpace::Device(self.context.device_id)
    }

    #[inline]
    fn try_as_slice(&self) -> Option<&[T]> {
        None
    }

    #[inline]
    fn try_as_slice_mut(&mut self) -> Option<&mut [T]> {
        None
    }

    fn fill(&mut self, value: T) {
        let host = vec![value; self.len];
        self.write_all(&host);
    }

    fn copy_from_slice(&mut self, src: &[T]) -> RuntimeResult<()> {
        if src.len() != self.len {
            *self = Self::zeroed(Arc::clone(&self.context), src.len())?;
        }
        self.write_all(src);
        Ok(())
    }

    fn copy_to_vec(&self) -> RuntimeResult<Vec<T>> {
        let bytes = self
            .context
            .read_bytes(&self.raw, 0, Self::byte_len(self.len))?;
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }

    fn resize(&mut self, new_len: usize) -> RuntimeResult<()> {
        if new_len == self.len {
            return Ok(());
        }
        debug!("GpuBuffer resize {} -> {}", self.len, new_len);
        let resized = Self::zeroed(Arc::clone(&self.context), new_len)?;
        let keep = Self::byte_len(self.len.min(new_len));
        self.context.copy_bytes(&self.raw, &resized.raw, keep);
        *self = resized;
        Ok(())
    }
}
