// crates/fv_runtime/src/memory.rs

//! 内存空间
//!
//! 描述数据物理驻留的位置。主机内存对 CPU 直接可见，设备内存只能
//! 通过显式传输访问。

use std::fmt;

/// 内存空间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemorySpace {
    /// 主机内存 (CPU)
    Host,
    /// 设备内存 (GPU)，附带设备序号
    Device(usize),
}

impl MemorySpace {
    /// 是否为主机内存
    #[inline]
    pub const fn is_host(self) -> bool {
        matches!(self, Self::Host)
    }

    /// 是否为设备内存
    #[inline]
    pub const fn is_device(self) -> bool {
        matches!(self, Self::Device(_))
    }
}

impl fmt::Display for MemorySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Device(id) => write!(f, "device:{}", id),
        }
    }
}
