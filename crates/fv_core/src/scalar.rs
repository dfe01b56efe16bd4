// crates/fv_core/src/scalar.rs

//! 基本数值类型与元素约束
//!
//! - [`Scalar`]: 浮点标量（f64）
//! - [`Label`]: 整数标签（i32），用于单元编号、面编号等
//! - [`LocalIdx`]: 本地索引
//! - [`Element`]: 可存入 [`Vector`](crate::Vector) 的元素类型（密封）

use std::fmt::Debug;

use bytemuck::Pod;

use crate::vec3::Vec3;

/// 浮点标量
pub type Scalar = f64;

/// 整数标签
pub type Label = i32;

/// 本地索引
pub type LocalIdx = usize;

// 密封trait，禁止外部实现
mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for u32 {}
    impl Sealed for super::Vec3 {}
}

/// 容器元素类型约束
///
/// 元素必须是 `Pod`，这样才能按字节搬运到设备缓冲区。
/// 尺寸均为 4 字节的整数倍。
pub trait Element:
    private::Sealed + Pod + PartialEq + Debug + Default + Send + Sync + 'static
{
    /// 类型名称
    const NAME: &'static str;

    /// 零值
    const ZERO: Self;

    /// 单位值
    const ONE: Self;
}

macro_rules! impl_element {
    ($($ty:ty => $name:literal, $zero:expr, $one:expr;)*) => {
        $(
            impl Element for $ty {
                const NAME: &'static str = $name;
                const ZERO: Self = $zero;
                const ONE: Self = $one;
            }
        )*
    };
}

impl_element! {
    f32 => "f32", 0.0, 1.0;
    f64 => "scalar", 0.0, 1.0;
    i32 => "label", 0, 1;
    i64 => "i64", 0, 1;
    u32 => "u32", 0, 1;
    Vec3 => "vec3", Vec3::ZERO, Vec3::ONE;
}

/// 元素类型的零值
#[inline]
pub fn zero<T: Element>() -> T {
    T::ZERO
}

/// 元素类型的单位值
#[inline]
pub fn one<T: Element>() -> T {
    T::ONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_one() {
        assert_eq!(zero::<Scalar>(), 0.0);
        assert_eq!(one::<Label>(), 1);
        assert_eq!(zero::<Vec3>(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(one::<Vec3>(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_element_sizes_are_word_aligned() {
        assert_eq!(std::mem::size_of::<Vec3>(), 24);
        assert_eq!(std::mem::size_of::<Label>() % 4, 0);
        assert_eq!(<Vec3 as Element>::NAME, "vec3");
    }

    #[test]
    fn test_zero_matches_zeroed_bytes() {
        assert_eq!(<Vec3 as bytemuck::Zeroable>::zeroed(), Vec3::ZERO);
        assert_eq!(<f64 as bytemuck::Zeroable>::zeroed(), <f64 as Element>::ZERO);
    }
}
