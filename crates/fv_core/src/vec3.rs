// crates/fv_core/src/vec3.rs

//! Vec3 - 三维向量
//!
//! 值类型，分量 x、y、z。`#[repr(C)]` 且实现 `Pod`，可以直接放入设备
//! 缓冲区。下标访问与具名字段访问指向同一存储：`v.y = k` 之后
//! `v[1] == k`，反之亦然。
//!
//! # 示例
//!
//! ```
//! use fv_core::Vec3;
//!
//! let a = Vec3::new(1.0, 2.0, 3.0);
//! let b = Vec3::splat(2.0);
//! assert_eq!(a + b, Vec3::new(3.0, 4.0, 5.0));
//! assert_eq!(a.dot(&b), 12.0);
//! assert_eq!(2.0 * a, a * 2.0);
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::scalar::{Label, Scalar};

/// 三维向量
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
pub struct Vec3 {
    /// X 分量
    pub x: Scalar,
    /// Y 分量
    pub y: Scalar,
    /// Z 分量
    pub z: Scalar,
}

impl Vec3 {
    /// 零向量
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// 全 1 向量
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// 单位X向量
    pub const UNIT_X: Self = Self::new(1.0, 0.0, 0.0);

    /// 单位Y向量
    pub const UNIT_Y: Self = Self::new(0.0, 1.0, 0.0);

    /// 单位Z向量
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0);

    /// 由三个分量创建
    #[inline]
    #[must_use]
    pub const fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    /// 三个分量均为 `value`
    #[inline]
    #[must_use]
    pub const fn splat(value: Scalar) -> Self {
        Self::new(value, value, value)
    }

    /// 点积
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> Scalar {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// 叉积
    #[inline]
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// 欧几里得长度
    #[inline]
    #[must_use]
    pub fn mag(&self) -> Scalar {
        self.dot(self).sqrt()
    }

    /// 单位化，零向量返回零向量
    #[inline]
    #[must_use]
    pub fn normalize_or_zero(&self) -> Self {
        let m = self.mag();
        if m > 0.0 {
            *self * (1.0 / m)
        } else {
            Self::ZERO
        }
    }

    /// 带越界检查的分量读取
    #[inline]
    pub fn get(&self, i: usize) -> Option<Scalar> {
        match i {
            0 => Some(self.x),
            1 => Some(self.y),
            2 => Some(self.z),
            _ => None,
        }
    }

    /// 转为数组
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [Scalar; 3] {
        [self.x, self.y, self.z]
    }
}

/// 点积
#[inline]
pub fn dot(a: &Vec3, b: &Vec3) -> Scalar {
    a.dot(b)
}

/// 欧几里得长度
#[inline]
pub fn mag(v: &Vec3) -> Scalar {
    v.mag()
}

/// 叉积
#[inline]
pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    a.cross(b)
}

// =============================================================================
// 下标访问
// =============================================================================

impl Index<usize> for Vec3 {
    type Output = Scalar;

    #[inline]
    fn index(&self, i: usize) -> &Scalar {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index {} out of range 0..3", i),
        }
    }
}

impl IndexMut<usize> for Vec3 {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut Scalar {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vec3 index {} out of range 0..3", i),
        }
    }
}

// =============================================================================
// 运算符
// =============================================================================

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<Scalar> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, s: Scalar) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Vec3> for Scalar {
    type Output = Vec3;
    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl Mul<Label> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, s: Label) -> Self {
        self * Scalar::from(s)
    }
}

impl Mul<Vec3> for Label {
    type Output = Vec3;
    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        v * Scalar::from(self)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl MulAssign<Scalar> for Vec3 {
    #[inline]
    fn mul_assign(&mut self, s: Scalar) {
        self.x *= s;
        self.y *= s;
        self.z *= s;
    }
}

impl Sum for Vec3 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.x, self.y, self.z)
    }
}

// =============================================================================
// 转换
// =============================================================================

impl From<Scalar> for Vec3 {
    #[inline]
    fn from(value: Scalar) -> Self {
        Self::splat(value)
    }
}

impl From<[Scalar; 3]> for Vec3 {
    #[inline]
    fn from(a: [Scalar; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

impl From<Vec3> for [Scalar; 3] {
    #[inline]
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl From<glam::DVec3> for Vec3 {
    #[inline]
    fn from(v: glam::DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for glam::DVec3 {
    #[inline]
    fn from(v: Vec3) -> Self {
        glam::DVec3::new(v.x, v.y, v.z)
    }
}
