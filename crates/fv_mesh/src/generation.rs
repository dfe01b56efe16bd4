// crates/fv_mesh/src/generation.rs

//! 网格生成模块
//!
//! 提供用于测试和验证的简单网格：
//!
//! - [`create_single_cell_mesh`]: 单位正方形单元，四个边界补丁
//! - [`create_1d_uniform_mesh`]: [0, 1] 上的一维均匀网格
//! - [`UniformMesh1D`]: 任意区间上的一维均匀网格生成器
//!
//! # 使用示例
//!
//! ```rust
//! use fv_core::Executor;
//! use fv_mesh::generation::create_1d_uniform_mesh;
//!
//! let mesh = create_1d_uniform_mesh(&Executor::host(), 10).unwrap();
//! assert_eq!(mesh.n_faces(), 11);
//! assert_eq!(mesh.n_internal_faces(), 9);
//! ```

use fv_core::ops;
use fv_core::{Executor, Label, LabelVector, ScalarVector, Vec3, Vector, VectorVector};
use log::debug;

use crate::boundary::{BoundaryGeometry, BoundaryMesh, BoundaryPatch};
use crate::error::{MeshError, MeshResult};
use crate::unstructured::{MeshParts, UnstructuredMesh};

/// 单单元网格
///
/// 三维空间中的二维单位正方形，单元中心 (0.5, 0.5, 0)。
/// 面依次为 left、top、right、bottom，各自构成一个边界补丁，
/// 没有内部面。
pub fn create_single_cell_mesh(exec: &Executor) -> MeshResult<UnstructuredMesh> {
    let face_areas = vec![
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
    ];
    let face_centres = vec![
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::new(0.5, 1.0, 0.0),
        Vec3::new(1.0, 0.5, 0.0),
        Vec3::new(0.5, 0.0, 0.0),
    ];
    let centre = Vec3::new(0.5, 0.5, 0.0);

    let boundary_mesh = BoundaryMesh::derive(
        exec,
        &BoundaryGeometry {
            face_cells: vec![0; 4],
            face_centres: face_centres.clone(),
            face_areas: face_areas.clone(),
            cell_centres: vec![centre; 4],
            patches: ["left", "top", "right", "bottom"]
                .iter()
                .map(|name| BoundaryPatch::new(*name, 1))
                .collect(),
        },
    )?;

    let parts = MeshParts {
        points: Vector::try_from_vec(
            exec,
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        )?,
        cell_volumes: ScalarVector::try_filled(exec, 1, 1.0)?,
        cell_centres: VectorVector::try_from_vec(exec, vec![centre])?,
        face_areas: VectorVector::try_from_vec(exec, face_areas)?,
        face_centres: VectorVector::try_from_vec(exec, face_centres)?,
        mag_face_areas: ScalarVector::try_filled(exec, 4, 1.0)?,
        face_owner: LabelVector::try_filled(exec, 4, 0)?,
        face_neighbour: LabelVector::try_with_size(exec, 0)?,
        n_cells: 1,
        n_internal_faces: 0,
        n_boundary_faces: 4,
        n_boundaries: 4,
        n_faces: 4,
    };

    UnstructuredMesh::new(exec, parts, boundary_mesh)
}

/// [0, 1] 上的一维均匀网格，见 [`UniformMesh1D`]
pub fn create_1d_uniform_mesh(exec: &Executor, n_cells: usize) -> MeshResult<UnstructuredMesh> {
    UniformMesh1D::new(n_cells).build(exec)
}

/// 一维均匀网格生成器
///
/// 沿 x 轴把 `[x0, x1]` 均分为 `n_cells` 个单元，间距 `h`：
///
/// - 内部面 `i`（`0..n_cells - 1`）位于 `x0 + (i + 1) h`，owner `i`，neighbour `i + 1`
/// - 面 `n_cells - 1` 为左边界（x0，法向 -x，owner 0）
/// - 面 `n_cells` 为右边界（x1，法向 +x，owner `n_cells - 1`）
///
/// 节点与面中心重合，补丁为 "left" 与 "right"。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformMesh1D {
    /// 单元数
    n_cells: usize,
    /// 左端点
    x0: f64,
    /// 右端点
    x1: f64,
}

impl UniformMesh1D {
    /// 创建 [0, 1] 上的生成器
    pub fn new(n_cells: usize) -> Self {
        Self {
            n_cells,
            x0: 0.0,
            x1: 1.0,
        }
    }

    /// 设置区间
    pub fn with_domain(mut self, x0: f64, x1: f64) -> Self {
        self.x0 = x0;
        self.x1 = x1;
        self
    }

    /// 网格间距
    pub fn spacing(&self) -> f64 {
        (self.x1 - self.x0) / self.n_cells as f64
    }

    /// 生成网格
    pub fn build(&self, exec: &Executor) -> MeshResult<UnstructuredMesh> {
        let n = self.n_cells;
        if n == 0 {
            return Err(MeshError::degenerate("create_1d_uniform_mesh", n));
        }
        if !(self.x1 > self.x0) {
            return Err(MeshError::invalid_topology(
                "create_1d_uniform_mesh",
                format!("empty domain [{}, {}]", self.x0, self.x1),
            ));
        }
        let h = self.spacing();
        let x0 = self.x0;
        let left = Vec3::new(self.x0, 0.0, 0.0);
        let right = Vec3::new(self.x1, 0.0, 0.0);

        // 节点：内部面位置，随后是左右边界
        let mut points = VectorVector::try_with_size(exec, n + 1)?;
        ops::map(&mut points, |i| {
            if i + 1 < n {
                Vec3::new(x0 + (i + 1) as f64 * h, 0.0, 0.0)
            } else if i + 1 == n {
                left
            } else {
                right
            }
        })?;

        let mut cell_centres = VectorVector::try_with_size(exec, n)?;
        ops::map(&mut cell_centres, |i| {
            Vec3::new(x0 + 0.5 * h + h * i as f64, 0.0, 0.0)
        })?;

        let mut face_areas = VectorVector::try_filled(exec, n + 1, Vec3::UNIT_X)?;
        face_areas.set(n - 1, Vec3::new(-1.0, 0.0, 0.0))?;

        let mut face_owner = LabelVector::try_with_size(exec, n + 1)?;
        ops::map(&mut face_owner, |i| {
            if i + 1 < n {
                i as Label
            } else if i + 1 == n {
                0
            } else {
                (n - 1) as Label
            }
        })?;

        let mut face_neighbour = LabelVector::try_with_size(exec, n - 1)?;
        ops::map(&mut face_neighbour, |i| (i + 1) as Label)?;

        let first_centre = cell_centres.get(0)?;
        let last_centre = cell_centres.get(n - 1)?;
        let boundary_mesh = BoundaryMesh::derive(
            exec,
            &BoundaryGeometry {
                face_cells: vec![0, (n - 1) as Label],
                face_centres: vec![left, right],
                face_areas: vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::UNIT_X],
                cell_centres: vec![first_centre, last_centre],
                patches: vec![BoundaryPatch::new("left", 1), BoundaryPatch::new("right", 1)],
            },
        )?;

        let parts = MeshParts {
            face_centres: points.try_clone()?,
            points,
            cell_volumes: ScalarVector::try_filled(exec, n, h)?,
            cell_centres,
            face_areas,
            mag_face_areas: ScalarVector::try_filled(exec, n + 1, 1.0)?,
            face_owner,
            face_neighbour,
            n_cells: n,
            n_internal_faces: n - 1,
            n_boundary_faces: 2,
            n_boundaries: 2,
            n_faces: n + 1,
        };

        debug!("1D uniform mesh: {} cells, spacing {}", n, h);
        UnstructuredMesh::new(exec, parts, boundary_mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_cells_rejected() {
        let err = create_1d_uniform_mesh(&Executor::host(), 0).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateCellCount { n_cells: 0, .. }));
    }

    #[test]
    fn test_empty_domain_rejected() {
        let err = UniformMesh1D::new(4)
            .with_domain(1.0, 1.0)
            .build(&Executor::host())
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidTopology { .. }));
    }

    #[test]
    fn test_single_cell_1d_mesh() {
        let mesh = create_1d_uniform_mesh(&Executor::host(), 1).unwrap();
        assert_eq!(mesh.n_internal_faces(), 0);
        assert_eq!(mesh.n_faces(), 2);
        assert_eq!(mesh.face_owner().to_vec().unwrap(), vec![0, 0]);
        assert_eq!(
            mesh.face_areas().to_vec().unwrap(),
            vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::UNIT_X]
        );
    }

    #[test]
    fn test_custom_domain() {
        let mesh = UniformMesh1D::new(4)
            .with_domain(-1.0, 1.0)
            .build(&Executor::host())
            .unwrap();
        assert_eq!(mesh.cell_volumes().to_vec().unwrap(), vec![0.5; 4]);
        assert_eq!(mesh.cell_centres().get(0).unwrap(), Vec3::new(-0.75, 0.0, 0.0));
        assert_eq!(
            mesh.boundary_mesh().delta_coeffs().to_vec().unwrap(),
            vec![4.0, 4.0]
        );
    }
}
