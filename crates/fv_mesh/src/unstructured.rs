// crates/fv_mesh/src/unstructured.rs

//! 非结构网格
//!
//! SoA 布局的只读网格。面按"内部面在前、边界面在后"排列：
//! 面 `0..n_internal_faces` 同时有 owner 与 neighbour，
//! 面 `n_internal_faces..n_faces` 只有 owner，其几何另由
//! [`BoundaryMesh`] 按补丁组织。
//!
//! 构造时校验全部不变式，此后只提供访问器。

use std::fmt;
use std::ops::Range;

use fv_core::{Executor, Label, LabelVector, ScalarVector, VectorVector};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::boundary::{check_vector, BoundaryMesh};
use crate::error::{MeshError, MeshResult};

/// 构造网格所需的数组与数量
#[derive(Debug, Clone)]
pub struct MeshParts {
    /// 节点坐标
    pub points: VectorVector,
    /// 单元体积
    pub cell_volumes: ScalarVector,
    /// 单元中心
    pub cell_centres: VectorVector,
    /// 面积向量（从 owner 指向外侧）
    pub face_areas: VectorVector,
    /// 面中心
    pub face_centres: VectorVector,
    /// 面积
    pub mag_face_areas: ScalarVector,
    /// 面的 owner 单元（全部面）
    pub face_owner: LabelVector,
    /// 面的 neighbour 单元（仅内部面）
    pub face_neighbour: LabelVector,
    /// 单元数
    pub n_cells: usize,
    /// 内部面数
    pub n_internal_faces: usize,
    /// 边界面数
    pub n_boundary_faces: usize,
    /// 边界补丁数
    pub n_boundaries: usize,
    /// 总面数
    pub n_faces: usize,
}

/// 非结构网格
#[derive(Debug, Clone)]
pub struct UnstructuredMesh {
    exec: Executor,
    points: VectorVector,
    cell_volumes: ScalarVector,
    cell_centres: VectorVector,
    face_areas: VectorVector,
    face_centres: VectorVector,
    mag_face_areas: ScalarVector,
    face_owner: LabelVector,
    face_neighbour: LabelVector,
    n_cells: usize,
    n_internal_faces: usize,
    n_boundary_faces: usize,
    n_boundaries: usize,
    n_faces: usize,
    boundary_mesh: BoundaryMesh,
}

impl UnstructuredMesh {
    /// 构造并校验网格
    pub fn new(exec: &Executor, parts: MeshParts, boundary_mesh: BoundaryMesh) -> MeshResult<Self> {
        let mesh = Self {
            exec: exec.clone(),
            points: parts.points,
            cell_volumes: parts.cell_volumes,
            cell_centres: parts.cell_centres,
            face_areas: parts.face_areas,
            face_centres: parts.face_centres,
            mag_face_areas: parts.mag_face_areas,
            face_owner: parts.face_owner,
            face_neighbour: parts.face_neighbour,
            n_cells: parts.n_cells,
            n_internal_faces: parts.n_internal_faces,
            n_boundary_faces: parts.n_boundary_faces,
            n_boundaries: parts.n_boundaries,
            n_faces: parts.n_faces,
            boundary_mesh,
        };
        mesh.validate()?;
        debug!(
            "UnstructuredMesh on {}: {} cells, {} faces ({} internal, {} boundary), {} patches",
            mesh.exec,
            mesh.n_cells,
            mesh.n_faces,
            mesh.n_internal_faces,
            mesh.n_boundary_faces,
            mesh.n_boundaries
        );
        Ok(mesh)
    }

    /// 校验网格不变式
    pub fn validate(&self) -> MeshResult<()> {
        if self.n_cells == 0 {
            return Err(MeshError::degenerate("UnstructuredMesh", 0));
        }
        if self.n_faces != self.n_internal_faces + self.n_boundary_faces {
            return Err(MeshError::invalid_topology(
                "UnstructuredMesh",
                format!(
                    "n_faces {} != n_internal_faces {} + n_boundary_faces {}",
                    self.n_faces, self.n_internal_faces, self.n_boundary_faces
                ),
            ));
        }

        // 数组长度与执行器
        let exec = &self.exec;
        check_vector("points", &self.points, exec, self.points.size())?;
        check_vector("cell_volumes", &self.cell_volumes, exec, self.n_cells)?;
        check_vector("cell_centres", &self.cell_centres, exec, self.n_cells)?;
        check_vector("face_areas", &self.face_areas, exec, self.n_faces)?;
        check_vector("face_centres", &self.face_centres, exec, self.n_faces)?;
        check_vector("mag_face_areas", &self.mag_face_areas, exec, self.n_faces)?;
        check_vector("face_owner", &self.face_owner, exec, self.n_faces)?;
        check_vector("face_neighbour", &self.face_neighbour, exec, self.n_internal_faces)?;

        // 边界网格
        let bm = &self.boundary_mesh;
        if bm.exec() != exec {
            return Err(MeshError::ExecutorMismatch {
                name: "boundary_mesh",
                expected: exec.name(),
                actual: bm.exec().name(),
            });
        }
        if bm.n_faces() != self.n_boundary_faces {
            return Err(MeshError::count_mismatch(
                "boundary_mesh.face_cells",
                self.n_boundary_faces,
                bm.n_faces(),
            ));
        }
        if bm.n_boundaries() != self.n_boundaries {
            return Err(MeshError::count_mismatch(
                "boundary_mesh.patch_names",
                self.n_boundaries,
                bm.n_boundaries(),
            ));
        }

        // owner / neighbour 索引范围
        let owner = self.face_owner.to_vec()?;
        check_cells("face_owner", &owner, self.n_cells)?;
        let neighbour = self.face_neighbour.to_vec()?;
        check_cells("face_neighbour", &neighbour, self.n_cells)?;

        // 边界面相邻单元即其 owner
        let face_cells = bm.face_cells().to_vec()?;
        let boundary_owner = &owner[self.n_internal_faces..];
        if let Some(j) = (0..face_cells.len()).find(|&j| face_cells[j] != boundary_owner[j]) {
            return Err(MeshError::invalid_topology(
                "UnstructuredMesh",
                format!(
                    "boundary face {} adjacent cell {} differs from owner {}",
                    j, face_cells[j], boundary_owner[j]
                ),
            ));
        }

        Ok(())
    }

    // =========================================================================
    // 访问器
    // =========================================================================

    /// 绑定的执行器
    pub fn exec(&self) -> &Executor {
        &self.exec
    }

    /// 节点坐标
    pub fn points(&self) -> &VectorVector {
        &self.points
    }

    /// 单元体积
    pub fn cell_volumes(&self) -> &ScalarVector {
        &self.cell_volumes
    }

    /// 单元中心
    pub fn cell_centres(&self) -> &VectorVector {
        &self.cell_centres
    }

    /// 面积向量
    pub fn face_areas(&self) -> &VectorVector {
        &self.face_areas
    }

    /// 面中心
    pub fn face_centres(&self) -> &VectorVector {
        &self.face_centres
    }

    /// 面积
    pub fn mag_face_areas(&self) -> &ScalarVector {
        &self.mag_face_areas
    }

    /// 面的 owner 单元
    pub fn face_owner(&self) -> &LabelVector {
        &self.face_owner
    }

    /// 内部面的 neighbour 单元
    pub fn face_neighbour(&self) -> &LabelVector {
        &self.face_neighbour
    }

    /// 单元数
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 内部面数
    pub fn n_internal_faces(&self) -> usize {
        self.n_internal_faces
    }

    /// 边界面数
    pub fn n_boundary_faces(&self) -> usize {
        self.n_boundary_faces
    }

    /// 边界补丁数
    pub fn n_boundaries(&self) -> usize {
        self.n_boundaries
    }

    /// 总面数
    pub fn n_faces(&self) -> usize {
        self.n_faces
    }

    /// 边界网格
    pub fn boundary_mesh(&self) -> &BoundaryMesh {
        &self.boundary_mesh
    }

    /// 是否为内部面
    #[inline]
    pub fn is_internal_face(&self, face: usize) -> bool {
        face < self.n_internal_faces
    }

    // =========================================================================
    // 范围迭代
    // =========================================================================

    /// 内部面索引范围
    #[inline]
    pub fn internal_faces(&self) -> Range<usize> {
        0..self.n_internal_faces
    }

    /// 边界面索引范围
    #[inline]
    pub fn boundary_faces(&self) -> Range<usize> {
        self.n_internal_faces..self.n_faces
    }

    /// 单元索引范围
    #[inline]
    pub fn cells(&self) -> Range<usize> {
        0..self.n_cells
    }

    // =========================================================================
    // 统计信息
    // =========================================================================

    /// 计算统计信息
    ///
    /// 没有面的网格，面积的最小值与最大值均为 0。
    pub fn statistics(&self) -> MeshResult<MeshStatistics> {
        let volumes = self.cell_volumes.to_vec()?;
        let areas = self.mag_face_areas.to_vec()?;

        let (min_volume, max_volume) = min_max(&volumes);
        let total_volume: f64 = volumes.iter().sum();
        let (min_area, max_area) = min_max(&areas);

        Ok(MeshStatistics {
            n_cells: self.n_cells,
            n_faces: self.n_faces,
            n_internal_faces: self.n_internal_faces,
            n_boundary_faces: self.n_boundary_faces,
            n_boundaries: self.n_boundaries,
            n_points: self.points.size(),
            total_volume,
            min_cell_volume: min_volume,
            max_cell_volume: max_volume,
            min_face_area: min_area,
            max_face_area: max_area,
        })
    }
}

/// 最小值与最大值，空序列为 (0, 0)
fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

fn check_cells(array: &'static str, cells: &[Label], n_cells: usize) -> MeshResult<()> {
    match cells
        .iter()
        .enumerate()
        .find(|&(_, &c)| c < 0 || c as usize >= n_cells)
    {
        Some((face, &cell)) => Err(MeshError::InvalidCellIndex {
            array,
            face,
            cell,
            n_cells,
        }),
        None => Ok(()),
    }
}

/// 网格统计信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStatistics {
    /// 单元数
    pub n_cells: usize,
    /// 总面数
    pub n_faces: usize,
    /// 内部面数
    pub n_internal_faces: usize,
    /// 边界面数
    pub n_boundary_faces: usize,
    /// 补丁数
    pub n_boundaries: usize,
    /// 节点数
    pub n_points: usize,
    /// 总体积
    pub total_volume: f64,
    /// 最小单元体积
    pub min_cell_volume: f64,
    /// 最大单元体积
    pub max_cell_volume: f64,
    /// 最小面积，无面时为 0
    pub min_face_area: f64,
    /// 最大面积，无面时为 0
    pub max_face_area: f64,
}

impl fmt::Display for MeshStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== 网格统计 ===")?;
        writeln!(f, "单元数: {}", self.n_cells)?;
        writeln!(
            f,
            "面数: {} (内部: {}, 边界: {}, 补丁: {})",
            self.n_faces, self.n_internal_faces, self.n_boundary_faces, self.n_boundaries
        )?;
        writeln!(f, "节点数: {}", self.n_points)?;
        writeln!(f, "总体积: {:.4}", self.total_volume)?;
        writeln!(
            f,
            "单元体积: [{:.4}, {:.4}]",
            self.min_cell_volume, self.max_cell_volume
        )?;
        write!(
            f,
            "面积: [{:.4}, {:.4}]",
            self.min_face_area, self.max_face_area
        )
    }
}
