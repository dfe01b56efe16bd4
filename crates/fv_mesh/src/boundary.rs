// crates/fv_mesh/src/boundary.rs

//! 边界网格
//!
//! 按边界面存储的几何数组，长度均为边界面数，面按补丁 (patch)
//! 连续排列：
//!
//! | 数组 | 含义 |
//! |------|------|
//! | `face_cells`   | 边界面相邻单元 |
//! | `cf`           | 面中心 |
//! | `cn`           | 相邻单元中心 |
//! | `sf`           | 面积向量 |
//! | `mag_sf`       | 面积 `|sf|` |
//! | `nf`           | 单位法向 `sf / |sf|` |
//! | `delta`        | 单元中心指向面中心 `cf - cn` |
//! | `weights`      | 边界插值权重（边界面为 1） |
//! | `delta_coeffs` | `1 / |delta|` |
//!
//! `offset` 是补丁偏移表（主机端），长度为补丁数 + 1，
//! 第 `i` 个补丁占据 `offset[i]..offset[i + 1]`。

use std::ops::Range;

use fv_core::{Element, Executor, Label, LabelVector, ScalarVector, Vec3, Vector, VectorVector};
use fv_runtime::RuntimeError;

use crate::error::{MeshError, MeshResult};

/// 边界补丁描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPatch {
    /// 补丁名称
    pub name: String,
    /// 补丁包含的面数
    pub n_faces: usize,
}

impl BoundaryPatch {
    /// 创建补丁描述
    pub fn new(name: impl Into<String>, n_faces: usize) -> Self {
        Self {
            name: name.into(),
            n_faces,
        }
    }
}

/// 推导边界网格所需的主机端几何
#[derive(Debug, Clone, Default)]
pub struct BoundaryGeometry {
    /// 边界面相邻单元
    pub face_cells: Vec<Label>,
    /// 面中心
    pub face_centres: Vec<Vec3>,
    /// 面积向量
    pub face_areas: Vec<Vec3>,
    /// 相邻单元中心
    pub cell_centres: Vec<Vec3>,
    /// 补丁（按面顺序）
    pub patches: Vec<BoundaryPatch>,
}

/// 直接构造边界网格的全部数组
#[derive(Debug, Clone)]
pub struct BoundaryParts {
    /// 边界面相邻单元
    pub face_cells: LabelVector,
    /// 面中心
    pub cf: VectorVector,
    /// 相邻单元中心
    pub cn: VectorVector,
    /// 面积向量
    pub sf: VectorVector,
    /// 面积
    pub mag_sf: ScalarVector,
    /// 单位法向
    pub nf: VectorVector,
    /// 单元中心到面中心
    pub delta: VectorVector,
    /// 插值权重
    pub weights: ScalarVector,
    /// `1 / |delta|`
    pub delta_coeffs: ScalarVector,
    /// 补丁偏移表
    pub offset: Vec<usize>,
    /// 补丁名称
    pub patch_names: Vec<String>,
}

/// 边界网格
#[derive(Debug, Clone)]
pub struct BoundaryMesh {
    exec: Executor,
    face_cells: LabelVector,
    cf: VectorVector,
    cn: VectorVector,
    sf: VectorVector,
    mag_sf: ScalarVector,
    nf: VectorVector,
    delta: VectorVector,
    weights: ScalarVector,
    delta_coeffs: ScalarVector,
    offset: Vec<usize>,
    patch_names: Vec<String>,
}

impl BoundaryMesh {
    /// 由完整数组构造，校验长度、执行器与偏移表
    pub fn new(exec: &Executor, parts: BoundaryParts) -> MeshResult<Self> {
        let n = parts.face_cells.size();
        check_offset(&parts.offset, n)?;
        if parts.patch_names.len() + 1 != parts.offset.len() {
            return Err(MeshError::count_mismatch(
                "patch_names",
                parts.offset.len() - 1,
                parts.patch_names.len(),
            ));
        }

        check_vector("face_cells", &parts.face_cells, exec, n)?;
        check_vector("cf", &parts.cf, exec, n)?;
        check_vector("cn", &parts.cn, exec, n)?;
        check_vector("sf", &parts.sf, exec, n)?;
        check_vector("mag_sf", &parts.mag_sf, exec, n)?;
        check_vector("nf", &parts.nf, exec, n)?;
        check_vector("delta", &parts.delta, exec, n)?;
        check_vector("weights", &parts.weights, exec, n)?;
        check_vector("delta_coeffs", &parts.delta_coeffs, exec, n)?;

        Ok(Self {
            exec: exec.clone(),
            face_cells: parts.face_cells,
            cf: parts.cf,
            cn: parts.cn,
            sf: parts.sf,
            mag_sf: parts.mag_sf,
            nf: parts.nf,
            delta: parts.delta,
            weights: parts.weights,
            delta_coeffs: parts.delta_coeffs,
            offset: parts.offset,
            patch_names: parts.patch_names,
        })
    }

    /// 由面中心、面积向量与相邻单元中心推导全部数组
    ///
    /// `mag_sf = |sf|`，`nf = sf / |sf|`，`delta = cf - cn`，
    /// `weights = 1`，`delta_coeffs = 1 / |delta|`。
    pub fn derive(exec: &Executor, geometry: &BoundaryGeometry) -> MeshResult<Self> {
        let n = geometry.face_cells.len();
        if geometry.face_centres.len() != n {
            return Err(MeshError::count_mismatch("face_centres", n, geometry.face_centres.len()));
        }
        if geometry.face_areas.len() != n {
            return Err(MeshError::count_mismatch("face_areas", n, geometry.face_areas.len()));
        }
        if geometry.cell_centres.len() != n {
            return Err(MeshError::count_mismatch("cell_centres", n, geometry.cell_centres.len()));
        }

        let mut offset = Vec::with_capacity(geometry.patches.len() + 1);
        offset.push(0);
        for patch in &geometry.patches {
            let last = offset[offset.len() - 1];
            offset.push(last + patch.n_faces);
        }

        let mut mag_sf = Vec::with_capacity(n);
        let mut nf = Vec::with_capacity(n);
        let mut delta = Vec::with_capacity(n);
        let mut delta_coeffs = Vec::with_capacity(n);
        for face in 0..n {
            let sf = geometry.face_areas[face];
            let mag = sf.mag();
            if mag <= 0.0 {
                return Err(MeshError::invalid_topology(
                    "BoundaryMesh::derive",
                    format!("boundary face {} has zero area", face),
                ));
            }
            let d = geometry.face_centres[face] - geometry.cell_centres[face];
            let dist = d.mag();
            if dist <= 0.0 {
                return Err(MeshError::invalid_topology(
                    "BoundaryMesh::derive",
                    format!("boundary face {} centre coincides with its cell centre", face),
                ));
            }
            mag_sf.push(mag);
            nf.push(sf * (1.0 / mag));
            delta.push(d);
            delta_coeffs.push(1.0 / dist);
        }

        Self::new(
            exec,
            BoundaryParts {
                face_cells: Vector::try_from_slice(exec, &geometry.face_cells)?,
                cf: Vector::try_from_slice(exec, &geometry.face_centres)?,
                cn: Vector::try_from_slice(exec, &geometry.cell_centres)?,
                sf: Vector::try_from_slice(exec, &geometry.face_areas)?,
                mag_sf: Vector::try_from_vec(exec, mag_sf)?,
                nf: Vector::try_from_vec(exec, nf)?,
                delta: Vector::try_from_vec(exec, delta)?,
                weights: Vector::try_filled(exec, n, 1.0)?,
                delta_coeffs: Vector::try_from_vec(exec, delta_coeffs)?,
                offset,
                patch_names: geometry.patches.iter().map(|p| p.name.clone()).collect(),
            },
        )
    }

    /// 绑定的执行器
    pub fn exec(&self) -> &Executor {
        &self.exec
    }

    /// 边界面数
    pub fn n_faces(&self) -> usize {
        self.face_cells.size()
    }

    /// 补丁数
    pub fn n_boundaries(&self) -> usize {
        self.patch_names.len()
    }

    /// 边界面相邻单元
    pub fn face_cells(&self) -> &LabelVector {
        &self.face_cells
    }

    /// 面中心
    pub fn cf(&self) -> &VectorVector {
        &self.cf
    }

    /// 相邻单元中心
    pub fn cn(&self) -> &VectorVector {
        &self.cn
    }

    /// 面积向量
    pub fn sf(&self) -> &VectorVector {
        &self.sf
    }

    /// 面积
    pub fn mag_sf(&self) -> &ScalarVector {
        &self.mag_sf
    }

    /// 单位法向
    pub fn nf(&self) -> &VectorVector {
        &self.nf
    }

    /// 单元中心到面中心
    pub fn delta(&self) -> &VectorVector {
        &self.delta
    }

    /// 插值权重
    pub fn weights(&self) -> &ScalarVector {
        &self.weights
    }

    /// `1 / |delta|`
    pub fn delta_coeffs(&self) -> &ScalarVector {
        &self.delta_coeffs
    }

    /// 补丁偏移表
    pub fn offset(&self) -> &[usize] {
        &self.offset
    }

    /// 补丁名称
    pub fn patch_names(&self) -> &[String] {
        &self.patch_names
    }

    /// 按名称查找补丁
    pub fn patch_index(&self, name: &str) -> Option<usize> {
        self.patch_names.iter().position(|n| n == name)
    }

    /// 第 `patch` 个补丁的面区间
    pub fn patch_range(&self, patch: usize) -> MeshResult<Range<usize>> {
        if patch >= self.n_boundaries() {
            return Err(RuntimeError::index_out_of_bounds("patch", patch, self.n_boundaries()).into());
        }
        Ok(self.offset[patch]..self.offset[patch + 1])
    }

    /// 主机驻留数组中第 `patch` 个补丁的子切片
    pub fn patch_view<'a, T: Element>(
        &self,
        values: &'a Vector<T>,
        patch: usize,
    ) -> MeshResult<&'a [T]> {
        let range = self.patch_range(patch)?;
        if values.size() != self.n_faces() {
            return Err(MeshError::count_mismatch("patch_view", self.n_faces(), values.size()));
        }
        Ok(&values.host_slice()?[range])
    }

    /// 复制到主机（串行执行器）
    pub fn copy_to_host(&self) -> MeshResult<BoundaryMesh> {
        Ok(Self {
            exec: Executor::host(),
            face_cells: self.face_cells.copy_to_host()?,
            cf: self.cf.copy_to_host()?,
            cn: self.cn.copy_to_host()?,
            sf: self.sf.copy_to_host()?,
            mag_sf: self.mag_sf.copy_to_host()?,
            nf: self.nf.copy_to_host()?,
            delta: self.delta.copy_to_host()?,
            weights: self.weights.copy_to_host()?,
            delta_coeffs: self.delta_coeffs.copy_to_host()?,
            offset: self.offset.clone(),
            patch_names: self.patch_names.clone(),
        })
    }
}

/// 偏移表以 0 开始、单调不减、以 `n_faces` 结束
fn check_offset(offset: &[usize], n_faces: usize) -> MeshResult<()> {
    match (offset.first(), offset.last()) {
        (Some(&0), Some(&last)) if last == n_faces => {}
        _ => {
            return Err(MeshError::invalid_topology(
                "BoundaryMesh::new",
                format!("offset table must run from 0 to {}, got {:?}", n_faces, offset),
            ))
        }
    }
    if offset.windows(2).any(|w| w[0] > w[1]) {
        return Err(MeshError::invalid_topology(
            "BoundaryMesh::new",
            format!("offset table is not monotone: {:?}", offset),
        ));
    }
    Ok(())
}

pub(crate) fn check_vector<T: Element>(
    name: &'static str,
    values: &Vector<T>,
    exec: &Executor,
    expected: usize,
) -> MeshResult<()> {
    if values.exec() != exec {
        return Err(MeshError::ExecutorMismatch {
            name,
            expected: exec.name(),
            actual: values.exec().name(),
        });
    }
    if values.size() != expected {
        return Err(MeshError::count_mismatch(name, expected, values.size()));
    }
    Ok(())
}
