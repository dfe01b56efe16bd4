// crates/fv_mesh/src/lib.rs

//! fv 网格模块 (Layer 3)
//!
//! 提供执行器绑定的非结构网格数据结构。
//!
//! # 核心类型
//!
//! - [`UnstructuredMesh`]: 单元、内部面、边界面的 SoA 网格
//! - [`BoundaryMesh`]: 按补丁分组的边界面几何
//!
//! # 模块结构
//!
//! - [`unstructured`]: 非结构网格与统计信息
//! - [`boundary`]: 边界网格及其推导
//! - [`generation`]: 单单元网格与一维均匀网格工厂
//! - [`error`]: 网格错误类型
//!
//! # 示例
//!
//! ```rust
//! use fv_core::Executor;
//! use fv_mesh::create_single_cell_mesh;
//!
//! let mesh = create_single_cell_mesh(&Executor::host()).unwrap();
//! assert_eq!(mesh.n_cells(), 1);
//! assert_eq!(mesh.boundary_mesh().patch_names(), &["left", "top", "right", "bottom"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod error;
pub mod generation;
pub mod unstructured;

/// 层级标识
pub const LAYER: u8 = 3;

pub use boundary::{BoundaryGeometry, BoundaryMesh, BoundaryParts, BoundaryPatch};
pub use error::{MeshError, MeshResult};
pub use generation::{create_1d_uniform_mesh, create_single_cell_mesh, UniformMesh1D};
pub use unstructured::{MeshParts, MeshStatistics, UnstructuredMesh};
