// crates/fv_mesh/tests/factories.rs

//! 网格工厂测试
//!
//! 单单元网格与一维均匀网格在各执行器上的拓扑与几何。

use std::sync::Once;

use fv_core::{Executor, Vec3};
use fv_mesh::{create_1d_uniform_mesh, create_single_cell_mesh, MeshError};
use fv_runtime::{initialize, CpuExecutor, GpuExecutor, RuntimeConfig};

fn executors() -> Vec<Executor> {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        fv_runtime::logging::init_logging(Some("warn"));
        initialize(&RuntimeConfig::with_threads(2).enable_gpu()).unwrap();
    });

    let mut execs = vec![
        Executor::host(),
        Executor::from(CpuExecutor::new().unwrap()),
    ];
    if let Ok(gpu) = GpuExecutor::new() {
        execs.push(Executor::from(gpu));
    }
    execs
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
}

/// 单单元网格的数量与几何
#[test]
fn test_single_cell_mesh() {
    for exec in executors() {
        let mesh = create_single_cell_mesh(&exec).unwrap();
        assert_eq!(mesh.exec(), &exec);
        assert_eq!(mesh.n_cells(), 1);
        assert_eq!(mesh.n_internal_faces(), 0);
        assert_eq!(mesh.n_boundary_faces(), 4);
        assert_eq!(mesh.n_boundaries(), 4);
        assert_eq!(mesh.n_faces(), 4);

        assert_eq!(mesh.cell_volumes().to_vec().unwrap(), vec![1.0]);
        assert_eq!(
            mesh.cell_centres().to_vec().unwrap(),
            vec![Vec3::new(0.5, 0.5, 0.0)]
        );
        assert_eq!(
            mesh.face_areas().to_vec().unwrap(),
            vec![
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
            ]
        );
        assert_eq!(mesh.mag_face_areas().to_vec().unwrap(), vec![1.0; 4]);
        assert_eq!(mesh.face_owner().to_vec().unwrap(), vec![0; 4]);
        assert!(mesh.face_neighbour().empty());
        assert_eq!(mesh.points().size(), 4);

        let bm = mesh.boundary_mesh();
        assert_eq!(bm.offset(), &[0, 1, 2, 3, 4]);
        assert_eq!(bm.patch_names(), &["left", "top", "right", "bottom"]);
        assert_eq!(bm.face_cells().to_vec().unwrap(), vec![0; 4]);
        assert_eq!(bm.sf().to_vec().unwrap(), mesh.face_areas().to_vec().unwrap());
        assert_eq!(bm.mag_sf().to_vec().unwrap(), vec![1.0; 4]);
        assert_eq!(bm.cf().to_vec().unwrap(), mesh.face_centres().to_vec().unwrap());
        assert_eq!(bm.nf().to_vec().unwrap(), mesh.face_areas().to_vec().unwrap());
        assert_eq!(bm.cn().to_vec().unwrap(), vec![Vec3::new(0.5, 0.5, 0.0); 4]);
        assert_eq!(
            bm.delta().to_vec().unwrap(),
            vec![
                Vec3::new(-0.5, 0.0, 0.0),
                Vec3::new(0.0, 0.5, 0.0),
                Vec3::new(0.5, 0.0, 0.0),
                Vec3::new(0.0, -0.5, 0.0),
            ]
        );
        assert_eq!(bm.weights().to_vec().unwrap(), vec![1.0; 4]);
        assert_eq!(bm.delta_coeffs().to_vec().unwrap(), vec![2.0; 4]);
    }
}

/// 一维均匀网格的拓扑
#[test]
fn test_1d_uniform_topology() {
    let n = 10;
    for exec in executors() {
        let mesh = create_1d_uniform_mesh(&exec, n).unwrap();
        assert_eq!(mesh.n_cells(), n);
        assert_eq!(mesh.n_internal_faces(), n - 1);
        assert_eq!(mesh.n_boundary_faces(), 2);
        assert_eq!(mesh.n_boundaries(), 2);
        assert_eq!(mesh.n_faces(), n + 1);

        let owner = mesh.face_owner().to_vec().unwrap();
        let neighbour = mesh.face_neighbour().to_vec().unwrap();
        for f in mesh.internal_faces() {
            assert_eq!(owner[f], f as i32);
            assert_eq!(neighbour[f], f as i32 + 1);
        }
        assert_eq!(owner[n - 1], 0);
        assert_eq!(owner[n], n as i32 - 1);

        let bm = mesh.boundary_mesh();
        assert_eq!(bm.face_cells().to_vec().unwrap(), vec![0, n as i32 - 1]);
        assert_eq!(bm.offset(), &[0, 1, 2]);
        assert_eq!(bm.patch_names(), &["left", "right"]);
    }
}

/// 一维均匀网格的几何
#[test]
fn test_1d_uniform_geometry() {
    let n = 10;
    let h = 1.0 / n as f64;
    for exec in executors() {
        let mesh = create_1d_uniform_mesh(&exec, n).unwrap();

        for v in mesh.cell_volumes().to_vec().unwrap() {
            assert_close(v, h);
        }
        let centres = mesh.cell_centres().to_vec().unwrap();
        for (i, c) in centres.iter().enumerate() {
            assert_close(c.x, (i as f64 + 0.5) * h);
            assert_eq!((c.y, c.z), (0.0, 0.0));
        }

        let points = mesh.points().to_vec().unwrap();
        for (i, p) in points.iter().take(n - 1).enumerate() {
            assert_close(p.x, (i + 1) as f64 * h);
        }
        assert_eq!(points[n - 1], Vec3::ZERO);
        assert_eq!(points[n], Vec3::UNIT_X);
        assert_eq!(mesh.face_centres().to_vec().unwrap(), points);

        let areas = mesh.face_areas().to_vec().unwrap();
        for (f, a) in areas.iter().enumerate() {
            let expected = if f == n - 1 { -1.0 } else { 1.0 };
            assert_eq!(*a, Vec3::new(expected, 0.0, 0.0));
        }
        assert_eq!(mesh.mag_face_areas().to_vec().unwrap(), vec![1.0; n + 1]);

        let bm = mesh.boundary_mesh();
        assert_eq!(bm.cf().to_vec().unwrap(), vec![Vec3::ZERO, Vec3::UNIT_X]);
        assert_eq!(
            bm.sf().to_vec().unwrap(),
            vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::UNIT_X]
        );
        assert_eq!(bm.nf().to_vec().unwrap(), bm.sf().to_vec().unwrap());
        assert_eq!(bm.mag_sf().to_vec().unwrap(), vec![1.0, 1.0]);
        assert_eq!(bm.weights().to_vec().unwrap(), vec![1.0, 1.0]);

        let delta = bm.delta().to_vec().unwrap();
        assert_close(delta[0].x, -0.5 * h);
        assert_close(delta[1].x, 0.5 * h);
        for c in bm.delta_coeffs().to_vec().unwrap() {
            assert!((c - 2.0 * n as f64).abs() < 1e-9, "{}", c);
        }
    }
}

/// 零单元是错误
#[test]
fn test_1d_zero_cells() {
    for exec in executors() {
        let err = create_1d_uniform_mesh(&exec, 0).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateCellCount { .. }));
    }
}

/// 统计信息
#[test]
fn test_statistics() {
    let mesh = create_1d_uniform_mesh(&Executor::host(), 4).unwrap();
    let stats = mesh.statistics().unwrap();
    assert_eq!(stats.n_cells, 4);
    assert_eq!(stats.n_faces, 5);
    assert_eq!(stats.n_points, 5);
    assert_close(stats.total_volume, 1.0);
    assert_close(stats.min_cell_volume, 0.25);
    assert_close(stats.max_cell_volume, 0.25);
    assert!(stats.to_string().contains("单元数: 4"));
}

/// GPU 上超过设备缓冲区限制的网格返回错误
#[test]
fn test_1d_over_limit_on_gpu() {
    let Some(gpu) = executors().into_iter().find(fv_runtime::is_gpu) else {
        return;
    };
    let Executor::Gpu(inner) = &gpu else { return };
    let limit = inner.context().max_buffer_size();
    // 节点数组为 n + 1 个 Vec3，每个 24 字节
    let n = usize::try_from(limit / 24).unwrap_or(usize::MAX - 1);

    let err = create_1d_uniform_mesh(&gpu, n).unwrap_err();
    assert!(matches!(err, MeshError::Runtime(_)), "{}", err);
}
