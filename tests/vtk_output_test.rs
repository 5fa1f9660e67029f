//! Frame output of full runs and reading meshes back from frames.

use std::f64::consts::PI;
use std::fs;

use tempfile::tempdir;
use vr_fv::io::{frame_path, read_vtk_mesh, write_vtk_mesh};
use vr_fv::{
    Ausm2D, BoundaryManager, EulerState2D, IdealGas, LinearUpwind2D, Mesh2D, OutputConfig,
    OutputFields, Primitive2D, SimulationConfig, SimulationError, VrConfig, VrSimulation,
    VrTimeConfig,
};

#[test]
fn test_series_names_and_count() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();
    let out = dir.path().join("result");

    let mesh = Mesh2D::uniform_triangles(-1.0, 1.0, -0.05, 0.05, 10, 1).unwrap();
    let boundaries = BoundaryManager::periodic_box(&mesh).unwrap();
    let time = VrTimeConfig::new(0.2, 20).with_refresh_rate(5);
    let config = SimulationConfig::new(VrConfig::new(2), time)
        .with_output(OutputConfig::new(&out, "wave", OutputFields::scalar("U").unwrap()));
    let mut sim = VrSimulation::new(mesh, boundaries, LinearUpwind2D::new((1.0, 0.0)), config).unwrap();
    sim.set_initial_state(|p| (4.0 * PI * p.x).sin());

    let result = sim.calculate().unwrap();
    assert_eq!(result.frames_written, 5);
    for step in [0, 5, 10, 15, 20] {
        let path = frame_path(&out, "wave", step, "vtu");
        assert!(path.exists(), "missing {}", path.display());
    }
    assert!(!frame_path(&out, "wave", 1, "vtu").exists());

    let content = fs::read_to_string(frame_path(&out, "wave", 20, "vtu")).unwrap();
    assert!(content.contains("Name=\"U\""));
    assert!(content.contains("Name=\"TIME\""));
}

#[test]
fn test_euler_frames_in_legacy_format() {
    let dir = tempdir().unwrap();
    let gas = IdealGas::air();
    let mesh = Mesh2D::uniform_triangles(0.0, 1.0, 0.0, 1.0, 3, 3).unwrap();
    let boundaries = BoundaryManager::periodic_box(&mesh).unwrap();
    let time = VrTimeConfig::new(0.01, 4).with_refresh_rate(2);
    let output = OutputConfig::new(dir.path(), "gas", OutputFields::<EulerState2D>::euler(gas))
        .with_extension("vtk");
    let config = SimulationConfig::new(VrConfig::new(1), time).with_output(output);
    let mut sim = VrSimulation::new(mesh, boundaries, Ausm2D::new(gas), config).unwrap();
    sim.set_initial_state(|p| gas.to_conservative(&Primitive2D::new(1.0 + 0.1 * p.x, 0.3, 0.0, 1.0)));

    let result = sim.calculate().unwrap();
    assert_eq!(result.frames_written, 3);

    let content = fs::read_to_string(frame_path(dir.path(), "gas", 4, "vtk")).unwrap();
    assert!(content.starts_with("# vtk DataFile Version"));
    for name in ["rho", "p", "mach", "velocity"] {
        assert!(content.contains(name), "field {} missing", name);
    }
    assert_eq!(read_vtk_mesh(frame_path(dir.path(), "gas", 4, "vtk")).unwrap().n_cells(), 18);
}

#[test]
fn test_mesh_read_back_drives_a_run() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("channel.vtu");
    let original = Mesh2D::uniform_triangles(0.0, 2.0, 0.0, 0.5, 8, 2).unwrap();
    write_vtk_mesh(&path, &original).unwrap();

    let mesh = read_vtk_mesh(&path).unwrap();
    assert_eq!(mesh.n_cells(), original.n_cells());
    assert_eq!(mesh.n_edges(), original.n_edges());

    let boundaries = BoundaryManager::periodic_box(&mesh).unwrap();
    let config = SimulationConfig::new(VrConfig::new(1), VrTimeConfig::new(0.1, 10));
    let mut sim = VrSimulation::new(mesh, boundaries, LinearUpwind2D::new((1.0, 0.0)), config).unwrap();
    sim.set_initial_state(|p| p.y + 1.0);
    assert!(sim.calculate().is_ok());
}

#[test]
fn test_unwritable_output_directory() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "not a directory").unwrap();

    let mesh = Mesh2D::uniform_triangles(0.0, 1.0, 0.0, 1.0, 2, 2).unwrap();
    let boundaries = BoundaryManager::periodic_box(&mesh).unwrap();
    let config = SimulationConfig::new(VrConfig::new(1), VrTimeConfig::new(0.1, 2)).with_output(
        OutputConfig::new(blocker.join("out"), "m", OutputFields::scalar("U").unwrap()),
    );
    let mut sim = VrSimulation::new(mesh, boundaries, LinearUpwind2D::new((1.0, 1.0)), config).unwrap();
    assert!(matches!(sim.calculate(), Err(SimulationError::Io(_))));
}
