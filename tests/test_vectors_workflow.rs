//! End-to-end test of the vector-file workflow: load three vector files,
//! solve the branching plane, evaluate the surfaces, render, and persist.

use conezen::branching_plane::solve;
use conezen::io::{
    load_params_json, load_vector_file, save_params_json, write_params_txt, write_vector_file,
};
use conezen::render::{render_surfaces_svg, RenderOptions};
use conezen::surface::{evaluate, GridConfig};
use conezen::VectorField;
use std::fs;
use std::io::Write;
use std::path::Path;

fn write_file(path: &Path, content: &str) {
    let mut file = fs::File::create(path).unwrap();
    write!(file, "{}", content).unwrap();
}

const GRAD_A: &str = "\
gradient of state A
 3.264320588434E-003  -1.200000000000E-004   0.000000000000E+000
 1.000000000000E-004   5.500000000000E-003  -2.000000000000E-003
-8.100000000000E-004   2.300000000000E-004   1.100000000000E-003
";

const GRAD_B: &str = "\
gradient of state B
-1.560028700000E-003   2.000000000000E-004   0.000000000000E+000
 3.000000000000E-004  -4.100000000000E-003   1.000000000000E-003
 6.400000000000E-004  -1.200000000000E-004  -9.000000000000E-004
";

const NAC: &str = "\
non-adiabatic coupling
 1.000000000000E-002   2.000000000000E-002   0.000000000000E+000
-5.000000000000E-003   1.000000000000E-003   3.000000000000E-003
 2.000000000000E-003  -4.000000000000E-003   1.500000000000E-003
";

#[test]
fn test_full_vectors_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let grad_a_path = dir.path().join("grad_a.txt");
    let grad_b_path = dir.path().join("grad_b.txt");
    let nac_path = dir.path().join("nac.txt");
    write_file(&grad_a_path, GRAD_A);
    write_file(&grad_b_path, GRAD_B);
    write_file(&nac_path, NAC);

    // Load
    let (grad_a, skipped_a) = load_vector_file(&grad_a_path).unwrap();
    let (grad_b, skipped_b) = load_vector_file(&grad_b_path).unwrap();
    let (nac, skipped_nac) = load_vector_file(&nac_path).unwrap();
    assert_eq!(grad_a.num_atoms, 3);
    assert_eq!(grad_b.num_atoms, 3);
    assert_eq!(nac.num_atoms, 3);
    assert_eq!(skipped_a + skipped_b + skipped_nac, 0);

    // Solve
    let plane = solve(&grad_a, &grad_b, &nac).unwrap();
    assert!(plane.params.del_gh > 0.0);
    assert!(plane.params.delta_gh.abs() <= 1.0);
    assert!(plane.params.sigma >= 0.0);
    assert!((plane.x_hat.norm() - 1.0).abs() < 1e-9);
    assert!((plane.y_hat.norm() - 1.0).abs() < 1e-9);
    assert!(plane.x_hat.dot(&plane.y_hat).abs() < 1e-9);

    // Vector dumps carry the same number of rows as the input
    let labels: Vec<String> = vec!["C".into(), "H".into(), "O".into()];
    let x_field = VectorField::from_flat(plane.x_hat.clone()).unwrap();
    let x_path = dir.path().join("x_vectors.out");
    write_vector_file(&x_path, &labels, &x_field, "x").unwrap();
    let content = fs::read_to_string(&x_path).unwrap();
    assert_eq!(content.lines().count(), 4);
    assert!(content.starts_with("atoms x vectors"));

    // Text report
    let report_path = dir.path().join("cone_params.txt");
    write_params_txt(&report_path, &plane.params).unwrap();
    let report = fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("Branching Plane Key Quantities"));
    assert!(report.contains("del_gh"));

    // Parameter persistence round trip feeds the params workflow
    let json_path = dir.path().join("cone_params.json");
    save_params_json(&json_path, &plane.params).unwrap();
    let reloaded = load_params_json(&json_path).unwrap();
    assert_eq!(reloaded, plane.params);
    assert!(reloaded.validate().is_ok());

    // Evaluate on a small grid and render
    let config = GridConfig {
        r_samples: 15,
        theta_samples: 25,
        ..GridConfig::default()
    };
    let grid = evaluate(&plane.params, -228.401234567, &config);
    assert!(!grid.clamped);
    assert!(grid.e_upper.iter().all(|v| v.is_finite()));
    for it in 0..config.theta_samples {
        for ir in 0..config.r_samples {
            assert!(grid.e_upper[(it, ir)] >= grid.e_lower[(it, ir)]);
        }
    }

    let svg = render_surfaces_svg(&grid, &RenderOptions::default());
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("<polygon"));
}

#[test]
fn test_workflow_tolerates_noisy_vector_files() {
    let dir = tempfile::tempdir().unwrap();
    let noisy = format!("{}# stray comment line\nnot numbers at all\n", GRAD_A);
    let path = dir.path().join("grad_noisy.txt");
    write_file(&path, &noisy);

    let (field, skipped) = load_vector_file(&path).unwrap();
    assert_eq!(field.num_atoms, 3);
    assert_eq!(skipped, 2);
}

#[test]
fn test_mismatched_files_fail_at_solve() {
    let dir = tempfile::tempdir().unwrap();
    let short = "header\n0.1 0.2 0.3\n";
    let grad_a_path = dir.path().join("a.txt");
    let grad_b_path = dir.path().join("b.txt");
    let nac_path = dir.path().join("h.txt");
    write_file(&grad_a_path, GRAD_A);
    write_file(&grad_b_path, short);
    write_file(&nac_path, NAC);

    let (grad_a, _) = load_vector_file(&grad_a_path).unwrap();
    let (grad_b, _) = load_vector_file(&grad_b_path).unwrap();
    let (nac, _) = load_vector_file(&nac_path).unwrap();
    assert!(solve(&grad_a, &grad_b, &nac).is_err());
}
