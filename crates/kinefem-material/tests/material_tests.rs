//! Integration tests for kinefem-material.

use kinefem_material::orthotropic::OrthotropicConstants;
use kinefem_material::{
    ContinuumElastic, ElasticProperties, ElasticityOperator, MaterialDatabase, OrthotropicElastic,
    PoissonMaterial,
};
use kinefem_types::KinefemError;

fn props(e: f64, nu: f64) -> ElasticProperties {
    ElasticProperties {
        name: "test".into(),
        youngs_modulus: e,
        poisson_ratio: nu,
        density: 1000.0,
        rayleigh_alpha: 0.0,
        rayleigh_beta: 0.0,
    }
}

// ─── ElasticProperties Tests ──────────────────────────────────

#[test]
fn lame_parameters() {
    let p = props(1.0, 0.25);
    assert!((p.lame_lambda() - 0.4).abs() < 1e-12);
    assert!((p.shear_modulus() - 0.4).abs() < 1e-12);
    assert!((p.bulk_modulus() - 2.0 / 3.0).abs() < 1e-12);
    // λ + 2μ = 1.2 over ρ = 1000
    assert!((p.p_wave_speed() - 0.0012f64.sqrt()).abs() < 1e-12);
}

#[test]
fn properties_json_round_trip() {
    let p = MaterialDatabase::with_defaults().get("steel").unwrap().clone();
    let json = serde_json::to_string(&p).unwrap();
    let back: ElasticProperties = serde_json::from_str(&json).unwrap();
    assert_eq!(back, p);
}

#[test]
fn validate_rejects_bad_poisson() {
    let err = props(1.0, 0.5).validate().unwrap_err();
    assert!(matches!(err, KinefemError::InvalidMaterial(_)));
    assert!(props(1.0, -1.0).validate().is_err());
}

#[test]
fn validate_rejects_non_positive_modulus() {
    assert!(props(0.0, 0.3).validate().is_err());
    assert!(props(f64::NAN, 0.3).validate().is_err());
}

#[test]
fn properties_toml_defaults_damping() {
    let text = r#"
        name = "custom"
        youngs_modulus = 1.0e9
        poisson_ratio = 0.3
        density = 1200.0
    "#;
    let p: ElasticProperties = toml::from_str(text).unwrap();
    assert_eq!(p.rayleigh_alpha, 0.0);
    assert_eq!(p.rayleigh_beta, 0.0);
    assert!(p.validate().is_ok());
}

// ─── ContinuumElastic Tests ───────────────────────────────────

#[test]
fn isotropic_matrix_entries() {
    let m = ContinuumElastic::new(1.0, 0.25, 1.0).unwrap();
    let d = m.elasticity_matrix();
    assert_eq!(d.nrows(), 6);
    assert_eq!(d.ncols(), 6);
    // λ = μ = 0.4
    assert!((d[(0, 0)] - 1.2).abs() < 1e-12);
    assert!((d[(0, 1)] - 0.4).abs() < 1e-12);
    assert!((d[(2, 1)] - 0.4).abs() < 1e-12);
    assert!((d[(3, 3)] - 0.4).abs() < 1e-12);
    assert_eq!(d[(0, 3)], 0.0);
    assert_eq!(d[(3, 4)], 0.0);
}

#[test]
fn isotropic_matrix_is_symmetric() {
    let m = ContinuumElastic::new(210e9, 0.3, 7850.0).unwrap();
    let d = m.elasticity_matrix();
    for i in 0..6 {
        for j in 0..6 {
            assert_eq!(d[(i, j)], d[(j, i)]);
        }
    }
}

#[test]
fn rayleigh_damping_is_carried() {
    let m = ContinuumElastic::new(1e6, 0.3, 1000.0)
        .unwrap()
        .with_rayleigh_damping(0.5, 0.01)
        .unwrap();
    assert_eq!(m.rayleigh_alpha(), 0.5);
    assert_eq!(m.rayleigh_beta(), 0.01);
    assert!(ContinuumElastic::new(1e6, 0.3, 1000.0)
        .unwrap()
        .with_rayleigh_damping(-1.0, 0.0)
        .is_err());
}

// ─── Orthotropic Tests ────────────────────────────────────────

#[test]
fn orthotropic_with_equal_axes_matches_isotropic() {
    let e = 100.0;
    let nu = 0.25;
    let g = e / (2.0 * (1.0 + nu));
    let ortho = OrthotropicElastic::new(OrthotropicConstants {
        youngs: [e; 3],
        poisson: [nu; 3],
        shear: [g; 3],
        density: 1.0,
    })
    .unwrap();
    let iso = ContinuumElastic::new(e, nu, 1.0).unwrap();
    for i in 0..6 {
        for j in 0..6 {
            let a = ortho.elasticity_matrix()[(i, j)];
            let b = iso.elasticity_matrix()[(i, j)];
            assert!((a - b).abs() < 1e-9, "({i},{j}): {a} vs {b}");
        }
    }
}

#[test]
fn orthotropic_rejects_unstable_ratios() {
    let result = OrthotropicElastic::new(OrthotropicConstants {
        youngs: [1.0; 3],
        poisson: [0.9; 3],
        shear: [1.0; 3],
        density: 1.0,
    });
    assert!(result.is_err());
}

// ─── Poisson Tests ────────────────────────────────────────────

#[test]
fn poisson_isotropic() {
    let m = PoissonMaterial::isotropic(2.0, 3.0).unwrap();
    assert_eq!(m.conductivity.x_axis.x, 2.0);
    assert_eq!(m.conductivity.y_axis.x, 0.0);
    assert!(PoissonMaterial::isotropic(1.0, -1.0).is_err());
}

// ─── Database Tests ───────────────────────────────────────────

#[test]
fn database_defaults() {
    let db = MaterialDatabase::with_defaults();
    assert_eq!(db.len(), 5);
    assert!(db.get("steel").is_some());
    assert!(db.get("unobtainium").is_none());
    for name in db.names() {
        assert!(db.get(name).unwrap().validate().is_ok());
    }
}

#[test]
fn database_register_overwrites() {
    let mut db = MaterialDatabase::empty();
    assert!(db.is_empty());
    db.register(props(1.0, 0.1));
    db.register(props(2.0, 0.1));
    assert_eq!(db.len(), 1);
    assert_eq!(db.get("test").unwrap().youngs_modulus, 2.0);
}

#[test]
fn database_names_sorted() {
    let db = MaterialDatabase::with_defaults();
    let names = db.names();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}
