//! Integration tests for kinefem-fea.

use std::sync::Arc;

use faer::Mat;
use kinefem_fea::builder::{add_field_mesh, add_solid_mesh};
use kinefem_fea::{CorotationalTetra, PoissonTetra, TetGeometry, VolumeGravityLoader, VolumeSourceLoader};
use kinefem_material::{ContinuumElastic, ElasticityOperator, PoissonMaterial};
use kinefem_math::{DMat3, DQuat, DVec3};
use kinefem_mesh::generators::{box_tetrahedra, single_tetrahedron};
use kinefem_system::{ElementContributor, Contributor, FieldNode, Node, SystemState};
use kinefem_types::{KinefemError, NodeId};

const E: f64 = 1000.0;
const NU: f64 = 0.3;
const RHO: f64 = 10.0;

fn unit_tet_points() -> [DVec3; 4] {
    [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z]
}

fn material() -> Arc<dyn ElasticityOperator> {
    Arc::new(ContinuumElastic::new(E, NU, RHO).unwrap())
}

fn setup_element(points: [DVec3; 4]) -> (SystemState, CorotationalTetra) {
    let mut state = SystemState::new();
    let ids = points.map(|p| state.add_node(Node::new(p)));
    let mut element = CorotationalTetra::new(ids, material()).unwrap();
    element.setup_initial(&state).unwrap();
    (state, element)
}

fn move_nodes(state: &mut SystemState, ids: [NodeId; 4], f: impl Fn(DVec3) -> DVec3) {
    for id in ids {
        let node = state.node_mut(id).unwrap();
        node.pos = f(node.x0);
    }
}

fn rigid_motion() -> (DQuat, DVec3) {
    (
        DQuat::from_axis_angle(DVec3::new(0.3, -1.0, 0.6).normalize(), 2.1),
        DVec3::new(0.4, -1.5, 3.0),
    )
}

// ─── Geometry Tests ───────────────────────────────────────────

#[test]
fn geometry_gradients_sum_to_zero() {
    let g = TetGeometry::new(unit_tet_points()).unwrap();
    assert!((g.volume - 1.0 / 6.0).abs() < 1e-15);
    let sum = g.grads.iter().copied().sum::<DVec3>();
    assert!(sum.length() < 1e-15);
    assert!((g.grads[1] - DVec3::X).length() < 1e-15);
}

#[test]
fn local_coordinates_of_unit_tet() {
    let g = TetGeometry::new(unit_tet_points()).unwrap();
    let p = DVec3::new(0.2, 0.3, 0.1);
    assert!((g.local_coordinates(p) - p).length() < 1e-15);
    assert!((g.local_coordinates(g.centroid()) - DVec3::splat(0.25)).length() < 1e-15);
}

#[test]
fn setup_rejects_inverted_element() {
    let mut points = unit_tet_points();
    points.swap(1, 2);
    let mut state = SystemState::new();
    let ids = points.map(|p| state.add_node(Node::new(p)));
    let mut element = CorotationalTetra::new(ids, material()).unwrap();
    let err = element.setup_initial(&state).unwrap_err();
    assert!(matches!(err, KinefemError::DegenerateGeometry(_)));
}

#[test]
fn setup_rejects_flat_element() {
    let points = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)];
    assert!(matches!(
        TetGeometry::new(points),
        Err(KinefemError::DegenerateGeometry(_))
    ));
}

#[test]
fn use_before_setup_is_an_error() {
    let mut state = SystemState::new();
    let ids = unit_tet_points().map(|p| state.add_node(Node::new(p)));
    let mut element = CorotationalTetra::new(ids, material()).unwrap();
    assert!(element.update(0.0, &state).is_err());
    assert_eq!(element.nodal_mass(), 0.0);
}

// ─── Corotational Invariance Tests ────────────────────────────

#[test]
fn volume_invariant_under_rigid_motion() {
    let points = [
        DVec3::new(0.1, 0.0, 0.2),
        DVec3::new(1.3, 0.1, 0.0),
        DVec3::new(0.2, 0.9, -0.1),
        DVec3::new(0.3, 0.2, 1.1),
    ];
    let (mut state, element) = setup_element(points);
    let v0 = element.compute_volume(&state).unwrap();
    assert!(v0 > 0.0);

    let (q, t) = rigid_motion();
    move_nodes(&mut state, element.nodes(), |x| q * x + t);
    let v1 = element.compute_volume(&state).unwrap();
    assert!((v1 - v0).abs() < 1e-12);
}

#[test]
fn rigid_motion_gives_zero_internal_force() {
    let (mut state, mut element) = setup_element(unit_tet_points());
    for angle in [0.0, 0.5, 1.7, 3.0] {
        let q = DQuat::from_axis_angle(DVec3::new(1.0, 2.0, -0.5).normalize(), angle);
        let t = DVec3::new(-2.0, 0.5, 7.0);
        move_nodes(&mut state, element.nodes(), |x| q * x + t);
        element.update(0.0, &state).unwrap();

        let mut fi = [0.0; 12];
        element.compute_internal_forces(&state, &mut fi).unwrap();
        for f in fi {
            assert!(f.abs() < 1e-9, "angle {angle}: {fi:?}");
        }
    }
}

#[test]
fn rotation_tracks_rigid_rotation() {
    let (mut state, mut element) = setup_element(unit_tet_points());
    let (q, t) = rigid_motion();
    move_nodes(&mut state, element.nodes(), |x| q * x + t);
    element.update(0.0, &state).unwrap();
    assert!(element.rotation().abs_diff_eq(DMat3::from_quat(q), 1e-12));
}

#[test]
fn strain_is_frame_independent() {
    let delta = 1e-3;
    let (mut state, mut element) = setup_element(unit_tet_points());
    let ids = element.nodes();

    state.node_mut(ids[1]).unwrap().pos.x += delta;
    element.update(0.0, &state).unwrap();
    let reference = element.strain(&state).unwrap();

    let (q, t) = rigid_motion();
    move_nodes(&mut state, ids, |x| q * x + t);
    state.node_mut(ids[1]).unwrap().pos += q * DVec3::new(delta, 0.0, 0.0);
    element.update(0.0, &state).unwrap();
    let rotated = element.strain(&state).unwrap();

    for k in 0..6 {
        assert!((rotated.0[k] - reference.0[k]).abs() < 1e-12);
    }
}

#[test]
fn internal_forces_follow_the_rotation() {
    let (mut state, mut element) = setup_element(unit_tet_points());
    let ids = element.nodes();
    state.node_mut(ids[3]).unwrap().pos.z += 0.01;
    element.update(0.0, &state).unwrap();
    let mut f_ref = [0.0; 12];
    element.compute_internal_forces(&state, &mut f_ref).unwrap();

    let (q, t) = rigid_motion();
    move_nodes(&mut state, ids, |x| q * x + t);
    state.node_mut(ids[3]).unwrap().pos += q * DVec3::new(0.0, 0.0, 0.01);
    element.update(0.0, &state).unwrap();
    let mut f_rot = [0.0; 12];
    element.compute_internal_forces(&state, &mut f_rot).unwrap();

    for a in 0..4 {
        let expected = q * DVec3::from_slice(&f_ref[3 * a..3 * a + 3]);
        let got = DVec3::from_slice(&f_rot[3 * a..3 * a + 3]);
        assert!((expected - got).length() < 1e-9);
    }
}

// ─── Strain / Stress Tests ────────────────────────────────────

#[test]
fn uniaxial_strain_and_stress() {
    let delta = 1e-4;
    let (mut state, mut element) = setup_element(unit_tet_points());
    let ids = element.nodes();
    state.node_mut(ids[1]).unwrap().pos.x += delta;
    element.update(0.0, &state).unwrap();

    let eps = element.strain(&state).unwrap();
    assert!((eps.xx() - delta).abs() < 1e-12);
    for k in 1..6 {
        assert!(eps.0[k].abs() < 1e-12);
    }

    let sigma = element.stress(&state).unwrap();
    let scale = E / ((1.0 + NU) * (1.0 - 2.0 * NU));
    assert!((sigma.xx() - scale * (1.0 - NU) * delta).abs() < 1e-9);
    assert!((sigma.yy() - scale * NU * delta).abs() < 1e-9);
    assert!((sigma.zz() - scale * NU * delta).abs() < 1e-9);
    assert!(sigma.xy().abs() < 1e-9);
    assert!((sigma.von_mises() - (sigma.xx() - sigma.yy()).abs()).abs() < 1e-9);
}

#[test]
fn strain_displacement_operator_of_unit_tet() {
    let (_, element) = setup_element(unit_tet_points());
    let b = element.b_matrix().unwrap();
    assert_eq!((b.nrows(), b.ncols()), (6, 12));
    assert!((b[(0, 0)] + 1.0).abs() < 1e-15);
    assert!((b[(0, 3)] - 1.0).abs() < 1e-15);
    assert!((b[(3, 6)] - 1.0).abs() < 1e-15);
    assert!(b[(2, 3)].abs() < 1e-15);
}

#[test]
fn shear_strain_is_engineering() {
    let gamma = 1e-4;
    let (mut state, mut element) = setup_element(unit_tet_points());
    let ids = element.nodes();
    // node 2 sits at y = 1: u_x = γ·y gives γ_xy = γ
    state.node_mut(ids[2]).unwrap().pos.x += gamma;
    element.update(0.0, &state).unwrap();
    let eps = element.strain(&state).unwrap();
    // the corotational frame removes the rotation; only the symmetric part remains
    assert!((eps.xy() - gamma).abs() < 1e-6);
}

#[test]
fn strain_energy_of_uniaxial_stretch() {
    let delta = 1e-3;
    let (mut state, mut element) = setup_element(unit_tet_points());
    let ids = element.nodes();
    state.node_mut(ids[1]).unwrap().pos.x += delta;
    element.update(0.0, &state).unwrap();

    let scale = E / ((1.0 + NU) * (1.0 - 2.0 * NU));
    let expected = 0.5 * scale * (1.0 - NU) * delta * delta / 6.0;
    let energy = element.strain_energy(&state).unwrap();
    assert!((energy - expected).abs() < 1e-9 * expected, "{energy} vs {expected}");
}

#[test]
fn strain_energy_vanishes_under_rigid_motion() {
    let (mut state, mut element) = setup_element(unit_tet_points());
    let (q, t) = rigid_motion();
    move_nodes(&mut state, element.nodes(), |x| q * x + t);
    element.update(0.0, &state).unwrap();
    assert!(element.strain_energy(&state).unwrap().abs() < 1e-12);
}

#[test]
fn energy_matches_stress_work_under_symmetric_stretch() {
    let (mut state, mut element) = setup_element(unit_tet_points());
    let stretch = DMat3::from_cols(
        DVec3::new(2e-3, 5e-4, -3e-4),
        DVec3::new(5e-4, -1e-3, 8e-4),
        DVec3::new(-3e-4, 8e-4, 1.5e-3),
    );
    move_nodes(&mut state, element.nodes(), |x| x + stretch * x);
    element.update(0.0, &state).unwrap();

    let k = element.stiffness_matrix().unwrap();
    for i in 0..12 {
        for j in 0..12 {
            assert!((k[(i, j)] - k[(j, i)]).abs() < 1e-9);
        }
    }

    let eps = element.strain(&state).unwrap();
    let sigma = element.stress(&state).unwrap();
    let work: f64 = (0..6).map(|i| sigma.0[i] * eps.0[i]).sum();
    let energy = element.strain_energy(&state).unwrap();
    assert!((energy - 0.5 * work / 6.0).abs() < 1e-9 * energy);

    // No rotation, so f·d is the full K-norm of the displacement.
    let mut fi = [0.0; 12];
    element.compute_internal_forces(&state, &mut fi).unwrap();
    let d = element.state_block(&state).unwrap();
    let fd: f64 = fi.iter().zip(&d).map(|(f, u)| f * u).sum();
    assert!((fd - 2.0 * energy).abs() < 1e-9 * energy);
    let net = (0..4).fold(DVec3::ZERO, |acc, a| acc + DVec3::from_slice(&fi[3 * a..3 * a + 3]));
    assert!(net.length() < 1e-9);
}

// ─── Assembly Tests ───────────────────────────────────────────

#[test]
fn krm_stiffness_only_matches_local_stiffness() {
    let (_state, element) = setup_element(unit_tet_points());
    let mut h = Mat::<f64>::zeros(12, 12);
    element.compute_krm_global(&mut h, 1.0, 0.0, 0.0).unwrap();
    let k = element.stiffness_matrix().unwrap();
    for i in 0..12 {
        for j in 0..12 {
            assert!((h[(i, j)] - k[(i, j)]).abs() < 1e-9);
            assert!((h[(i, j)] - h[(j, i)]).abs() < 1e-9);
        }
    }
}

#[test]
fn krm_mass_only_is_lumped() {
    let (_state, element) = setup_element(unit_tet_points());
    let mut h = Mat::<f64>::zeros(12, 12);
    element.compute_krm_global(&mut h, 0.0, 0.0, 1.0).unwrap();
    let expected = RHO * (1.0 / 6.0) / 4.0;
    assert!((element.nodal_mass() - expected).abs() < 1e-15);
    for i in 0..12 {
        for j in 0..12 {
            let target = if i == j { expected } else { 0.0 };
            assert!((h[(i, j)] - target).abs() < 1e-15);
        }
    }
}

#[test]
fn krm_rayleigh_damping() {
    let mut state = SystemState::new();
    let ids = unit_tet_points().map(|p| state.add_node(Node::new(p)));
    let damped: Arc<dyn ElasticityOperator> = Arc::new(
        ContinuumElastic::new(E, NU, RHO)
            .unwrap()
            .with_rayleigh_damping(0.5, 0.01)
            .unwrap(),
    );
    let mut element = CorotationalTetra::new(ids, damped).unwrap();
    element.setup_initial(&state).unwrap();

    let mut h = Mat::<f64>::zeros(12, 12);
    element.compute_krm_global(&mut h, 0.0, 1.0, 0.0).unwrap();
    let k = element.stiffness_matrix().unwrap();
    let m = element.nodal_mass();
    assert!((h[(0, 0)] - (0.01 * k[(0, 0)] + 0.5 * m)).abs() < 1e-9);
    assert!((h[(0, 4)] - 0.01 * k[(0, 4)]).abs() < 1e-9);
}

#[test]
fn krm_rejects_wrong_size() {
    let (_state, element) = setup_element(unit_tet_points());
    let mut h = Mat::<f64>::zeros(6, 6);
    assert!(element.compute_krm_global(&mut h, 1.0, 0.0, 0.0).is_err());
}

#[test]
fn stiffness_annihilates_translation() {
    let (_state, element) = setup_element(unit_tet_points());
    let k = element.stiffness_matrix().unwrap();
    for axis in 0..3 {
        for i in 0..12 {
            let row: f64 = (0..4).map(|a| k[(i, 3 * a + axis)]).sum();
            assert!(row.abs() < 1e-9);
        }
    }
}

#[test]
fn state_block_is_local_displacement() {
    let (mut state, mut element) = setup_element(unit_tet_points());
    let ids = element.nodes();
    state.node_mut(ids[2]).unwrap().pos.y += 0.02;
    element.update(0.0, &state).unwrap();
    let d = element.state_block(&state).unwrap();
    assert_eq!(d.len(), 12);
    assert!((d[7] - 0.02).abs() < 1e-12);
}

// ─── Load Tests ───────────────────────────────────────────────

#[test]
fn compute_nf_uses_shape_functions() {
    let (_state, element) = setup_element(unit_tet_points());
    let nf = element
        .compute_nf(0.2, 0.3, 0.1, DVec3::new(0.0, 0.0, -1.0), None)
        .unwrap();
    assert!((nf.det_j - 1.0).abs() < 1e-15);
    assert!((nf.qi[2] + 0.4).abs() < 1e-15);
    assert!((nf.qi[5] + 0.2).abs() < 1e-15);
    assert!((nf.qi[8] + 0.3).abs() < 1e-15);
    assert!((nf.qi[11] + 0.1).abs() < 1e-15);

    let scaled = unit_tet_points().map(|p| p * 2.0);
    let nf = element.compute_nf(0.25, 0.25, 0.25, DVec3::X, Some(&scaled)).unwrap();
    assert!((nf.det_j - 8.0).abs() < 1e-12);
}

#[test]
fn gravity_loader_total_is_weight() {
    let points = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(2.0, 0.0, 0.0),
        DVec3::new(0.0, 1.5, 0.0),
        DVec3::new(0.5, 0.5, 3.0),
    ];
    let (state, element) = setup_element(points);
    let g = DVec3::new(0.0, 0.0, -9.81);
    let volume = element.volume().unwrap();

    let q = VolumeGravityLoader::new(g).compute_q(&element, None).unwrap();
    let mut total = DVec3::ZERO;
    for a in 0..4 {
        let fa = DVec3::from_slice(&q[3 * a..3 * a + 3]);
        assert!((fa - g * RHO * volume / 4.0).length() < 1e-10);
        total += fa;
    }
    assert!((total - g * RHO * volume).length() < 1e-10);

    let mut fg = [0.0; 12];
    element.compute_gravity_forces(&state, g, &mut fg).unwrap();
    assert_eq!(fg, q);
}

// ─── Scalar Field Tests ───────────────────────────────────────

fn linear_field(p: DVec3) -> f64 {
    2.0 + 0.5 * p.x - 1.5 * p.y + 3.0 * p.z
}

#[test]
fn poisson_patch_test() {
    let mesh = box_tetrahedra(2, 2, 2, DVec3::splat(2.0));
    let mut state = SystemState::new();
    let material = Arc::new(PoissonMaterial::isotropic(4.0, 1.0).unwrap());
    let field = add_field_mesh(&mut state, &mesh, material, 0.0).unwrap();
    for id in &field.nodes {
        let node = state.field_node_mut(*id).unwrap();
        node.p = linear_field(node.position);
    }

    let mut residual = vec![0.0; field.nodes.len()];
    for element in &field.elements {
        let g = element.p_gradient(&state).unwrap();
        assert!((g - DVec3::new(0.5, -1.5, 3.0)).length() < 1e-12);

        let mut fi = [0.0; 4];
        element.compute_internal_forces(&state, &mut fi).unwrap();
        for (a, id) in element.nodes().iter().enumerate() {
            residual[id.index()] += fi[a];
        }
    }

    // the only interior vertex of a 2×2×2 lattice: (1, 1, 1)
    let interior = 1 + 3 * (1 + 3);
    assert!(residual[interior].abs() < 1e-12);
}

#[test]
fn poisson_flux_and_capacity() {
    let mut state = SystemState::new();
    let ids = unit_tet_points().map(|p| state.add_field_node(FieldNode::new(p, 0.0)));
    let material = Arc::new(PoissonMaterial::isotropic(2.0, 6.0).unwrap());
    let mut element = PoissonTetra::new(ids, material);
    element.setup_initial(&state).unwrap();
    state.field_node_mut(ids[1]).unwrap().p = 1.0;

    let flux = element.flux(&state).unwrap();
    assert!((flux - DVec3::new(-2.0, 0.0, 0.0)).length() < 1e-12);
    assert!((element.nodal_mass() - 0.25).abs() < 1e-15);

    let mut h = Mat::<f64>::zeros(4, 4);
    element.compute_krm_global(&mut h, 1.0, 1.0, 0.0).unwrap();
    let k = element.stiffness_matrix();
    assert!((h[(1, 1)] - (k[(1, 1)] + 0.25)).abs() < 1e-12);
    assert!((h[(1, 2)] - k[(1, 2)]).abs() < 1e-12);

    // ½·V·k·|∇P|² with V = 1/6, k = 2, ∇P = X
    assert!((element.strain_energy(&state).unwrap() - 1.0 / 6.0).abs() < 1e-12);

    let mut fi = [0.0; 4];
    element.compute_internal_forces(&state, &mut fi).unwrap();
    assert!(fi.iter().sum::<f64>().abs() < 1e-12);
    // P = (0, 1, 0, 0) picks out K[1][1] = 2·(1/6)
    assert!((fi[1] - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn source_loader_total() {
    let mut state = SystemState::new();
    let ids = unit_tet_points().map(|p| state.add_field_node(FieldNode::new(p, 0.0)));
    let mut element = PoissonTetra::new(ids, Arc::new(PoissonMaterial::isotropic(1.0, 1.0).unwrap()));
    element.setup_initial(&state).unwrap();
    let q = VolumeSourceLoader::new(12.0).compute_q(&element).unwrap();
    for qa in q {
        assert!((qa - 0.5).abs() < 1e-12);
    }
}

// ─── Builder Tests ────────────────────────────────────────────

#[test]
fn solid_mesh_builder() {
    let mesh = box_tetrahedra(1, 1, 2, DVec3::new(1.0, 1.0, 2.0));
    let mut state = SystemState::new();
    let solid = add_solid_mesh(&mut state, &mesh, material()).unwrap();
    assert_eq!(solid.nodes.len(), mesh.vertex_count());
    assert_eq!(solid.elements.len(), 12);
    let total: f64 = solid.elements.iter().map(|e| e.volume().unwrap()).sum();
    assert!((total - 2.0).abs() < 1e-12);
}

#[test]
fn solid_mesh_builder_rejects_bad_mesh() {
    let mut mesh = single_tetrahedron();
    mesh.tets[0].swap(0, 1);
    let mut state = SystemState::new();
    assert!(add_solid_mesh(&mut state, &mesh, material()).is_err());
}
