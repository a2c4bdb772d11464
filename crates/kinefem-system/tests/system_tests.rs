//! Integration tests for kinefem-system.

use kinefem_math::{DVec3, Frame};
use kinefem_system::{
    ConstraintContributor, ConstraintRows, Contributor, DofHolder, Node, RigidBody, Shaft,
    SystemDescriptor, SystemState,
};
use kinefem_types::{KinefemError, KinefemResult, NodeId, ShaftId};

/// ω_a − 2·ω_b = 0, with violation θ_a − 2·θ_b.
struct Coupling {
    rows: ConstraintRows,
    a: ShaftId,
    b: ShaftId,
    reaction: f64,
}

impl Coupling {
    fn new(a: ShaftId, b: ShaftId) -> Self {
        Self {
            rows: ConstraintRows::new("coupling", vec![DofHolder::Shaft(a), DofHolder::Shaft(b)], 1),
            a,
            b,
            reaction: 0.0,
        }
    }
}

impl Contributor for Coupling {
    fn name(&self) -> &str {
        "coupling"
    }

    fn update(&mut self, _time: f64, state: &SystemState) -> KinefemResult<()> {
        let c = state.shaft(self.a)?.pos - 2.0 * state.shaft(self.b)?.pos;
        self.rows.set_jacobian(0, 0, &[1.0]);
        self.rows.set_jacobian(0, 1, &[-2.0]);
        self.rows.set_violation(0, c);
        Ok(())
    }
}

impl ConstraintContributor for Coupling {
    fn rows(&self) -> &ConstraintRows {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut ConstraintRows {
        &mut self.rows
    }

    fn fetch_reactions(&mut self, factor: f64) {
        self.reaction = self.rows.row(0).multiplier * factor;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn two_shafts() -> (SystemState, ShaftId, ShaftId) {
    let mut state = SystemState::new();
    let a = state.add_shaft(Shaft::new(1.0));
    let b = state.add_shaft(Shaft::new(1.0));
    (state, a, b)
}

// ─── Layout Tests ─────────────────────────────────────────────

#[test]
fn layout_skips_fixed_holders() {
    let mut state = SystemState::new();
    let n0 = state.add_node(Node::new(DVec3::ZERO));
    let n1 = state.add_node(Node::fixed(DVec3::X));
    let s0 = state.add_shaft(Shaft::new(1.0));
    let b0 = state.add_body(RigidBody::new(Frame::IDENTITY, 1.0, kinefem_math::DMat3::IDENTITY));

    let layout = state.build_layout();
    assert_eq!(layout.total_dofs(), 3 + 1 + 6);
    assert_eq!(layout.offset(DofHolder::Node(n0)).unwrap(), Some(0));
    assert_eq!(layout.offset(DofHolder::Node(n1)).unwrap(), None);
    assert_eq!(layout.offset(DofHolder::Shaft(s0)).unwrap(), Some(3));
    assert_eq!(layout.offset(DofHolder::Body(b0)).unwrap(), Some(4));
}

#[test]
fn layout_epoch_increments() {
    let mut state = SystemState::new();
    assert_eq!(state.epoch(), 0);
    let first = state.build_layout();
    let second = state.build_layout();
    assert_eq!(first.epoch(), 1);
    assert_eq!(second.epoch(), 2);
}

#[test]
fn layout_unknown_holder_errors() {
    let mut state = SystemState::new();
    let layout = state.build_layout();
    let err = layout.offset(DofHolder::Node(NodeId(7))).unwrap_err();
    assert!(matches!(err, KinefemError::UnknownHolder(_)));
}

#[test]
fn velocities_gather_scatter() {
    let mut state = SystemState::new();
    let n = state.add_node(Node::new(DVec3::ZERO));
    state.node_mut(n).unwrap().vel = DVec3::new(1.0, 2.0, 3.0);
    let s = state.add_shaft(Shaft::new(1.0));
    state.shaft_mut(s).unwrap().vel = 4.0;

    let layout = state.build_layout();
    let mut v = state.gather_velocities(&layout).unwrap();
    assert_eq!(v, vec![1.0, 2.0, 3.0, 4.0]);

    v[3] = -1.0;
    state.scatter_velocities(&layout, &v).unwrap();
    assert_eq!(state.shaft(s).unwrap().vel, -1.0);
}

#[test]
fn body_point_velocity_includes_spin() {
    let mut body = RigidBody::solid_box(
        Frame::from_position(DVec3::new(1.0, 0.0, 0.0)),
        12.0,
        DVec3::splat(0.5),
    );
    assert!((body.world_inertia().x_axis.x - 2.0).abs() < 1e-12);
    body.lin_vel = DVec3::new(0.0, 0.0, 1.0);
    body.ang_vel = DVec3::new(0.0, 0.0, 2.0);
    let v = body.point_velocity(DVec3::new(2.0, 0.0, 0.0));
    assert!((v - DVec3::new(0.0, 2.0, 1.0)).length() < 1e-12);
}

// ─── Registration Tests ───────────────────────────────────────

#[test]
fn unregistered_constraint_fails() {
    let (mut state, a, b) = two_shafts();
    let mut coupling = Coupling::new(a, b);
    coupling.update(0.0, &state).unwrap();

    let mut descriptor = SystemDescriptor::new(state.build_layout());
    let err = coupling.load_jacobians(&mut descriptor).unwrap_err();
    assert!(matches!(err, KinefemError::Unregistered(_)));
}

#[test]
fn stale_offsets_fail() {
    let (mut state, a, b) = two_shafts();
    let mut coupling = Coupling::new(a, b);
    coupling.update(0.0, &state).unwrap();

    let mut old = SystemDescriptor::new(state.build_layout());
    coupling.inject(&mut old);

    let mut fresh = SystemDescriptor::new(state.build_layout());
    let err = coupling.load_jacobians(&mut fresh).unwrap_err();
    assert!(matches!(err, KinefemError::StaleLayout { held: 1, current: 2, .. }));
}

#[test]
fn inject_assigns_consecutive_rows() {
    let (mut state, a, b) = two_shafts();
    let mut first = Coupling::new(a, b);
    let mut second = Coupling::new(b, a);
    let mut descriptor = SystemDescriptor::new(state.build_layout());
    first.inject(&mut descriptor);
    second.inject(&mut descriptor);
    assert_eq!(descriptor.n_constraints(), 2);
    assert_eq!(first.rows().offset(descriptor.epoch()).unwrap(), 0);
    assert_eq!(second.rows().offset(descriptor.epoch()).unwrap(), 1);
}

#[test]
fn inactive_constraint_registers_nothing() {
    let (mut state, a, b) = two_shafts();
    let mut coupling = Coupling::new(a, b);
    coupling.rows_mut().set_active(false);
    let mut descriptor = SystemDescriptor::new(state.build_layout());
    coupling.inject(&mut descriptor);
    assert_eq!(coupling.num_constraints(), 0);
    assert_eq!(descriptor.n_constraints(), 0);
    assert!(coupling.load_jacobians(&mut descriptor).is_ok());
}

// ─── Assembly Tests ───────────────────────────────────────────

#[test]
fn jacobian_skips_fixed_holders() {
    let (mut state, a, b) = two_shafts();
    state.shaft_mut(a).unwrap().fixed = true;
    let mut coupling = Coupling::new(a, b);
    coupling.update(0.0, &state).unwrap();

    let mut descriptor = SystemDescriptor::new(state.build_layout());
    coupling.inject(&mut descriptor);
    coupling.load_jacobians(&mut descriptor).unwrap();
    assert_eq!(descriptor.jacobian_triplets(), &[(0, 0, -2.0)]);
}

#[test]
fn bias_is_clamped() {
    let (mut state, a, b) = two_shafts();
    state.shaft_mut(a).unwrap().pos = 1.0;
    let mut coupling = Coupling::new(a, b);
    coupling.update(0.0, &state).unwrap();

    coupling.bi_reset();
    coupling.bi_load_c(10.0, 0.5, true);
    assert_eq!(coupling.rows().row(0).bias, 0.5);

    coupling.bi_reset();
    coupling.bi_load_c(10.0, 0.5, false);
    assert_eq!(coupling.rows().row(0).bias, 10.0);
}

#[test]
fn prescribed_speed_enters_bias() {
    let (mut state, a, b) = two_shafts();
    {
        let motor = state.shaft_mut(b).unwrap();
        motor.fixed = true;
        motor.vel = 3.0;
    }
    let mut coupling = Coupling::new(a, b);
    coupling.update(0.0, &state).unwrap();
    coupling.bi_reset();
    coupling.bi_load_prescribed(&state).unwrap();
    assert_eq!(coupling.rows().row(0).bias, -6.0);
}

#[test]
fn residual_and_multiplier_transfer() {
    let (mut state, a, b) = two_shafts();
    let mut coupling = Coupling::new(a, b);
    coupling.update(0.0, &state).unwrap();
    let layout = state.build_layout();
    let mut descriptor = SystemDescriptor::new(layout.clone());
    coupling.inject(&mut descriptor);

    coupling.scatter_reactions(&layout, &[0.5]).unwrap();
    let mut l = vec![0.0];
    coupling.gather_reactions(&layout, &mut l).unwrap();
    assert_eq!(l, vec![0.5]);

    let mut r = vec![0.0; 2];
    coupling.load_residual_cql(&layout, &mut r, &l, 2.0).unwrap();
    assert_eq!(r, vec![1.0, -2.0]);

    coupling.to_descriptor(&mut descriptor).unwrap();
    descriptor.multipliers_mut()[0] = 4.0;
    coupling.from_descriptor(&descriptor).unwrap();
    assert_eq!(coupling.rows().row(0).multiplier, 4.0);
}

#[test]
fn generalized_reaction_is_jacobian_transpose_lambda() {
    let (state, a, b) = two_shafts();
    let mut coupling = Coupling::new(a, b);
    coupling.update(0.0, &state).unwrap();
    coupling.rows_mut().set_multiplier(0, 3.0);
    let ra = coupling.generalized_reaction(0, 1.0).unwrap();
    let rb = coupling.generalized_reaction(1, 0.5).unwrap();
    assert_eq!(ra[0], 3.0);
    assert_eq!(rb[0], -3.0);
    assert!(coupling.generalized_reaction(2, 1.0).is_err());
}

#[test]
fn constraint_c_loading() {
    let (mut state, a, b) = two_shafts();
    state.shaft_mut(a).unwrap().pos = 0.3;
    let mut coupling = Coupling::new(a, b);
    coupling.update(0.0, &state).unwrap();
    let layout = state.build_layout();
    let mut descriptor = SystemDescriptor::new(layout.clone());
    coupling.inject(&mut descriptor);
    let mut qc = vec![0.0];
    coupling.load_constraint_c(&layout, &mut qc, 1.0, true, 0.1).unwrap();
    assert!((qc[0] - 0.1).abs() < 1e-15);
    assert_eq!(coupling.violation(), vec![0.3]);
}

#[test]
fn short_buffers_are_rejected() {
    let (mut state, a, b) = two_shafts();
    let mut first = Coupling::new(a, b);
    let mut second = Coupling::new(b, a);
    first.update(0.0, &state).unwrap();
    second.update(0.0, &state).unwrap();
    let layout = state.build_layout();
    let mut descriptor = SystemDescriptor::new(layout.clone());
    first.inject(&mut descriptor);
    second.inject(&mut descriptor);

    // `second` owns row 1; one-entry vectors cannot hold it.
    let short = [0.0];
    let mut short_mut = [0.0];
    let is_mismatch = |r: KinefemResult<()>| matches!(r, Err(KinefemError::DimensionMismatch(_)));
    assert!(is_mismatch(second.scatter_reactions(&layout, &short)));
    assert!(is_mismatch(second.gather_reactions(&layout, &mut short_mut)));
    assert!(is_mismatch(second.load_constraint_c(&layout, &mut short_mut, 1.0, false, 0.0)));
    let mut r = vec![0.0; 2];
    assert!(is_mismatch(second.load_residual_cql(&layout, &mut r, &short, 1.0)));

    // The residual must cover both shafts.
    let mut r_short = vec![0.0; 1];
    assert!(is_mismatch(first.load_residual_cql(&layout, &mut r_short, &[1.0, 1.0], 1.0)));

    // A descriptor on the same layout with no rows registered.
    let mut empty = SystemDescriptor::new(layout.clone());
    assert!(is_mismatch(first.to_descriptor(&mut empty)));
    assert!(is_mismatch(first.from_descriptor(&empty)));

    // Correctly sized buffers still work and leave row 0 untouched.
    let mut l = vec![0.0; 2];
    second.rows_mut().set_multiplier(0, 2.5);
    second.gather_reactions(&layout, &mut l).unwrap();
    assert_eq!(l, vec![0.0, 2.5]);
}
