//! Revolute-translational joint.
//!
//! Body 1 carries a revolute axis (point `p1`, direction `z1`). Body 2
//! carries a translational guide (point `p2`, directions `x2`, `y2`). The
//! guide may slide along `y2` and the pair may rotate about `z1`, while the
//! two axes stay perpendicular and a fixed distance apart:
//!
//! ```text
//! C0 = z1·x2           = 0
//! C1 = z1·y2           = 0
//! C2 = d12·z1          = 0
//! C3 = d12·x2 − dist   = 0      (d12 = p2 − p1)
//! ```
//!
//! Jacobians are taken with respect to `[v, ω]` of each body, both in the
//! absolute frame, with `rᵢ = pᵢ − originᵢ`.

use kinefem_math::{DVec3, Frame};
use kinefem_system::{ConstraintContributor, ConstraintRows, Contributor, DofHolder, SystemState};
use kinefem_types::{BodyId, KinefemError, KinefemResult};

use crate::wrench::Wrench;

/// Anchors and axes in absolute coordinates, refreshed by `update`.
#[derive(Debug, Clone, Copy)]
struct AbsoluteGeometry {
    body1: Frame,
    p1: DVec3,
    z1: DVec3,
    p2: DVec3,
    x2: DVec3,
    y2: DVec3,
}

/// A 4-row joint between two rigid bodies.
#[derive(Debug, Clone)]
pub struct RevoluteTranslational {
    rows: ConstraintRows,
    body1: BodyId,
    body2: BodyId,

    // Body-local anchors.
    p1: DVec3,
    z1: DVec3,
    p2: DVec3,
    x2: DVec3,
    y2: DVec3,

    dist: f64,
    cur_par1: f64,
    cur_par2: f64,
    cur_dot: f64,
    cur_dist: f64,

    abs: AbsoluteGeometry,
    scaled_multipliers: [f64; 4],
    reaction1: Wrench,
    reaction2: Wrench,
}

fn unit(v: DVec3, what: &str) -> KinefemResult<DVec3> {
    v.try_normalize()
        .ok_or_else(|| KinefemError::DegenerateGeometry(format!("{what} has zero length")))
}

impl RevoluteTranslational {
    /// Builds the joint from one absolute frame: the revolute axis is the
    /// frame Z through its origin; the guide is anchored at
    /// `origin + distance·X` with `x2 = X` and `y2 = Y`.
    pub fn initialize_from_frame(
        state: &SystemState,
        body1: BodyId,
        body2: BodyId,
        frame: &Frame,
        distance: f64,
    ) -> KinefemResult<Self> {
        let x = frame.axis_x();
        Self::initialize(
            state,
            body1,
            body2,
            false,
            frame.position,
            frame.axis_z(),
            frame.position + x * distance,
            x,
            frame.axis_y(),
            false,
            distance,
        )
    }

    /// Builds the joint from explicit points and directions, given in the
    /// body frames when `local` is true and in the absolute frame otherwise.
    ///
    /// With `auto_distance` the imposed distance is measured from the
    /// current configuration, so all four violations start at zero.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        state: &SystemState,
        body1: BodyId,
        body2: BodyId,
        local: bool,
        p1: DVec3,
        z1: DVec3,
        p2: DVec3,
        x2: DVec3,
        y2: DVec3,
        auto_distance: bool,
        distance: f64,
    ) -> KinefemResult<Self> {
        if body1 == body2 {
            return Err(KinefemError::InvalidConfig(
                "revolute-translational joint needs two distinct bodies".into(),
            ));
        }
        let f1 = state.body(body1)?.frame;
        let f2 = state.body(body2)?.frame;

        let (p1, z1, p2, x2, y2) = if local {
            (p1, z1, p2, x2, y2)
        } else {
            (
                f1.transform_point_parent_to_local(p1),
                f1.transform_direction_parent_to_local(z1),
                f2.transform_point_parent_to_local(p2),
                f2.transform_direction_parent_to_local(x2),
                f2.transform_direction_parent_to_local(y2),
            )
        };

        let mut joint = Self {
            rows: ConstraintRows::new(
                "revolute_translational",
                vec![DofHolder::Body(body1), DofHolder::Body(body2)],
                4,
            ),
            body1,
            body2,
            p1,
            z1: unit(z1, "revolute axis")?,
            p2,
            x2: unit(x2, "first guide direction")?,
            y2: unit(y2, "second guide direction")?,
            dist: distance,
            cur_par1: 0.0,
            cur_par2: 0.0,
            cur_dot: 0.0,
            cur_dist: 0.0,
            abs: AbsoluteGeometry {
                body1: f1,
                p1: DVec3::ZERO,
                z1: DVec3::Z,
                p2: DVec3::ZERO,
                x2: DVec3::X,
                y2: DVec3::Y,
            },
            scaled_multipliers: [0.0; 4],
            reaction1: Wrench::ZERO,
            reaction2: Wrench::ZERO,
        };

        joint.update(state.time, state)?;
        if auto_distance {
            joint.dist = joint.cur_dist;
            joint.rows.set_violation(3, 0.0);
        }
        Ok(joint)
    }

    pub fn body1(&self) -> BodyId {
        self.body1
    }

    pub fn body2(&self) -> BodyId {
        self.body2
    }

    /// Imposed distance between the two axes.
    pub fn imposed_distance(&self) -> f64 {
        self.dist
    }

    /// Current distance between the axes, measured along x2.
    pub fn current_distance(&self) -> f64 {
        self.cur_dist
    }

    pub fn point1_abs(&self) -> DVec3 {
        self.abs.p1
    }

    pub fn dir_z1_abs(&self) -> DVec3 {
        self.abs.z1
    }

    pub fn point2_abs(&self) -> DVec3 {
        self.abs.p2
    }

    pub fn dir_x2_abs(&self) -> DVec3 {
        self.abs.x2
    }

    pub fn dir_y2_abs(&self) -> DVec3 {
        self.abs.y2
    }

    /// Link frame on body 1: origin p1, Z along the revolute axis, X toward
    /// the guide point.
    pub fn frame1_rel(&self) -> Frame {
        let toward = self
            .abs
            .body1
            .transform_direction_parent_to_local(self.abs.p2 - self.abs.p1);
        Frame::from_z_and_x_hint(self.p1, self.z1, toward)
    }

    /// Link frame on body 2: origin p2, X along x2, Y along y2.
    pub fn frame2_rel(&self) -> Frame {
        Frame::from_z_and_x_hint(self.p2, self.x2.cross(self.y2), self.x2)
    }

    /// Multipliers scaled by the last `fetch_reactions` factor.
    pub fn scaled_multipliers(&self) -> [f64; 4] {
        self.scaled_multipliers
    }

    /// Reaction on body 1 (Jᵀλ): absolute frame, torque about the body origin.
    ///
    /// TODO: decompose in the link frame once the joint frame convention for
    /// reactions is settled.
    pub fn reaction1(&self) -> Wrench {
        self.reaction1
    }

    /// Reaction on body 2 (Jᵀλ): absolute frame, torque about the body origin.
    pub fn reaction2(&self) -> Wrench {
        self.reaction2
    }
}

impl Contributor for RevoluteTranslational {
    fn name(&self) -> &str {
        self.rows.name()
    }

    fn update(&mut self, _time: f64, state: &SystemState) -> KinefemResult<()> {
        let f1 = state.body(self.body1)?.frame;
        let f2 = state.body(self.body2)?.frame;

        let p1 = f1.transform_point_local_to_parent(self.p1);
        let z1 = f1.transform_direction_local_to_parent(self.z1);
        let p2 = f2.transform_point_local_to_parent(self.p2);
        let x2 = f2.transform_direction_local_to_parent(self.x2);
        let y2 = f2.transform_direction_local_to_parent(self.y2);
        self.abs = AbsoluteGeometry {
            body1: f1,
            p1,
            z1,
            p2,
            x2,
            y2,
        };

        let d12 = p2 - p1;
        self.cur_par1 = z1.dot(x2);
        self.cur_par2 = z1.dot(y2);
        self.cur_dot = d12.dot(z1);
        self.cur_dist = d12.dot(x2);

        let r1 = p1 - f1.position;
        let r2 = p2 - f2.position;
        let join = |v: DVec3, w: DVec3| -> [f64; 6] { [v.x, v.y, v.z, w.x, w.y, w.z] };

        // z1 ⟂ x2
        let zx = z1.cross(x2);
        self.rows.set_jacobian(0, 0, &join(DVec3::ZERO, zx));
        self.rows.set_jacobian(0, 1, &join(DVec3::ZERO, -zx));
        self.rows.set_violation(0, self.cur_par1);

        // z1 ⟂ y2
        let zy = z1.cross(y2);
        self.rows.set_jacobian(1, 0, &join(DVec3::ZERO, zy));
        self.rows.set_jacobian(1, 1, &join(DVec3::ZERO, -zy));
        self.rows.set_violation(1, self.cur_par2);

        // d12 ⟂ z1
        self.rows
            .set_jacobian(2, 0, &join(-z1, -r1.cross(z1) + z1.cross(d12)));
        self.rows.set_jacobian(2, 1, &join(z1, r2.cross(z1)));
        self.rows.set_violation(2, self.cur_dot);

        // d12·x2 = dist
        self.rows.set_jacobian(3, 0, &join(-x2, -r1.cross(x2)));
        self.rows
            .set_jacobian(3, 1, &join(x2, r2.cross(x2) + x2.cross(d12)));
        self.rows.set_violation(3, self.cur_dist - self.dist);

        Ok(())
    }
}

impl ConstraintContributor for RevoluteTranslational {
    fn rows(&self) -> &ConstraintRows {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut ConstraintRows {
        &mut self.rows
    }

    fn fetch_reactions(&mut self, factor: f64) {
        for (slot, row) in self.scaled_multipliers.iter_mut().zip(self.rows.iter()) {
            *slot = row.multiplier * factor;
        }
        let [r1, r2] = [0, 1].map(|body| {
            let mut g = [0.0; 6];
            for row in self.rows.iter() {
                for (out, j) in g.iter_mut().zip(row.blocks[body].as_slice()) {
                    *out += j * row.multiplier * factor;
                }
            }
            Wrench::from_generalized(&g)
        });
        self.reaction1 = r1;
        self.reaction2 = r2;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
