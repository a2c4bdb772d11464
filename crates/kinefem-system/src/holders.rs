//! State holders: the externally owned objects that carry degrees of freedom.
//!
//! Elements and constraints read these through [`SystemState`](crate::SystemState)
//! and never own them.

use kinefem_math::{DMat3, DVec3, Frame};
use serde::{Deserialize, Serialize};

/// A 3-DOF finite element node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Reference (undeformed) position.
    pub x0: DVec3,
    /// Current position.
    pub pos: DVec3,
    /// Current velocity.
    pub vel: DVec3,
    /// Applied external force.
    pub force: DVec3,
    /// Extra lumped point mass, added on top of element masses.
    pub mass: f64,
    /// Fixed nodes take no part in the layout.
    pub fixed: bool,
}

impl Node {
    /// Creates a free node at rest at its reference position.
    pub fn new(x0: DVec3) -> Self {
        Self {
            x0,
            pos: x0,
            vel: DVec3::ZERO,
            force: DVec3::ZERO,
            mass: 0.0,
            fixed: false,
        }
    }

    /// Creates a fixed node.
    pub fn fixed(x0: DVec3) -> Self {
        Self {
            fixed: true,
            ..Self::new(x0)
        }
    }

    /// Current displacement from the reference position.
    pub fn displacement(&self) -> DVec3 {
        self.pos - self.x0
    }
}

/// A 1-DOF node of a scalar field (temperature, potential, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    /// Spatial position. Never moves.
    pub position: DVec3,
    /// Field value P.
    pub p: f64,
    /// Rate dP/dt.
    pub p_dt: f64,
    /// Applied source term.
    pub source: f64,
    pub fixed: bool,
}

impl FieldNode {
    pub fn new(position: DVec3, p: f64) -> Self {
        Self {
            position,
            p,
            p_dt: 0.0,
            source: 0.0,
            fixed: false,
        }
    }
}

/// A 1-DOF rotating shaft.
///
/// A fixed shaft keeps its velocity as a prescribed motion: constraints
/// referencing it see that speed as a known term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shaft {
    /// Rotation angle [rad].
    pub pos: f64,
    /// Angular speed [rad/s].
    pub vel: f64,
    /// Rotational inertia [kg·m²].
    pub inertia: f64,
    /// Applied torque [N·m].
    pub torque: f64,
    pub fixed: bool,
}

impl Shaft {
    pub fn new(inertia: f64) -> Self {
        Self {
            pos: 0.0,
            vel: 0.0,
            inertia,
            torque: 0.0,
            fixed: false,
        }
    }
}

/// A 6-DOF rigid body.
///
/// Velocity DOFs are ordered `[v, ω]`, both expressed in the absolute frame.
/// `frame.position` is the body origin, which is also its center of mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub frame: Frame,
    pub lin_vel: DVec3,
    /// Angular velocity in the absolute frame.
    pub ang_vel: DVec3,
    pub mass: f64,
    /// Inertia tensor about the origin, in body coordinates.
    pub inertia: DMat3,
    /// Applied force at the origin, absolute frame.
    pub force: DVec3,
    /// Applied torque, absolute frame.
    pub torque: DVec3,
    pub fixed: bool,
}

impl RigidBody {
    pub fn new(frame: Frame, mass: f64, inertia: DMat3) -> Self {
        Self {
            frame,
            lin_vel: DVec3::ZERO,
            ang_vel: DVec3::ZERO,
            mass,
            inertia,
            force: DVec3::ZERO,
            torque: DVec3::ZERO,
            fixed: false,
        }
    }

    /// A uniform solid box with half extents `half`.
    pub fn solid_box(frame: Frame, mass: f64, half: DVec3) -> Self {
        let (a, b, c) = (2.0 * half.x, 2.0 * half.y, 2.0 * half.z);
        let k = mass / 12.0;
        let inertia = DMat3::from_diagonal(DVec3::new(
            k * (b * b + c * c),
            k * (a * a + c * c),
            k * (a * a + b * b),
        ));
        Self::new(frame, mass, inertia)
    }

    /// A fixed body (ground).
    pub fn ground(frame: Frame) -> Self {
        Self {
            fixed: true,
            ..Self::new(frame, 1.0, DMat3::IDENTITY)
        }
    }

    /// Inertia tensor rotated into the absolute frame: R I Rᵀ.
    pub fn world_inertia(&self) -> DMat3 {
        let r = self.frame.rotation_matrix();
        r * self.inertia * r.transpose()
    }

    /// Absolute velocity of a point given in absolute coordinates.
    pub fn point_velocity(&self, p_abs: DVec3) -> DVec3 {
        self.lin_vel + self.ang_vel.cross(p_abs - self.frame.position)
    }
}
