//! Force/torque pairs.

use std::ops::{Add, Neg};

use kinefem_math::DVec3;
use serde::{Deserialize, Serialize};

/// A force and a torque, both expressed in the same frame. The torque is
/// taken about the origin of the body the wrench acts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wrench {
    pub force: DVec3,
    pub torque: DVec3,
}

impl Wrench {
    pub const ZERO: Self = Self {
        force: DVec3::ZERO,
        torque: DVec3::ZERO,
    };

    pub fn new(force: DVec3, torque: DVec3) -> Self {
        Self { force, torque }
    }

    /// Splits a 6-DOF generalized vector `[f, τ]`.
    pub fn from_generalized(g: &[f64; 6]) -> Self {
        Self {
            force: DVec3::new(g[0], g[1], g[2]),
            torque: DVec3::new(g[3], g[4], g[5]),
        }
    }
}

impl Add for Wrench {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            force: self.force + rhs.force,
            torque: self.torque + rhs.torque,
        }
    }
}

impl Neg for Wrench {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            force: -self.force,
            torque: -self.torque,
        }
    }
}
