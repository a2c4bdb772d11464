//! Rigid coordinate frames.
//!
//! A [`Frame`] is a position plus a unit quaternion. Bodies store their pose
//! as a frame, and joints keep their anchors in body-local coordinates and
//! map them to the absolute frame every step.

use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// A rigid transform: `x_parent = position + rotation * x_local`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Origin of the frame, in parent coordinates.
    pub position: DVec3,
    /// Orientation of the frame (unit quaternion).
    pub rotation: DQuat,
}

impl Frame {
    /// The identity frame.
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    /// Creates a frame from a position and a rotation.
    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated frame at `position`.
    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Builds a frame whose Z axis is `z_dir` and whose X axis is the part of
    /// `x_hint` orthogonal to it. Falls back to an arbitrary X when the two
    /// directions are parallel.
    pub fn from_z_and_x_hint(position: DVec3, z_dir: DVec3, x_hint: DVec3) -> Self {
        let z = z_dir.normalize();
        let x = (x_hint - z * z.dot(x_hint))
            .try_normalize()
            .unwrap_or_else(|| z.any_orthonormal_vector());
        let y = z.cross(x);
        let rotation = DQuat::from_mat3(&DMat3::from_cols(x, y, z)).normalize();
        Self { position, rotation }
    }

    /// Maps a point from local to parent coordinates.
    #[inline]
    pub fn transform_point_local_to_parent(&self, p: DVec3) -> DVec3 {
        self.position + self.rotation * p
    }

    /// Maps a point from parent to local coordinates.
    #[inline]
    pub fn transform_point_parent_to_local(&self, p: DVec3) -> DVec3 {
        self.rotation.conjugate() * (p - self.position)
    }

    /// Maps a direction from local to parent coordinates.
    #[inline]
    pub fn transform_direction_local_to_parent(&self, d: DVec3) -> DVec3 {
        self.rotation * d
    }

    /// Maps a direction from parent to local coordinates.
    #[inline]
    pub fn transform_direction_parent_to_local(&self, d: DVec3) -> DVec3 {
        self.rotation.conjugate() * d
    }

    /// Rotation as a 3×3 matrix.
    #[inline]
    pub fn rotation_matrix(&self) -> DMat3 {
        DMat3::from_quat(self.rotation)
    }

    pub fn axis_x(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    pub fn axis_y(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    pub fn axis_z(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    /// Returns `self ∘ child`: the child frame expressed in this frame's parent.
    pub fn compose(&self, child: &Frame) -> Frame {
        Frame {
            position: self.transform_point_local_to_parent(child.position),
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    /// Inverse transform.
    pub fn inverse(&self) -> Frame {
        let inv = self.rotation.conjugate();
        Frame {
            position: -(inv * self.position),
            rotation: inv,
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}
