//! Host-owned state tables.
//!
//! Contributors hold typed handles into these tables. During assembly the
//! tables are read-only; only the integrator writes them, between steps.

use kinefem_math::DVec3;
use kinefem_types::{BodyId, FieldNodeId, KinefemError, KinefemResult, NodeId, ShaftId};

use crate::holders::{FieldNode, Node, RigidBody, Shaft};
use crate::layout::{DofHolder, DofLayout};

/// All state holders of one simulated system.
#[derive(Debug, Clone, Default)]
pub struct SystemState {
    pub nodes: Vec<Node>,
    pub field_nodes: Vec<FieldNode>,
    pub shafts: Vec<Shaft>,
    pub bodies: Vec<RigidBody>,
    /// Simulation time [s].
    pub time: f64,
    epoch: u64,
}

macro_rules! table_access {
    ($get:ident, $get_mut:ident, $add:ident, $field:ident, $id:ident, $ty:ty, $label:literal) => {
        pub fn $add(&mut self, item: $ty) -> $id {
            self.$field.push(item);
            $id((self.$field.len() - 1) as u32)
        }

        pub fn $get(&self, id: $id) -> KinefemResult<&$ty> {
            self.$field
                .get(id.index())
                .ok_or_else(|| KinefemError::UnknownHolder(format!("{} {}", $label, id.0)))
        }

        pub fn $get_mut(&mut self, id: $id) -> KinefemResult<&mut $ty> {
            self.$field
                .get_mut(id.index())
                .ok_or_else(|| KinefemError::UnknownHolder(format!("{} {}", $label, id.0)))
        }
    };
}

impl SystemState {
    pub fn new() -> Self {
        Self::default()
    }

    table_access!(node, node_mut, add_node, nodes, NodeId, Node, "node");
    table_access!(field_node, field_node_mut, add_field_node, field_nodes, FieldNodeId, FieldNode, "field node");
    table_access!(shaft, shaft_mut, add_shaft, shafts, ShaftId, Shaft, "shaft");
    table_access!(body, body_mut, add_body, bodies, BodyId, RigidBody, "body");

    /// Epoch of the most recent layout pass (0 before the first one).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Runs the layout pass. Every call starts a new epoch, invalidating row
    /// offsets registered against earlier layouts.
    pub fn build_layout(&mut self) -> DofLayout {
        self.epoch += 1;
        let layout = DofLayout::from_fixed_flags(
            self.epoch,
            self.nodes.iter().map(|n| n.fixed),
            self.field_nodes.iter().map(|n| n.fixed),
            self.shafts.iter().map(|s| s.fixed),
            self.bodies.iter().map(|b| b.fixed),
        );
        tracing::debug!(
            epoch = self.epoch,
            dofs = layout.total_dofs(),
            "layout pass"
        );
        layout
    }

    /// Whether the holder is fixed (excluded from the layout).
    pub fn is_fixed(&self, holder: DofHolder) -> KinefemResult<bool> {
        Ok(match holder {
            DofHolder::Node(id) => self.node(id)?.fixed,
            DofHolder::FieldNode(id) => self.field_node(id)?.fixed,
            DofHolder::Shaft(id) => self.shaft(id)?.fixed,
            DofHolder::Body(id) => self.body(id)?.fixed,
        })
    }

    /// Velocity DOFs of a holder, zero-padded to 6.
    pub fn holder_velocity(&self, holder: DofHolder) -> KinefemResult<[f64; 6]> {
        let mut v = [0.0; 6];
        match holder {
            DofHolder::Node(id) => {
                let n = self.node(id)?;
                v[..3].copy_from_slice(&n.vel.to_array());
            }
            DofHolder::FieldNode(id) => v[0] = self.field_node(id)?.p_dt,
            DofHolder::Shaft(id) => v[0] = self.shaft(id)?.vel,
            DofHolder::Body(id) => {
                let b = self.body(id)?;
                v[..3].copy_from_slice(&b.lin_vel.to_array());
                v[3..].copy_from_slice(&b.ang_vel.to_array());
            }
        }
        Ok(v)
    }

    /// Writes the velocity DOFs of a holder from the front of `v`.
    pub fn set_holder_velocity(&mut self, holder: DofHolder, v: &[f64]) -> KinefemResult<()> {
        if v.len() < holder.dof_count() {
            return Err(KinefemError::DimensionMismatch(format!(
                "{holder:?} needs {} values, got {}",
                holder.dof_count(),
                v.len()
            )));
        }
        match holder {
            DofHolder::Node(id) => self.node_mut(id)?.vel = DVec3::new(v[0], v[1], v[2]),
            DofHolder::FieldNode(id) => self.field_node_mut(id)?.p_dt = v[0],
            DofHolder::Shaft(id) => self.shaft_mut(id)?.vel = v[0],
            DofHolder::Body(id) => {
                let b = self.body_mut(id)?;
                b.lin_vel = DVec3::new(v[0], v[1], v[2]);
                b.ang_vel = DVec3::new(v[3], v[4], v[5]);
            }
        }
        Ok(())
    }

    /// Gathers all free velocities into a global vector laid out by `layout`.
    pub fn gather_velocities(&self, layout: &DofLayout) -> KinefemResult<Vec<f64>> {
        let mut out = vec![0.0; layout.total_dofs()];
        for (holder, offset) in layout.free_holders() {
            let v = self.holder_velocity(holder)?;
            let n = holder.dof_count();
            out[offset..offset + n].copy_from_slice(&v[..n]);
        }
        Ok(out)
    }

    /// Scatters a global velocity vector back into the free holders.
    pub fn scatter_velocities(&mut self, layout: &DofLayout, v: &[f64]) -> KinefemResult<()> {
        if v.len() != layout.total_dofs() {
            return Err(KinefemError::DimensionMismatch(format!(
                "velocity vector has {} entries, layout has {}",
                v.len(),
                layout.total_dofs()
            )));
        }
        let free: Vec<(DofHolder, usize)> = layout.free_holders().collect();
        for (holder, offset) in free {
            self.set_holder_velocity(holder, &v[offset..offset + holder.dof_count()])?;
        }
        Ok(())
    }
}
