//! The layout pass: one immutable table per step mapping every free state
//! holder to its offset in the global velocity vector.
//!
//! Offsets are only meaningful for the epoch they were produced in. Rows
//! registered against an older epoch are rejected when used.

use kinefem_types::{BodyId, FieldNodeId, KinefemError, KinefemResult, NodeId, ShaftId};
use serde::{Deserialize, Serialize};

/// Handle to any object that owns degrees of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DofHolder {
    /// 3 translational DOFs.
    Node(NodeId),
    /// 1 scalar DOF.
    FieldNode(FieldNodeId),
    /// 1 rotational DOF.
    Shaft(ShaftId),
    /// 6 DOFs: linear then angular velocity, absolute frame.
    Body(BodyId),
}

impl DofHolder {
    /// Number of velocity DOFs carried by this kind of holder.
    #[inline]
    pub fn dof_count(&self) -> usize {
        match self {
            DofHolder::Node(_) => 3,
            DofHolder::FieldNode(_) | DofHolder::Shaft(_) => 1,
            DofHolder::Body(_) => 6,
        }
    }
}

/// Global offsets for one step.
#[derive(Debug, Clone, Default)]
pub struct DofLayout {
    epoch: u64,
    node_offsets: Vec<Option<usize>>,
    field_offsets: Vec<Option<usize>>,
    shaft_offsets: Vec<Option<usize>>,
    body_offsets: Vec<Option<usize>>,
    total_dofs: usize,
}

impl DofLayout {
    /// Builds a layout from per-table fixed flags. Free holders are packed in
    /// table order: nodes, field nodes, shafts, bodies.
    pub fn from_fixed_flags(
        epoch: u64,
        nodes: impl IntoIterator<Item = bool>,
        field_nodes: impl IntoIterator<Item = bool>,
        shafts: impl IntoIterator<Item = bool>,
        bodies: impl IntoIterator<Item = bool>,
    ) -> Self {
        fn assign(flags: impl IntoIterator<Item = bool>, dofs: usize, next: &mut usize) -> Vec<Option<usize>> {
            flags
                .into_iter()
                .map(|fixed| {
                    if fixed {
                        None
                    } else {
                        let offset = *next;
                        *next += dofs;
                        Some(offset)
                    }
                })
                .collect()
        }

        let mut next = 0usize;
        let node_offsets = assign(nodes, 3, &mut next);
        let field_offsets = assign(field_nodes, 1, &mut next);
        let shaft_offsets = assign(shafts, 1, &mut next);
        let body_offsets = assign(bodies, 6, &mut next);

        Self {
            epoch,
            node_offsets,
            field_offsets,
            shaft_offsets,
            body_offsets,
            total_dofs: next,
        }
    }

    /// Layout epoch; bumped by every layout pass.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Total number of free velocity DOFs.
    #[inline]
    pub fn total_dofs(&self) -> usize {
        self.total_dofs
    }

    /// Offset of `holder`, `None` when the holder is fixed.
    pub fn offset(&self, holder: DofHolder) -> KinefemResult<Option<usize>> {
        let (table, index) = match holder {
            DofHolder::Node(id) => (&self.node_offsets, id.index()),
            DofHolder::FieldNode(id) => (&self.field_offsets, id.index()),
            DofHolder::Shaft(id) => (&self.shaft_offsets, id.index()),
            DofHolder::Body(id) => (&self.body_offsets, id.index()),
        };
        table
            .get(index)
            .copied()
            .ok_or_else(|| KinefemError::UnknownHolder(format!("{holder:?} is not in the layout")))
    }

    /// Iterates over every free holder with its offset, in offset order.
    pub fn free_holders(&self) -> impl Iterator<Item = (DofHolder, usize)> + '_ {
        fn tagged<'a>(
            table: &'a [Option<usize>],
            make: fn(u32) -> DofHolder,
        ) -> impl Iterator<Item = (DofHolder, usize)> + 'a {
            table
                .iter()
                .enumerate()
                .filter_map(move |(i, off)| off.map(|o| (make(i as u32), o)))
        }

        tagged(&self.node_offsets, |i| DofHolder::Node(NodeId(i)))
            .chain(tagged(&self.field_offsets, |i| DofHolder::FieldNode(FieldNodeId(i))))
            .chain(tagged(&self.shaft_offsets, |i| DofHolder::Shaft(ShaftId(i))))
            .chain(tagged(&self.body_offsets, |i| DofHolder::Body(BodyId(i))))
    }
}
