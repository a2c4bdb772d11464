//! Strongly-typed handles for externally owned state holders.
//!
//! Elements and constraints never own the nodes, shafts or bodies they
//! couple; they keep one of these indices into the host's tables.

use serde::{Deserialize, Serialize};

/// Index into the 3-DOF node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Index into the 1-DOF scalar field node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldNodeId(pub u32);

/// Index into the shaft table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaftId(pub u32);

/// Index into the rigid body table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl NodeId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FieldNodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ShaftId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl BodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NodeId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for FieldNodeId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for ShaftId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for BodyId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}
