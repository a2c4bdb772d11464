//! Populates a system from a tetrahedral mesh.
//!
//! Mesh vertices become nodes in the state tables; cells become elements
//! that are already set up and ready to be handed to a model.

use std::sync::Arc;

use kinefem_material::{ElasticityOperator, PoissonMaterial};
use kinefem_mesh::TetMesh;
use kinefem_system::{ElementContributor, FieldNode, Node, SystemState};
use kinefem_types::{FieldNodeId, KinefemResult, NodeId};

use crate::tetra_corot::CorotationalTetra;
use crate::tetra_poisson::PoissonTetra;

/// Nodes and elements created from one solid mesh.
pub struct SolidMesh {
    /// Node handle of every mesh vertex, by vertex index.
    pub nodes: Vec<NodeId>,
    pub elements: Vec<CorotationalTetra>,
}

/// Nodes and elements created from one scalar-field mesh.
pub struct FieldMesh {
    pub nodes: Vec<FieldNodeId>,
    pub elements: Vec<PoissonTetra>,
}

/// Adds one free node per vertex and one corotational tetrahedron per cell.
pub fn add_solid_mesh(
    state: &mut SystemState,
    mesh: &TetMesh,
    material: Arc<dyn ElasticityOperator>,
) -> KinefemResult<SolidMesh> {
    mesh.validate()?;

    let nodes: Vec<NodeId> = mesh
        .positions
        .iter()
        .map(|p| state.add_node(Node::new(*p)))
        .collect();

    let mut elements = Vec::with_capacity(mesh.tet_count());
    for tet in &mesh.tets {
        let ids = tet.map(|v| nodes[v as usize]);
        let mut element = CorotationalTetra::new(ids, Arc::clone(&material))?;
        element.setup_initial(state)?;
        elements.push(element);
    }

    tracing::debug!(
        nodes = nodes.len(),
        elements = elements.len(),
        material = material.name(),
        "solid mesh added"
    );
    Ok(SolidMesh { nodes, elements })
}

/// Adds one field node per vertex (value `initial`) and one scalar
/// tetrahedron per cell.
pub fn add_field_mesh(
    state: &mut SystemState,
    mesh: &TetMesh,
    material: Arc<PoissonMaterial>,
    initial: f64,
) -> KinefemResult<FieldMesh> {
    mesh.validate()?;
    material.validate()?;

    let nodes: Vec<FieldNodeId> = mesh
        .positions
        .iter()
        .map(|p| state.add_field_node(FieldNode::new(*p, initial)))
        .collect();

    let mut elements = Vec::with_capacity(mesh.tet_count());
    for tet in &mesh.tets {
        let ids = tet.map(|v| nodes[v as usize]);
        let mut element = PoissonTetra::new(ids, Arc::clone(&material));
        element.setup_initial(state)?;
        elements.push(element);
    }

    Ok(FieldMesh { nodes, elements })
}
