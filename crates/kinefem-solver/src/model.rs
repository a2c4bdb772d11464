//! The model: state tables plus the contributors acting on them.

use std::collections::HashMap;
use std::sync::Arc;

use kinefem_fea::builder::{add_field_mesh, add_solid_mesh};
use kinefem_material::{ElasticityOperator, PoissonMaterial};
use kinefem_mesh::TetMesh;
use kinefem_system::{ConstraintContributor, DofHolder, ElementContributor, SystemState};
use kinefem_types::{FieldNodeId, KinefemError, KinefemResult, NodeId};

/// Index of an element inside its [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub usize);

/// Index of a constraint inside its [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintHandle(pub usize);

/// Everything one stepper drives.
///
/// The state is public: hosts set initial conditions, fix holders and read
/// results directly. Contributors are owned by the model and reached through
/// handles.
#[derive(Default)]
pub struct Model {
    pub state: SystemState,
    elements: Vec<Box<dyn ElementContributor>>,
    constraints: Vec<Box<dyn ConstraintContributor>>,
}

impl Model {
    pub fn new(state: SystemState) -> Self {
        Self {
            state,
            elements: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Adds an element, running its setup against the current state.
    pub fn add_element(
        &mut self,
        mut element: Box<dyn ElementContributor>,
    ) -> KinefemResult<ElementHandle> {
        element.setup_initial(&self.state)?;
        self.elements.push(element);
        Ok(ElementHandle(self.elements.len() - 1))
    }

    pub fn add_constraint(&mut self, constraint: Box<dyn ConstraintContributor>) -> ConstraintHandle {
        self.constraints.push(constraint);
        ConstraintHandle(self.constraints.len() - 1)
    }

    /// Adds one node per vertex and one corotational tetrahedron per cell.
    /// Returns the node of every vertex, by vertex index.
    pub fn add_solid_mesh(
        &mut self,
        mesh: &TetMesh,
        material: Arc<dyn ElasticityOperator>,
    ) -> KinefemResult<Vec<NodeId>> {
        let solid = add_solid_mesh(&mut self.state, mesh, material)?;
        for element in solid.elements {
            self.elements.push(Box::new(element));
        }
        Ok(solid.nodes)
    }

    /// Adds one field node per vertex, all starting at `initial`, and one
    /// scalar tetrahedron per cell.
    pub fn add_field_mesh(
        &mut self,
        mesh: &TetMesh,
        material: Arc<PoissonMaterial>,
        initial: f64,
    ) -> KinefemResult<Vec<FieldNodeId>> {
        let field = add_field_mesh(&mut self.state, mesh, material, initial)?;
        for element in field.elements {
            self.elements.push(Box::new(element));
        }
        Ok(field.nodes)
    }

    pub fn element(&self, handle: ElementHandle) -> KinefemResult<&dyn ElementContributor> {
        self.elements
            .get(handle.0)
            .map(|e| e.as_ref())
            .ok_or_else(|| KinefemError::UnknownHolder(format!("element {}", handle.0)))
    }

    pub fn constraint(&self, handle: ConstraintHandle) -> KinefemResult<&dyn ConstraintContributor> {
        self.constraints
            .get(handle.0)
            .map(|c| c.as_ref())
            .ok_or_else(|| KinefemError::UnknownHolder(format!("constraint {}", handle.0)))
    }

    pub fn constraint_mut(
        &mut self,
        handle: ConstraintHandle,
    ) -> KinefemResult<&mut (dyn ConstraintContributor + 'static)> {
        self.constraints
            .get_mut(handle.0)
            .map(|c| c.as_mut())
            .ok_or_else(|| KinefemError::UnknownHolder(format!("constraint {}", handle.0)))
    }

    /// The constraint behind `handle` as its concrete type.
    pub fn constraint_as<T: ConstraintContributor + 'static>(
        &self,
        handle: ConstraintHandle,
    ) -> KinefemResult<&T> {
        self.constraint(handle)?.as_any().downcast_ref::<T>().ok_or_else(|| {
            KinefemError::InvalidConfig(format!("constraint {} has another type", handle.0))
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = &dyn ElementContributor> + '_ {
        self.elements.iter().map(|e| e.as_ref())
    }

    pub fn constraints(&self) -> impl Iterator<Item = &dyn ConstraintContributor> + '_ {
        self.constraints.iter().map(|c| c.as_ref())
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Read-only state next to mutable constraints, for the bias and
    /// scatter phases.
    pub(crate) fn split_constraints(
        &mut self,
    ) -> (&SystemState, &mut [Box<dyn ConstraintContributor>]) {
        (&self.state, &mut self.constraints)
    }

    /// Runs `update` on every element, then on every constraint.
    pub fn update_all(&mut self) -> KinefemResult<()> {
        let time = self.state.time;
        for element in &mut self.elements {
            element.update(time, &self.state)?;
        }
        for constraint in &mut self.constraints {
            constraint.update(time, &self.state)?;
        }
        Ok(())
    }

    /// Largest position-level violation over all active constraints, as of
    /// the last `update`.
    pub fn max_violation(&self) -> f64 {
        self.constraints
            .iter()
            .filter(|c| c.is_active())
            .flat_map(|c| c.violation())
            .fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Lumped mass of every node touched by an element.
    pub fn node_masses(&self) -> HashMap<NodeId, f64> {
        let mut masses = HashMap::new();
        for element in &self.elements {
            let m = element.nodal_mass();
            for n in 0..element.num_nodes() {
                if let DofHolder::Node(id) = element.sub_block(n) {
                    *masses.entry(id).or_insert(0.0) += m;
                }
            }
        }
        masses
    }

    /// ½·vᵀM v over nodes (lumped element masses), shafts and bodies.
    pub fn kinetic_energy(&self) -> KinefemResult<f64> {
        let mut energy = 0.0;
        for (id, m) in self.node_masses() {
            energy += 0.5 * m * self.state.node(id)?.vel.length_squared();
        }
        for shaft in &self.state.shafts {
            energy += 0.5 * shaft.inertia * shaft.vel * shaft.vel;
        }
        for body in &self.state.bodies {
            energy += 0.5 * body.mass * body.lin_vel.length_squared();
            energy += 0.5 * body.ang_vel.dot(body.world_inertia() * body.ang_vel);
        }
        Ok(energy)
    }

    /// Sum of the elements' stored energies.
    pub fn elastic_energy(&self) -> KinefemResult<f64> {
        let mut energy = 0.0;
        for element in &self.elements {
            energy += element.strain_energy(&self.state)?;
        }
        Ok(energy)
    }
}
