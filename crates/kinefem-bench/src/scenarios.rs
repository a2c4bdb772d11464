//! Benchmark scenarios: a model recipe plus a stepper configuration.
//!
//! 1. **Differential**: three geared shafts, two of them driven
//! 2. **Slider**: a box held to ground by a revolute-translational joint
//! 3. **Tet column**: an elastic column clamped at its base, bending
//!    under its own weight
//! 4. **Phase drift**: a compliant planetary gear under constant torque

use std::sync::Arc;

use kinefem_constraint::{PlanetaryGear, RevoluteTranslational};
use kinefem_material::{ContinuumElastic, ElasticProperties, MaterialDatabase};
use kinefem_math::{DVec3, Frame};
use kinefem_mesh::generators::column;
use kinefem_solver::{Model, StepperConfig};
use kinefem_system::{RigidBody, Shaft, SystemState};
use kinefem_types::{KinefemError, KinefemResult};
use serde::{Deserialize, Serialize};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    Differential,
    RevoluteTranslational,
    TetColumn,
    PhaseDrift,
}

impl ScenarioKind {
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::Differential,
            ScenarioKind::RevoluteTranslational,
            ScenarioKind::TetColumn,
            ScenarioKind::PhaseDrift,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Differential => "differential",
            ScenarioKind::RevoluteTranslational => "revolute_translational",
            ScenarioKind::TetColumn => "tet_column",
            ScenarioKind::PhaseDrift => "phase_drift",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// A fully specified benchmark scenario.
///
/// Models own boxed contributors and are not cloneable, so a scenario keeps
/// the recipe and builds a fresh model for every run.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub config: StepperConfig,
    pub timesteps: u32,
    /// Solid material for mesh scenarios. Ignored by the others.
    pub material: Option<ElasticProperties>,
}

impl Scenario {
    /// `−2·ω₁ + ω₂ + ω₃ = 0` with shaft 1 held and shaft 2 driven at 5 rad/s.
    pub fn differential() -> Self {
        Self {
            kind: ScenarioKind::Differential,
            config: StepperConfig {
                gravity: [0.0; 3],
                ..Default::default()
            },
            timesteps: 1000,
            material: None,
        }
    }

    /// A 2 kg box one metre from a grounded anchor, spinning about Z while
    /// it slides down under gravity.
    pub fn revolute_translational() -> Self {
        Self {
            kind: ScenarioKind::RevoluteTranslational,
            config: StepperConfig::default(),
            timesteps: 500,
            material: None,
        }
    }

    /// 1 m rubber column of eight cells, clamped at z = 0, gravity along −Y.
    pub fn tet_column() -> Self {
        Self {
            kind: ScenarioKind::TetColumn,
            config: StepperConfig::default(),
            timesteps: 200,
            material: MaterialDatabase::with_defaults().get("rubber").cloned(),
        }
    }

    /// Planetary gear with ordinary ratio −1/4, soft rows and 300 N·m on the
    /// carrier.
    pub fn phase_drift() -> Self {
        Self {
            kind: ScenarioKind::PhaseDrift,
            config: StepperConfig {
                gravity: [0.0; 3],
                constraint_compliance: 1e-2,
                ..Default::default()
            },
            timesteps: 1000,
            material: None,
        }
    }

    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Differential => Self::differential(),
            ScenarioKind::RevoluteTranslational => Self::revolute_translational(),
            ScenarioKind::TetColumn => Self::tet_column(),
            ScenarioKind::PhaseDrift => Self::phase_drift(),
        }
    }

    /// Overrides the solid material.
    pub fn with_material(mut self, properties: ElasticProperties) -> Self {
        self.material = Some(properties);
        self
    }

    /// Builds the initial model.
    pub fn build_model(&self) -> KinefemResult<Model> {
        match self.kind {
            ScenarioKind::Differential => {
                let mut state = SystemState::new();
                let ids = [(); 3].map(|_| state.add_shaft(Shaft::new(1.0)));
                let mut gear = PlanetaryGear::initialize(&state, ids)?;
                gear.set_transmission_ratios(-2.0, 1.0, 1.0)?;
                state.shaft_mut(ids[0])?.fixed = true;
                let driven = state.shaft_mut(ids[1])?;
                driven.fixed = true;
                driven.vel = 5.0;
                let mut model = Model::new(state);
                model.add_constraint(Box::new(gear));
                Ok(model)
            }
            ScenarioKind::RevoluteTranslational => {
                let mut state = SystemState::new();
                let ground = state.add_body(RigidBody::ground(Frame::IDENTITY));
                let mut slider =
                    RigidBody::solid_box(Frame::from_position(DVec3::X), 2.0, DVec3::splat(0.1));
                slider.ang_vel = DVec3::Z;
                let body = state.add_body(slider);
                let joint = RevoluteTranslational::initialize_from_frame(
                    &state,
                    ground,
                    body,
                    &Frame::IDENTITY,
                    1.0,
                )?;
                let mut model = Model::new(state);
                model.add_constraint(Box::new(joint));
                Ok(model)
            }
            ScenarioKind::TetColumn => {
                let properties = self.material.clone().ok_or_else(|| {
                    KinefemError::InvalidConfig("tet_column needs a solid material".into())
                })?;
                let material = Arc::new(ContinuumElastic::from_properties(properties)?);
                let mut model = Model::default();
                let nodes = model.add_solid_mesh(&column(8, 0.1, 1.0), material)?;
                for id in nodes {
                    let node = model.state.node_mut(id)?;
                    if node.x0.z < 1e-9 {
                        node.fixed = true;
                    }
                }
                Ok(model)
            }
            ScenarioKind::PhaseDrift => {
                let mut state = SystemState::new();
                let ids = [(); 3].map(|_| state.add_shaft(Shaft::new(1.0)));
                let mut gear = PlanetaryGear::initialize(&state, ids)?;
                gear.set_transmission_ratio_ordinary(-0.25)?;
                state.shaft_mut(ids[2])?.torque = 300.0;
                let mut model = Model::new(state);
                model.add_constraint(Box::new(gear));
                Ok(model)
            }
        }
    }
}
