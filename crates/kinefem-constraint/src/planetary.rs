//! Three-shaft planetary gear.
//!
//! Couples the angular speeds of a carrier and two wheels:
//!
//! ```text
//! r1·ω1 + r2·ω2 + r3·ω3 = 0
//! ```
//!
//! With phase-drift avoidance on (the default) the row also carries the
//! position error `Σ rᵢ(θᵢ − phaseᵢ)` against the phases captured at
//! `initialize`, so Baumgarte bias loading removes the angle that pure
//! velocity coupling would accumulate.

use kinefem_system::{ConstraintContributor, ConstraintRows, Contributor, DofHolder, SystemState};
use kinefem_types::constants::SINGULAR_RATIO_TOLERANCE;
use kinefem_types::{KinefemError, KinefemResult, ShaftId};

/// A 1-row kinematic coupling between three shafts.
#[derive(Debug, Clone)]
pub struct PlanetaryGear {
    rows: ConstraintRows,
    shafts: [ShaftId; 3],
    ratios: [f64; 3],
    phases: [f64; 3],
    avoid_phase_drift: bool,
    recapture_phases: bool,
    torque_react: f64,
}

impl PlanetaryGear {
    /// Connects three distinct shafts, capturing their current angles as
    /// reference phases. Ratios start at `(1, 1, 1)`.
    pub fn initialize(state: &SystemState, shafts: [ShaftId; 3]) -> KinefemResult<Self> {
        let [a, b, c] = shafts;
        if a == b || b == c || a == c {
            return Err(KinefemError::InvalidConfig(format!(
                "planetary gear needs three distinct shafts, got {}, {}, {}",
                a.0, b.0, c.0
            )));
        }
        let mut gear = Self {
            rows: ConstraintRows::new(
                "planetary",
                shafts.iter().map(|&s| DofHolder::Shaft(s)).collect(),
                1,
            ),
            shafts,
            ratios: [1.0; 3],
            phases: [0.0; 3],
            avoid_phase_drift: true,
            recapture_phases: false,
            torque_react: 0.0,
        };
        gear.capture_phases(state)?;
        gear.write_jacobian();
        Ok(gear)
    }

    pub fn shafts(&self) -> [ShaftId; 3] {
        self.shafts
    }

    /// Sets `r1`, `r2`, `r3` in `r1·ω1 + r2·ω2 + r3·ω3 = 0`.
    pub fn set_transmission_ratios(&mut self, r1: f64, r2: f64, r3: f64) -> KinefemResult<()> {
        if r1 == 0.0 && r2 == 0.0 && r3 == 0.0 {
            return Err(KinefemError::SingularConfiguration(
                "planetary ratios are all zero".into(),
            ));
        }
        self.ratios = [r1, r2, r3];
        self.write_jacobian();
        Ok(())
    }

    /// Sets the ratios from the speed ratio `t0 = ω3'/ω2'` of the ordinary
    /// gearbox obtained by holding the carrier (shaft 1) fixed.
    pub fn set_transmission_ratio_ordinary(&mut self, t0: f64) -> KinefemResult<()> {
        if (t0 - 1.0).abs() < SINGULAR_RATIO_TOLERANCE {
            return Err(KinefemError::SingularConfiguration(format!(
                "ordinary ratio t0 = {t0} leaves the carrier undetermined"
            )));
        }
        self.set_transmission_ratios(1.0 - t0, t0, -1.0)
    }

    /// Speed ratio of the equivalent ordinary gearbox, `−r2/r3`.
    pub fn transmission_ratio_ordinary(&self) -> f64 {
        -self.ratios[1] / self.ratios[2]
    }

    pub fn transmission_ratios(&self) -> [f64; 3] {
        self.ratios
    }

    pub fn r1(&self) -> f64 {
        self.ratios[0]
    }

    pub fn r2(&self) -> f64 {
        self.ratios[1]
    }

    pub fn r3(&self) -> f64 {
        self.ratios[2]
    }

    /// Turns the position-level correction on or off. Turning it back on
    /// recaptures the reference phases at the next `update`.
    pub fn avoid_phase_drift(&mut self, avoid: bool) {
        if avoid && !self.avoid_phase_drift {
            self.recapture_phases = true;
        }
        self.avoid_phase_drift = avoid;
        if !avoid {
            self.rows.set_violation(0, 0.0);
        }
    }

    pub fn is_avoiding_phase_drift(&self) -> bool {
        self.avoid_phase_drift
    }

    pub fn phases(&self) -> [f64; 3] {
        self.phases
    }

    /// A disabled gear registers no rows.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.rows.set_active(!disabled);
    }

    pub fn is_disabled(&self) -> bool {
        !self.rows.is_active()
    }

    /// Scaled multiplier from the last `fetch_reactions`.
    pub fn torque_react(&self) -> f64 {
        self.torque_react
    }

    pub fn reaction1(&self) -> f64 {
        self.ratios[0] * self.torque_react
    }

    pub fn reaction2(&self) -> f64 {
        self.ratios[1] * self.torque_react
    }

    pub fn reaction3(&self) -> f64 {
        self.ratios[2] * self.torque_react
    }

    fn capture_phases(&mut self, state: &SystemState) -> KinefemResult<()> {
        for (phase, &shaft) in self.phases.iter_mut().zip(&self.shafts) {
            *phase = state.shaft(shaft)?.pos;
        }
        self.recapture_phases = false;
        Ok(())
    }

    fn write_jacobian(&mut self) {
        for (k, &r) in self.ratios.iter().enumerate() {
            self.rows.set_jacobian(0, k, &[r]);
        }
    }
}

impl Contributor for PlanetaryGear {
    fn name(&self) -> &str {
        self.rows.name()
    }

    fn update(&mut self, _time: f64, state: &SystemState) -> KinefemResult<()> {
        if self.recapture_phases {
            self.capture_phases(state)?;
            tracing::debug!(phases = ?self.phases, "planetary phases recaptured");
        }
        self.write_jacobian();

        let violation = if self.avoid_phase_drift {
            let mut c = 0.0;
            for ((&r, &phase), &shaft) in self.ratios.iter().zip(&self.phases).zip(&self.shafts) {
                c += r * (state.shaft(shaft)?.pos - phase);
            }
            c
        } else {
            0.0
        };
        self.rows.set_violation(0, violation);
        Ok(())
    }
}

impl ConstraintContributor for PlanetaryGear {
    fn rows(&self) -> &ConstraintRows {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut ConstraintRows {
        &mut self.rows
    }

    fn fetch_reactions(&mut self, factor: f64) {
        self.torque_react = self.rows.row(0).multiplier * factor;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
