//! Stepper configuration.
//!
//! Step size, gravity, constraint stabilization and Newton tolerances.
//! Round-trips through TOML.

use std::path::Path;

use kinefem_math::DVec3;
use kinefem_types::constants::{DEFAULT_DT, DEFAULT_RECOVERY_CLAMP, GRAVITY};
use kinefem_types::{KinefemError, KinefemResult};
use serde::{Deserialize, Serialize};

/// Configuration shared by the time stepper and the static solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepperConfig {
    /// Integration step (seconds).
    pub dt: f64,

    /// Gravity [gx, gy, gz] in m/s².
    pub gravity: [f64; 3],

    /// Fraction of the position violation removed per step. The bias
    /// loaded into each row is `baumgarte_factor / dt · C`.
    pub baumgarte_factor: f64,

    /// Bound on the stabilization bias when `do_clamp` is set.
    pub recovery_clamp: f64,

    pub do_clamp: bool,

    /// Diagonal regularization added to the Schur complement.
    pub constraint_compliance: f64,

    /// Newton iteration cap for static solves.
    pub max_newton_iterations: u32,

    /// Newton stops once the largest correction falls below this.
    pub newton_tolerance: f64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            gravity: [0.0, -GRAVITY, 0.0],
            baumgarte_factor: 0.2,
            recovery_clamp: DEFAULT_RECOVERY_CLAMP,
            do_clamp: true,
            constraint_compliance: 1e-10,
            max_newton_iterations: 20,
            newton_tolerance: 1e-10,
        }
    }
}

impl StepperConfig {
    /// Coarse steps and loose tolerances for quick looks.
    pub fn debug() -> Self {
        Self {
            dt: 1e-2,
            max_newton_iterations: 5,
            newton_tolerance: 1e-6,
            ..Default::default()
        }
    }

    /// Small steps, stronger drift correction, no clamping. For stiff
    /// materials and tightly coupled mechanisms.
    pub fn stiff() -> Self {
        Self {
            dt: 1e-4,
            baumgarte_factor: 0.5,
            do_clamp: false,
            constraint_compliance: 0.0,
            max_newton_iterations: 50,
            newton_tolerance: 1e-12,
            ..Default::default()
        }
    }

    pub fn gravity_vec(&self) -> DVec3 {
        DVec3::from_array(self.gravity)
    }

    pub fn validate(&self) -> KinefemResult<()> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(KinefemError::InvalidConfig(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if !(0.0..=1.0).contains(&self.baumgarte_factor) {
            return Err(KinefemError::InvalidConfig(format!(
                "baumgarte_factor must lie in [0, 1], got {}",
                self.baumgarte_factor
            )));
        }
        if self.recovery_clamp < 0.0 {
            return Err(KinefemError::InvalidConfig(format!(
                "recovery_clamp must be non-negative, got {}",
                self.recovery_clamp
            )));
        }
        if self.constraint_compliance < 0.0 {
            return Err(KinefemError::InvalidConfig(format!(
                "constraint_compliance must be non-negative, got {}",
                self.constraint_compliance
            )));
        }
        if self.newton_tolerance <= 0.0 {
            return Err(KinefemError::InvalidConfig(format!(
                "newton_tolerance must be positive, got {}",
                self.newton_tolerance
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> KinefemResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| KinefemError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> KinefemResult<String> {
        toml::to_string_pretty(self).map_err(|e| KinefemError::Serialization(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> KinefemResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> KinefemResult<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
