//! Physical constants and numerical defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Default integration timestep (seconds).
pub const DEFAULT_DT: f64 = 1.0e-3;

/// Default clamp on the stabilization bias (m/s or rad/s equivalent).
pub const DEFAULT_RECOVERY_CLAMP: f64 = 0.1;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1.0e-12;

/// Signed tetrahedron volumes at or below this value are rejected at setup.
pub const DEGENERATE_VOLUME_THRESHOLD: f64 = 1.0e-14;

/// Singular values below this are treated as collapsed directions
/// by the polar decomposition.
pub const DEGENERATE_STRETCH_THRESHOLD: f64 = 1.0e-12;

/// Ordinary ratios closer than this to 1 make a planetary gear singular.
pub const SINGULAR_RATIO_TOLERANCE: f64 = 1.0e-9;
