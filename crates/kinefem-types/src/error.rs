//! Error types for the kinefem kernel.
//!
//! All crates return `KinefemResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the kinefem kernel.
#[derive(Debug, Error)]
pub enum KinefemError {
    /// Element geometry is degenerate or inverted (non-positive volume,
    /// singular edge matrix). Fatal for the element.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A configuration that makes the kinematic relation singular.
    #[error("Singular configuration: {0}")]
    SingularConfiguration(String),

    /// A contributor was assembled before it was injected into a descriptor.
    #[error("Contributor '{0}' used before registration with a system descriptor")]
    Unregistered(String),

    /// A contributor holds offsets assigned by an older layout pass.
    #[error("Contributor '{name}' holds offsets from layout epoch {held}, current epoch is {current}")]
    StaleLayout {
        name: String,
        held: u64,
        current: u64,
    },

    /// Material parameter is out of valid range.
    #[error("Invalid material parameter: {0}")]
    InvalidMaterial(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A handle does not refer to an entry of the state tables.
    #[error("Unknown state holder: {0}")]
    UnknownHolder(String),

    /// Buffer or matrix sizes do not agree.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The linear solve (factorization or back-substitution) failed.
    #[error("Linear solve failed: {0}")]
    SolverFailure(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A kernel invariant was violated (e.g. element used before setup).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias for `Result<T, KinefemError>`.
pub type KinefemResult<T> = Result<T, KinefemError>;
