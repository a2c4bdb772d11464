//! # kinefem-telemetry
//!
//! Event bus for step telemetry. The stepper emits structured events
//! (step timing, constraint drift, reactions, energy) that pluggable sinks
//! consume: an in-memory [`VecSink`] for tests and tools, and a
//! [`TracingSink`] that forwards everything to `tracing`.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::{EventBus, StepTally};
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
