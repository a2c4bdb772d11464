//! # kinefem-bench
//!
//! Benchmark suite for the kinefem kernel.
//!
//! Four procedural scenarios (gear train, planar joint, elastic column,
//! planetary phase drift), metric collection, and CSV/JSON export for
//! regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};
