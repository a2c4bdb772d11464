//! # kinefem-constraint
//!
//! Concrete bilateral constraints built on
//! [`ConstraintRows`](kinefem_system::ConstraintRows) and the
//! [`ConstraintContributor`](kinefem_system::ConstraintContributor) protocol.
//!
//! - [`RevoluteTranslational`]: 4 rows between two rigid bodies: a revolute
//!   axis on body 1 and a translational guide on body 2 kept at a fixed
//!   distance
//! - [`PlanetaryGear`]: 1 row `r1·ω1 + r2·ω2 + r3·ω3 = 0` between three
//!   shafts, optionally corrected at the position level

pub mod planetary;
pub mod revolute_translational;
pub mod wrench;

pub use planetary::PlanetaryGear;
pub use revolute_translational::RevoluteTranslational;
pub use wrench::Wrench;
