//! Material database with engineering presets.
//!
//! Values are typical room-temperature handbook figures, good enough for
//! scenarios and tests; they are not a substitute for a datasheet.

use std::collections::HashMap;

use crate::properties::ElasticProperties;

/// A named collection of material presets.
///
/// Materials are looked up by name (e.g., "steel", "rubber").
/// Custom materials can be registered at runtime.
#[derive(Debug, Clone)]
pub struct MaterialDatabase {
    materials: HashMap<String, ElasticProperties>,
}

impl MaterialDatabase {
    /// Creates a new database with the 5 built-in presets.
    pub fn with_defaults() -> Self {
        let mut db = Self::empty();

        db.register(steel());
        db.register(aluminium());
        db.register(rubber());
        db.register(concrete());
        db.register(abs_polymer());

        db
    }

    /// Creates an empty database.
    pub fn empty() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }

    /// Registers a material. Overwrites if the name already exists.
    pub fn register(&mut self, props: ElasticProperties) {
        self.materials.insert(props.name.clone(), props);
    }

    /// Looks up a material by name. Returns `None` if not found.
    pub fn get(&self, name: &str) -> Option<&ElasticProperties> {
        self.materials.get(name)
    }

    /// Returns all registered material names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns true if the database is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialDatabase {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ─── Built-in Presets ─────────────────────────────────────────────────

/// Structural steel (S235-ish).
fn steel() -> ElasticProperties {
    ElasticProperties {
        name: "steel".into(),
        youngs_modulus: 210.0e9,
        poisson_ratio: 0.30,
        density: 7850.0,
        rayleigh_alpha: 0.0,
        rayleigh_beta: 0.0,
    }
}

/// Wrought aluminium alloy (6061).
fn aluminium() -> ElasticProperties {
    ElasticProperties {
        name: "aluminium".into(),
        youngs_modulus: 69.0e9,
        poisson_ratio: 0.33,
        density: 2700.0,
        rayleigh_alpha: 0.0,
        rayleigh_beta: 0.0,
    }
}

/// Soft rubber, nearly incompressible. Lightly damped.
fn rubber() -> ElasticProperties {
    ElasticProperties {
        name: "rubber".into(),
        youngs_modulus: 5.0e6,
        poisson_ratio: 0.45,
        density: 1100.0,
        rayleigh_alpha: 0.1,
        rayleigh_beta: 1.0e-3,
    }
}

/// Normal-weight concrete.
fn concrete() -> ElasticProperties {
    ElasticProperties {
        name: "concrete".into(),
        youngs_modulus: 30.0e9,
        poisson_ratio: 0.20,
        density: 2400.0,
        rayleigh_alpha: 0.0,
        rayleigh_beta: 0.0,
    }
}

/// ABS thermoplastic.
fn abs_polymer() -> ElasticProperties {
    ElasticProperties {
        name: "abs_polymer".into(),
        youngs_modulus: 2.3e9,
        poisson_ratio: 0.35,
        density: 1050.0,
        rayleigh_alpha: 0.0,
        rayleigh_beta: 0.0,
    }
}
