//! Propeller and rotor performance from blade-element / vortex theory.
//!
//! The workspace crates are re-exported here so front-ends and tests depend on a single
//! package. Case assembly from configuration files lives in [`case`].

pub mod case;

pub use rotor_airfoil as airfoil;
pub use rotor_config as config;
pub use rotor_core::{constants, interp, units};
pub use rotor_export as export;
pub use rotor_geometry as geometry;
pub use rotor_importer as importer;
pub use rotor_solver as solver;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
