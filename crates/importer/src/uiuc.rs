//! UIUC propeller database geometry files: a header line followed by
//! `r/R  c/R  beta` rows with the twist in degrees.

use std::path::Path;
use std::sync::Arc;

use rotor_airfoil::Airfoil;
use rotor_core::units::deg_to_rad;
use rotor_geometry::{Rotor, Section};

use crate::{ImportError, numeric_row, read_file};

pub fn read_uiuc_geometry<P: AsRef<Path>>(
    path: P,
    diameter: f64,
    blades: u32,
    airfoil: Arc<Airfoil>,
) -> Result<Rotor, ImportError> {
    let path = path.as_ref();
    let contents = read_file(path)?;
    parse_uiuc_geometry(
        &contents,
        diameter,
        blades,
        airfoil,
        &path.display().to_string(),
    )
}

/// Scale the non-dimensional stations by the tip radius `diameter / 2`.
pub fn parse_uiuc_geometry(
    contents: &str,
    diameter: f64,
    blades: u32,
    airfoil: Arc<Airfoil>,
    source_name: &str,
) -> Result<Rotor, ImportError> {
    let tip = 0.5 * diameter;
    let sections: Vec<Section> = contents
        .lines()
        .filter_map(numeric_row)
        .filter(|values| values.len() >= 3)
        .map(|values| {
            Section::new(
                values[1] * tip,
                deg_to_rad(values[2]),
                values[0] * tip,
                Arc::clone(&airfoil),
            )
        })
        .collect();

    if sections.is_empty() {
        return Err(ImportError::NoRows {
            source_name: source_name.to_string(),
        });
    }
    Ok(Rotor::new(diameter, blades, sections)?)
}
