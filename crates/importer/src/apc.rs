//! APC `PE0` geometry files.
//!
//! Stations are read from the table that follows the `STATION ... MAX-THICK` header.
//! Consecutive stations are averaged into panels whose widths drive the panel
//! quadrature of the solver.

use std::path::Path;
use std::sync::Arc;

use rotor_airfoil::Airfoil;
use rotor_core::units::{deg_to_rad, inch_to_m};
use rotor_geometry::{Rotor, Section};

use crate::{ImportError, numeric_row, read_file};

const TABLE_COLUMNS: usize = 13;
const RADIUS_COL: usize = 0;
const CHORD_COL: usize = 1;
const TWIST_COL: usize = 7;

pub fn read_apc_geometry<P: AsRef<Path>>(
    path: P,
    airfoil: Arc<Airfoil>,
) -> Result<Rotor, ImportError> {
    let path = path.as_ref();
    let contents = read_file(path)?;
    parse_apc_geometry(&contents, airfoil, &path.display().to_string())
}

/// Parse a `PE0` file. Every section uses `airfoil`; the diameter is twice the last
/// tabulated radius.
pub fn parse_apc_geometry(
    contents: &str,
    airfoil: Arc<Airfoil>,
    source_name: &str,
) -> Result<Rotor, ImportError> {
    let mut blades = None;
    let mut in_table = false;
    let mut table_found = false;
    let mut previous: Option<(f64, f64, f64)> = None;
    let mut tip_radius = 0.0;
    let mut sections = Vec::new();

    for line in contents.lines() {
        if blades.is_none() {
            blades = parse_blades(line, source_name)?;
        }

        if !table_found {
            if line.contains("STATION") && line.contains("MAX-THICK") {
                in_table = true;
                table_found = true;
            }
            continue;
        }
        if !in_table || line.trim().is_empty() || is_units_line(line) {
            continue;
        }

        let Some(values) = numeric_row(line) else {
            in_table = false;
            continue;
        };
        if values.len() != TABLE_COLUMNS {
            continue;
        }

        let radius = inch_to_m(values[RADIUS_COL]);
        let chord = inch_to_m(values[CHORD_COL]);
        let twist = deg_to_rad(values[TWIST_COL]);
        if let Some((r_prev, c_prev, beta_prev)) = previous {
            let section = Section::new(
                0.5 * (chord + c_prev),
                0.5 * (twist + beta_prev),
                0.5 * (radius + r_prev),
                Arc::clone(&airfoil),
            )
            .with_width(radius - r_prev);
            sections.push(section);
            tip_radius = radius;
        }
        previous = Some((radius, chord, twist));
    }

    if !table_found {
        return Err(ImportError::MissingTable {
            source_name: source_name.to_string(),
            header: "STATION MAX-THICK",
        });
    }
    if sections.is_empty() {
        return Err(ImportError::NoRows {
            source_name: source_name.to_string(),
        });
    }
    let blades = blades.ok_or_else(|| ImportError::MissingBladeCount {
        source_name: source_name.to_string(),
    })?;

    Ok(Rotor::new(2.0 * tip_radius, blades, sections)?)
}

fn is_units_line(line: &str) -> bool {
    line.contains("(QUOTED)") || line.contains("(LE-TE)")
}

fn parse_blades(line: &str, source_name: &str) -> Result<Option<u32>, ImportError> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("BLADES:") {
        return Ok(None);
    }
    let text = tokens.next().unwrap_or_default();
    let count = text
        .parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && *v >= 1.0 && *v <= f64::from(u32::MAX))
        .ok_or_else(|| ImportError::InvalidBladeCount {
            source_name: source_name.to_string(),
            text: text.to_string(),
        })?;
    Ok(Some(count as u32))
}
