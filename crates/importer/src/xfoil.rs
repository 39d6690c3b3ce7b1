//! XFoil / XFLR5 polar text files.
//!
//! The Reynolds number is taken from the first `Re = ...` declaration, with or without
//! spaces around `=`, written as `0.300 e 6`, `3.0e5` or `300000`. Samples follow the
//! header line naming the `alpha`, `CL` and `CD` columns; dashed separator lines are
//! skipped and the table ends at the first blank or non-numeric line.

use std::path::Path;

use rotor_airfoil::{Airfoil, Polar};
use rotor_core::units::deg_to_rad;

use crate::{ImportError, numeric_row, read_file};

/// Read one polar file.
pub fn read_xfoil_polar<P: AsRef<Path>>(path: P) -> Result<Polar, ImportError> {
    let path = path.as_ref();
    let contents = read_file(path)?;
    parse_xfoil_polar(&contents, &path.display().to_string())
}

/// Build a tabulated airfoil from one polar file per Reynolds number.
pub fn import_xfoil_airfoil<P: AsRef<Path>>(
    name: &str,
    paths: &[P],
) -> Result<Airfoil, ImportError> {
    if paths.is_empty() {
        return Err(ImportError::NoPolarFiles(name.to_string()));
    }
    let polars = paths
        .iter()
        .map(read_xfoil_polar)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Airfoil::tabulated(name, polars)?)
}

/// Parse polar text. Rows are sorted by alpha and repeated angles keep their first sample.
pub fn parse_xfoil_polar(contents: &str, source_name: &str) -> Result<Polar, ImportError> {
    let mut lines = contents.lines();

    let mut reynolds = None;
    let mut columns = None;
    for line in lines.by_ref() {
        if reynolds.is_none() {
            if let Some(text) = reynolds_text(line) {
                reynolds = Some(parse_reynolds(text, source_name)?);
            }
            continue;
        }
        if let Some(found) = header_columns(line) {
            columns = Some(found);
            break;
        }
    }

    let reynolds = reynolds.ok_or_else(|| ImportError::MissingReynolds {
        source_name: source_name.to_string(),
    })?;
    let (alpha_col, cl_col, cd_col) = columns.ok_or_else(|| ImportError::MissingTable {
        source_name: source_name.to_string(),
        header: "alpha CL CD",
    })?;
    let width = alpha_col.max(cl_col).max(cd_col) + 1;

    let mut rows: Vec<(f64, f64, f64)> = Vec::new();
    for line in lines {
        if line.contains("---") {
            continue;
        }
        let Some(values) = numeric_row(line) else {
            break;
        };
        if values.len() < width {
            break;
        }
        rows.push((
            deg_to_rad(values[alpha_col]),
            values[cl_col],
            values[cd_col],
        ));
    }
    if rows.is_empty() {
        return Err(ImportError::NoRows {
            source_name: source_name.to_string(),
        });
    }

    rows.sort_by(|a, b| a.0.total_cmp(&b.0));
    rows.dedup_by(|next, prev| next.0 == prev.0);

    let mut alpha = Vec::with_capacity(rows.len());
    let mut cl = Vec::with_capacity(rows.len());
    let mut cd = Vec::with_capacity(rows.len());
    for (a, l, d) in rows {
        alpha.push(a);
        cl.push(l);
        cd.push(d);
    }
    Ok(Polar::new(reynolds, alpha, cl, cd)?)
}

/// Text after the `=` of a `Re = ...` declaration, spacing around `=` optional.
fn reynolds_text(line: &str) -> Option<&str> {
    line.match_indices('=')
        .find(|(index, _)| line[..*index].split_whitespace().next_back() == Some("Re"))
        .map(|(index, _)| &line[index + 1..])
}

fn parse_reynolds(text: &str, source_name: &str) -> Result<f64, ImportError> {
    let invalid = || ImportError::InvalidReynolds {
        source_name: source_name.to_string(),
        text: text.trim().to_string(),
    };
    let mut tokens = text.split_whitespace();
    let mantissa: f64 = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(invalid)?;
    match (tokens.next(), tokens.next()) {
        (Some("e"), Some(exponent)) => {
            let exponent: f64 = exponent.parse().map_err(|_| invalid())?;
            Ok(mantissa * 10f64.powf(exponent))
        }
        _ => Ok(mantissa),
    }
}

/// Column positions of `alpha`, `CL` and `CD` when `line` is the table header.
fn header_columns(line: &str) -> Option<(usize, usize, usize)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let find = |name: &str| tokens.iter().position(|t| *t == name);
    Some((find("alpha")?, find("CL")?, find("CD")?))
}
