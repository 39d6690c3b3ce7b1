//! Readers for airfoil polar and propeller geometry files.

pub mod apc;
pub mod uiuc;
pub mod xfoil;

use std::path::{Path, PathBuf};

use rotor_airfoil::PolarError;
use rotor_geometry::GeometryError;
use thiserror::Error;

pub use apc::{parse_apc_geometry, read_apc_geometry};
pub use uiuc::{parse_uiuc_geometry, read_uiuc_geometry};
pub use xfoil::{import_xfoil_airfoil, parse_xfoil_polar, read_xfoil_polar};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{source_name}: no Reynolds number found")]
    MissingReynolds { source_name: String },
    #[error("{source_name}: could not parse Reynolds number from `{text}`")]
    InvalidReynolds { source_name: String, text: String },
    #[error("{source_name}: table header `{header}` not found")]
    MissingTable {
        source_name: String,
        header: &'static str,
    },
    #[error("{source_name}: table contains no data rows")]
    NoRows { source_name: String },
    #[error("{source_name}: blade count not found")]
    MissingBladeCount { source_name: String },
    #[error("{source_name}: invalid blade count `{text}`")]
    InvalidBladeCount { source_name: String, text: String },
    #[error("no polar files given for airfoil {0}")]
    NoPolarFiles(String),
    #[error(transparent)]
    Polar(#[from] PolarError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub(crate) fn read_file(path: &Path) -> Result<String, ImportError> {
    std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// All whitespace-separated tokens of `line` parsed as numbers, or `None` if any fails.
pub(crate) fn numeric_row(line: &str) -> Option<Vec<f64>> {
    line.split_whitespace()
        .map(|token| token.parse::<f64>().ok())
        .collect()
}
