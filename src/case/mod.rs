//! Assemble runnable cases from case files.
//!
//! Airfoils are built once and shared between stations through `Arc`. Relative file
//! paths inside a case resolve against the directory of the case file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rotor_airfoil::{Airfoil, AnalyticPolar, PolarError};
use rotor_config::{
    AirfoilConfig, AnalyticParametersConfig, CaseConfig, ConfigError, RotorConfig, StationConfig,
};
use rotor_core::units::{deg_to_rad, rpm_to_rad_s};
use rotor_geometry::{GeometryError, Rotor, Section};
use rotor_importer::{ImportError, import_xfoil_airfoil, read_apc_geometry, read_uiuc_geometry};
use rotor_solver::{OperatingPoint, SolverSettings};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("airfoil {name}: {source}")]
    Airfoil {
        name: String,
        #[source]
        source: PolarError,
    },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("airfoil {0} is defined more than once")]
    DuplicateAirfoil(String),
    #[error("unknown airfoil {0}")]
    UnknownAirfoil(String),
    #[error("rotor diameter missing and not every station has a width")]
    MissingDiameter,
    #[error("operating point {index}: give exactly one of rpm and omega_rad_s")]
    ShaftSpeed { index: usize },
    #[error("sweep: give exactly one of rpm and omega_rad_s")]
    SweepShaftSpeed,
    #[error("case {0} has no operating points")]
    NoOperatingPoints(String),
}

/// A case ready to hand to the solver.
#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    pub settings: SolverSettings,
    pub rotor: Rotor,
    pub points: Vec<OperatingPoint>,
}

/// Load and assemble the case stored at `path`.
pub fn load_case<P: AsRef<Path>>(path: P) -> Result<Case, CaseError> {
    let path = path.as_ref();
    let config = rotor_config::load_case(path)?;
    build_case(config, &base_dir(path))
}

/// Load a case file, or every case file in a directory.
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<Case>, CaseError> {
    rotor_config::load_cases(path)?
        .into_iter()
        .map(|(file, config)| build_case(config, &base_dir(&file)))
        .collect()
}

/// Build a case from its configuration, resolving relative files against `base`.
pub fn build_case(config: CaseConfig, base: &Path) -> Result<Case, CaseError> {
    let settings = SolverSettings {
        tolerance: config.solver.tolerance,
        max_iterations: config.solver.max_iterations,
        density: config.atmosphere.density_kg_m3,
        viscosity: config.atmosphere.viscosity_pa_s,
        speed_of_sound: config.atmosphere.speed_of_sound_m_s,
    };

    let airfoils = build_airfoils(&config.airfoils, base)?;
    let mut rotor = build_rotor(&config.rotor, &airfoils, base)?;
    if let Some(n) = config.refine_stations {
        rotor = rotor.refine(n)?;
        debug!(case = %config.name, stations = n, "refined blade");
    }

    let points = operating_points(&config)?;
    if points.is_empty() {
        return Err(CaseError::NoOperatingPoints(config.name));
    }

    info!(
        case = %config.name,
        diameter = rotor.diameter(),
        blades = rotor.blades(),
        stations = rotor.len(),
        points = points.len(),
        "case assembled"
    );
    Ok(Case {
        name: config.name,
        settings,
        rotor,
        points,
    })
}

fn base_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn resolve(base: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        base.join(file)
    }
}

fn build_airfoils(
    configs: &[AirfoilConfig],
    base: &Path,
) -> Result<BTreeMap<String, Arc<Airfoil>>, CaseError> {
    let mut airfoils = BTreeMap::new();
    for config in configs {
        let name = config.name();
        if airfoils.contains_key(name) {
            return Err(CaseError::DuplicateAirfoil(name.to_string()));
        }
        let airfoil = match config {
            AirfoilConfig::Analytic {
                name,
                sampled,
                parameters,
            } => {
                let params = analytic_polar(parameters);
                let built = if *sampled {
                    Airfoil::sampled_analytic(name.as_str(), params)
                } else {
                    Airfoil::analytic(name.as_str(), params)
                };
                built.map_err(|source| CaseError::Airfoil {
                    name: name.clone(),
                    source,
                })?
            }
            AirfoilConfig::Xfoil { name, files } => {
                let paths: Vec<PathBuf> = files.iter().map(|f| resolve(base, f)).collect();
                import_xfoil_airfoil(name, &paths)?
            }
        };
        debug!(airfoil = name, polars = airfoil.polars().len(), "airfoil loaded");
        airfoils.insert(name.to_string(), Arc::new(airfoil));
    }
    Ok(airfoils)
}

fn analytic_polar(p: &AnalyticParametersConfig) -> AnalyticPolar {
    AnalyticPolar {
        cl0: p.cl0,
        cl_alpha: p.cl_alpha,
        cl_min: p.cl_min,
        cl_max: p.cl_max,
        cd0: p.cd0,
        cd2_upper: p.cd2_upper,
        cd2_lower: p.cd2_lower,
        cl_cd0: p.cl_cd0,
        re_ref: p.re_ref,
        re_exp: p.re_exp,
    }
}

fn lookup(airfoils: &BTreeMap<String, Arc<Airfoil>>, name: &str) -> Result<Arc<Airfoil>, CaseError> {
    airfoils
        .get(name)
        .cloned()
        .ok_or_else(|| CaseError::UnknownAirfoil(name.to_string()))
}

fn build_rotor(
    config: &RotorConfig,
    airfoils: &BTreeMap<String, Arc<Airfoil>>,
    base: &Path,
) -> Result<Rotor, CaseError> {
    match config {
        RotorConfig::Stations {
            diameter_m,
            blades,
            airfoil,
            stations,
        } => {
            let sections = stations
                .iter()
                .map(|station| {
                    let name = station.airfoil.as_deref().unwrap_or(airfoil);
                    Ok(section(station, lookup(airfoils, name)?))
                })
                .collect::<Result<Vec<_>, CaseError>>()?;
            let diameter = match diameter_m {
                Some(d) => *d,
                None => panel_diameter(stations).ok_or(CaseError::MissingDiameter)?,
            };
            Ok(Rotor::new(diameter, *blades, sections)?)
        }
        RotorConfig::Apc { file, airfoil } => Ok(read_apc_geometry(
            resolve(base, file),
            lookup(airfoils, airfoil)?,
        )?),
        RotorConfig::Uiuc {
            file,
            diameter_m,
            blades,
            airfoil,
        } => Ok(read_uiuc_geometry(
            resolve(base, file),
            *diameter_m,
            *blades,
            lookup(airfoils, airfoil)?,
        )?),
    }
}

fn section(station: &StationConfig, airfoil: Arc<Airfoil>) -> Section {
    let section = Section::new(
        station.chord_m,
        deg_to_rad(station.twist_deg),
        station.radius_m,
        airfoil,
    );
    match station.width_m {
        Some(width) => section.with_width(width),
        None => section,
    }
}

/// Outer edge of the last panel, doubled.
fn panel_diameter(stations: &[StationConfig]) -> Option<f64> {
    if stations.iter().any(|s| s.width_m.is_none()) {
        return None;
    }
    let last = stations.last()?;
    Some(2.0 * (last.radius_m + 0.5 * last.width_m?))
}

fn shaft_speed(rpm: Option<f64>, omega: Option<f64>) -> Option<f64> {
    match (rpm, omega) {
        (Some(rpm), None) => Some(rpm_to_rad_s(rpm)),
        (None, Some(omega)) => Some(omega),
        _ => None,
    }
}

fn operating_points(config: &CaseConfig) -> Result<Vec<OperatingPoint>, CaseError> {
    let mut points = config
        .operating_points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let omega =
                shaft_speed(point.rpm, point.omega_rad_s).ok_or(CaseError::ShaftSpeed { index })?;
            Ok(OperatingPoint::new(point.airspeed_m_s, omega))
        })
        .collect::<Result<Vec<_>, CaseError>>()?;

    if let Some(sweep) = &config.sweep {
        let omega = shaft_speed(sweep.rpm, sweep.omega_rad_s).ok_or(CaseError::SweepShaftSpeed)?;
        points.extend(
            sweep
                .airspeeds()
                .into_iter()
                .map(|airspeed| OperatingPoint::new(airspeed, omega)),
        );
    }
    Ok(points)
}
