//! Case file models and loaders for rotor performance runs.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// One performance case: atmosphere, airfoils, rotor and the points to evaluate.
#[derive(Debug, Deserialize, Clone)]
pub struct CaseConfig {
    pub name: String,
    #[serde(default)]
    pub atmosphere: AtmosphereConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    pub airfoils: Vec<AirfoilConfig>,
    pub rotor: RotorConfig,
    /// Resample the blade to this many equally spaced stations before solving.
    #[serde(default)]
    pub refine_stations: Option<usize>,
    #[serde(default)]
    pub operating_points: Vec<OperatingPointConfig>,
    #[serde(default)]
    pub sweep: Option<SweepConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AtmosphereConfig {
    pub density_kg_m3: f64,
    pub viscosity_pa_s: f64,
    /// Zero disables the compressibility correction.
    pub speed_of_sound_m_s: f64,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            density_kg_m3: 1.225,
            viscosity_pa_s: 1.81e-5,
            speed_of_sound_m_s: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Airfoil definitions referenced by name from the rotor.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum AirfoilConfig {
    #[serde(rename = "analytic")]
    Analytic {
        name: String,
        /// Sample the model on its reference grid instead of evaluating it in closed form.
        #[serde(default)]
        sampled: bool,
        parameters: AnalyticParametersConfig,
    },
    #[serde(rename = "xfoil")]
    Xfoil { name: String, files: Vec<PathBuf> },
}

impl AirfoilConfig {
    pub fn name(&self) -> &str {
        match self {
            AirfoilConfig::Analytic { name, .. } | AirfoilConfig::Xfoil { name, .. } => name,
        }
    }
}

/// Analytic section model parameters; `cl_alpha` is per radian.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct AnalyticParametersConfig {
    pub cl0: f64,
    pub cl_alpha: f64,
    pub cl_min: f64,
    pub cl_max: f64,
    pub cd0: f64,
    pub cd2_upper: f64,
    pub cd2_lower: f64,
    pub cl_cd0: f64,
    pub re_ref: f64,
    pub re_exp: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum RotorConfig {
    /// Stations listed in the case file.
    #[serde(rename = "stations")]
    Stations {
        /// Defaults to the outer edge of the last panel when every station has a width.
        #[serde(default)]
        diameter_m: Option<f64>,
        blades: u32,
        airfoil: String,
        stations: Vec<StationConfig>,
    },
    #[serde(rename = "apc")]
    Apc { file: PathBuf, airfoil: String },
    #[serde(rename = "uiuc")]
    Uiuc {
        file: PathBuf,
        diameter_m: f64,
        blades: u32,
        airfoil: String,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct StationConfig {
    pub radius_m: f64,
    pub chord_m: f64,
    pub twist_deg: f64,
    #[serde(default)]
    pub width_m: Option<f64>,
    /// Overrides the rotor-wide airfoil for this station.
    #[serde(default)]
    pub airfoil: Option<String>,
}

/// Exactly one of `rpm` and `omega_rad_s` must be given.
#[derive(Debug, Deserialize, Clone)]
pub struct OperatingPointConfig {
    #[serde(default)]
    pub airspeed_m_s: f64,
    #[serde(default)]
    pub rpm: Option<f64>,
    #[serde(default)]
    pub omega_rad_s: Option<f64>,
}

/// Equally spaced airspeeds at a fixed shaft speed, end points included.
#[derive(Debug, Deserialize, Clone)]
pub struct SweepConfig {
    #[serde(default)]
    pub rpm: Option<f64>,
    #[serde(default)]
    pub omega_rad_s: Option<f64>,
    pub airspeed_start_m_s: f64,
    pub airspeed_end_m_s: f64,
    pub steps: usize,
}

impl SweepConfig {
    pub fn airspeeds(&self) -> Vec<f64> {
        match self.steps {
            0 => Vec::new(),
            1 => vec![self.airspeed_start_m_s],
            n => {
                let step = (self.airspeed_end_m_s - self.airspeed_start_m_s) / (n - 1) as f64;
                (0..n)
                    .map(|i| self.airspeed_start_m_s + i as f64 * step)
                    .collect()
            }
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read case file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Load a single case from a YAML or TOML file.
pub fn load_case<P: AsRef<Path>>(path: P) -> Result<CaseConfig, ConfigError> {
    load_record(path.as_ref())
}

/// Load a case file, or every `.toml`/`.yaml` case in a directory in file name order.
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<(PathBuf, CaseConfig)>, ConfigError> {
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else {
        Ok(vec![(path.to_path_buf(), load_record(path)?)])
    }
}

fn load_record<T>(path: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    if has_extension(path, "toml") {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<(PathBuf, T)>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            has_extension(path, "toml") || has_extension(path, "yaml") || has_extension(path, "yml")
        })
        .collect();
    entries.sort();
    entries
        .into_iter()
        .map(|path| {
            let record = load_record(&path)?;
            Ok((path, record))
        })
        .collect()
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().map(|e| e == ext).unwrap_or(false)
}
