//! Airfoil polar store: lift and drag coefficients at an arbitrary
//! `(alpha, Reynolds, Mach)` triple.
//!
//! An [`Airfoil`] is either a set of tabulated polars measured at distinct Reynolds
//! numbers, or the closed-form analytic model. Both are immutable once built and hold no
//! query-time cache, so a single instance can be shared across threads behind an `Arc`.

pub mod analytic;
pub mod polar;

use rotor_core::interp::{bracket, lerp};
use thiserror::Error;

pub use analytic::AnalyticPolar;
pub use polar::Polar;

/// Largest Mach number at which the compressibility correction is applied.
pub const MACH_CORRECTION_LIMIT: f64 = 0.99;

/// Errors raised while building polars or airfoils.
#[derive(Debug, Error)]
pub enum PolarError {
    #[error("Reynolds number must be finite and positive, got {0}")]
    InvalidReynolds(f64),
    #[error("polar at Re = {reynolds} has no samples")]
    EmptyPolar { reynolds: f64 },
    #[error("polar columns differ in length (alpha {alpha}, CL {cl}, CD {cd})")]
    LengthMismatch { alpha: usize, cl: usize, cd: usize },
    #[error("polar at Re = {reynolds} has a non-finite sample at row {index}")]
    NonFiniteSample { reynolds: f64, index: usize },
    #[error("polar at Re = {reynolds}: alpha must increase strictly (row {index})")]
    NonIncreasingAlpha { reynolds: f64, index: usize },
    #[error("airfoil needs at least one polar")]
    NoPolars,
    #[error("two polars share Re = {0}")]
    DuplicateReynolds(f64),
    #[error("invalid analytic airfoil: {0}")]
    InvalidAnalytic(&'static str),
}

/// Result of a coefficient query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub cl: f64,
    pub cd: f64,
    /// `false` when `alpha` lies outside the tabulated range.
    pub alpha_in_range: bool,
    /// `false` when the Reynolds number lies outside the stored polars.
    pub reynolds_in_range: bool,
}

impl Coefficients {
    /// Whether the value came from extrapolation and should be trusted less.
    pub fn is_extrapolated(&self) -> bool {
        !(self.alpha_in_range && self.reynolds_in_range)
    }
}

#[derive(Debug, Clone)]
enum Model {
    Tabulated { reynolds: Vec<f64>, polars: Vec<Polar> },
    Analytic(AnalyticPolar),
}

/// Aerodynamic characteristics of a blade section.
#[derive(Debug, Clone)]
pub struct Airfoil {
    name: String,
    model: Model,
}

impl Airfoil {
    /// Airfoil from measured polars, sorted by ascending Reynolds number.
    pub fn tabulated(name: impl Into<String>, mut polars: Vec<Polar>) -> Result<Self, PolarError> {
        if polars.is_empty() {
            return Err(PolarError::NoPolars);
        }
        polars.sort_by(|a, b| a.reynolds().total_cmp(&b.reynolds()));
        if let Some(pair) = polars
            .windows(2)
            .find(|w| w[0].reynolds() == w[1].reynolds())
        {
            return Err(PolarError::DuplicateReynolds(pair[0].reynolds()));
        }
        let reynolds = polars.iter().map(Polar::reynolds).collect();
        Ok(Self {
            name: name.into(),
            model: Model::Tabulated { reynolds, polars },
        })
    }

    /// Airfoil evaluated in closed form from the analytic parameters.
    pub fn analytic(name: impl Into<String>, params: AnalyticPolar) -> Result<Self, PolarError> {
        params.validate()?;
        Ok(Self {
            name: name.into(),
            model: Model::Analytic(params),
        })
    }

    /// The analytic model sampled on its reference grid and queried like measured polars.
    pub fn sampled_analytic(
        name: impl Into<String>,
        params: AnalyticPolar,
    ) -> Result<Self, PolarError> {
        Self::tabulated(name, params.tabulate()?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored polars; empty for a closed-form analytic airfoil.
    pub fn polars(&self) -> &[Polar] {
        match &self.model {
            Model::Tabulated { polars, .. } => polars,
            Model::Analytic(_) => &[],
        }
    }

    pub fn analytic_params(&self) -> Option<&AnalyticPolar> {
        match &self.model {
            Model::Analytic(params) => Some(params),
            Model::Tabulated { .. } => None,
        }
    }

    /// Lowest and highest stored Reynolds number, `None` for the analytic model.
    pub fn reynolds_range(&self) -> Option<(f64, f64)> {
        match &self.model {
            Model::Tabulated { reynolds, .. } => Some((reynolds[0], reynolds[reynolds.len() - 1])),
            Model::Analytic(_) => None,
        }
    }

    /// Lift and drag at `alpha` (rad), Reynolds number `re` and Mach number `mach`.
    ///
    /// Tabulated airfoils blend the two polars bracketing `re`; outside the stored range the
    /// nearest polar is used as is. `mach = 0` disables the compressibility correction.
    pub fn coefficients(&self, alpha: f64, re: f64, mach: f64) -> Coefficients {
        let mut coefficients = match &self.model {
            Model::Analytic(params) => {
                let (cl, cd) = params.evaluate(alpha, re);
                Coefficients {
                    cl,
                    cd,
                    alpha_in_range: true,
                    reynolds_in_range: true,
                }
            }
            Model::Tabulated { reynolds, polars } => {
                interpolate_polars(reynolds, polars, alpha, re)
            }
        };
        coefficients.cl = compressibility_correction(coefficients.cl, mach);
        coefficients
    }
}

fn interpolate_polars(reynolds: &[f64], polars: &[Polar], alpha: f64, re: f64) -> Coefficients {
    let last = polars.len() - 1;
    let (lower, upper) = match bracket(reynolds, re) {
        Some(i) => (i - 1, i),
        None if re <= reynolds[0] => (0, 0),
        None => (last, last),
    };

    let low = polars[lower].sample(alpha);
    let high = polars[upper].sample(alpha);
    let (re_low, re_high) = (reynolds[lower], reynolds[upper]);

    Coefficients {
        cl: lerp(re_low, low.cl, re_high, high.cl, re),
        cd: lerp(re_low, low.cd, re_high, high.cd, re),
        alpha_in_range: low.alpha_in_range && high.alpha_in_range,
        reynolds_in_range: re >= reynolds[0] && re <= reynolds[last],
    }
}

/// Prandtl–Glauert lift correction; identity at `mach <= 0` or at and above
/// [`MACH_CORRECTION_LIMIT`].
pub fn compressibility_correction(cl: f64, mach: f64) -> f64 {
    if mach > 0.0 && mach < MACH_CORRECTION_LIMIT {
        cl / (1.0 - mach * mach).sqrt()
    } else {
        cl
    }
}
