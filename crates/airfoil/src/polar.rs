//! Single-Reynolds-number lift/drag tables.

use std::f64::consts::FRAC_PI_2;

use rotor_core::interp::{bracket, lerp};

use crate::{Coefficients, PolarError};

/// Drag coefficient of a flat plate broadside to the flow, reached at ±90°.
pub const FLAT_PLATE_CD: f64 = 2.0;

/// Lift and drag samples at one Reynolds number. Angles are in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Polar {
    reynolds: f64,
    alpha: Vec<f64>,
    cl: Vec<f64>,
    cd: Vec<f64>,
}

impl Polar {
    /// Build a polar, checking that the three columns line up and `alpha` strictly increases.
    pub fn new(
        reynolds: f64,
        alpha: Vec<f64>,
        cl: Vec<f64>,
        cd: Vec<f64>,
    ) -> Result<Self, PolarError> {
        if !reynolds.is_finite() || reynolds <= 0.0 {
            return Err(PolarError::InvalidReynolds(reynolds));
        }
        if alpha.is_empty() {
            return Err(PolarError::EmptyPolar { reynolds });
        }
        if cl.len() != alpha.len() || cd.len() != alpha.len() {
            return Err(PolarError::LengthMismatch {
                alpha: alpha.len(),
                cl: cl.len(),
                cd: cd.len(),
            });
        }
        if let Some(index) = alpha
            .iter()
            .zip(&cl)
            .zip(&cd)
            .position(|((a, l), d)| !(a.is_finite() && l.is_finite() && d.is_finite()))
        {
            return Err(PolarError::NonFiniteSample { reynolds, index });
        }
        if let Some(index) = alpha.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PolarError::NonIncreasingAlpha {
                reynolds,
                index: index + 1,
            });
        }

        Ok(Self {
            reynolds,
            alpha,
            cl,
            cd,
        })
    }

    pub fn reynolds(&self) -> f64 {
        self.reynolds
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn cl(&self) -> &[f64] {
        &self.cl
    }

    pub fn cd(&self) -> &[f64] {
        &self.cd
    }

    /// Number of samples in the table.
    pub fn len(&self) -> usize {
        self.alpha.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.is_empty()
    }

    /// Smallest and largest tabulated angle of attack.
    pub fn alpha_range(&self) -> (f64, f64) {
        (self.alpha[0], self.alpha[self.alpha.len() - 1])
    }

    /// Coefficients at `alpha` on this polar.
    ///
    /// Inside the table the samples are interpolated linearly. Outside it the lift is held
    /// at the end value and the drag is blended linearly towards [`FLAT_PLATE_CD`] at ±90°;
    /// such queries are flagged as out of range.
    pub fn sample(&self, alpha: f64) -> Coefficients {
        let last = self.alpha.len() - 1;
        let (alpha_min, alpha_max) = self.alpha_range();

        let (cl, cd) = if let Some(i) = bracket(&self.alpha, alpha) {
            (
                lerp(self.alpha[i - 1], self.cl[i - 1], self.alpha[i], self.cl[i], alpha),
                lerp(self.alpha[i - 1], self.cd[i - 1], self.alpha[i], self.cd[i], alpha),
            )
        } else if alpha == alpha_min {
            (self.cl[0], self.cd[0])
        } else if alpha < alpha_min {
            (
                self.cl[0],
                lerp(-FRAC_PI_2, FLAT_PLATE_CD, alpha_min, self.cd[0], alpha),
            )
        } else {
            (
                self.cl[last],
                lerp(alpha_max, self.cd[last], FRAC_PI_2, FLAT_PLATE_CD, alpha),
            )
        };

        Coefficients {
            cl,
            cd,
            alpha_in_range: alpha >= alpha_min && alpha <= alpha_max,
            reynolds_in_range: true,
        }
    }
}
