//! Drela's analytic section model: linear lift clipped at stall, parabolic drag polar
//! scaled with a Reynolds-number power law.

use rotor_core::units::deg_to_rad;

use crate::polar::Polar;
use crate::PolarError;

/// Reynolds numbers at which [`AnalyticPolar::tabulate`] samples the model.
pub const SAMPLE_REYNOLDS: [f64; 7] = [
    30_000.0, 50_000.0, 75_000.0, 100_000.0, 150_000.0, 200_000.0, 500_000.0,
];

/// Angles of attack (degrees) at which [`AnalyticPolar::tabulate`] samples the model.
pub const SAMPLE_ALPHA_DEG: [f64; 31] = [
    -45.0, -30.0, -20.0, -15.0, -12.0, -10.0, -9.0, -8.0, -7.0, -6.0, -5.0, -4.0, -3.0, -2.0,
    -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 15.0, 20.0, 30.0, 45.0,
];

/// The ten shape parameters of the analytic model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticPolar {
    /// Lift coefficient at zero angle of attack.
    pub cl0: f64,
    /// Lift curve slope (1/rad).
    pub cl_alpha: f64,
    pub cl_min: f64,
    pub cl_max: f64,
    /// Minimum drag coefficient, reached at `cl_cd0`.
    pub cd0: f64,
    /// Drag curvature above `cl_cd0`.
    pub cd2_upper: f64,
    /// Drag curvature below `cl_cd0`.
    pub cd2_lower: f64,
    pub cl_cd0: f64,
    /// Reynolds number the drag parameters refer to.
    pub re_ref: f64,
    /// Drag scaling exponent, typically around -0.5.
    pub re_exp: f64,
}

impl AnalyticPolar {
    pub fn validate(&self) -> Result<(), PolarError> {
        let values = [
            self.cl0,
            self.cl_alpha,
            self.cl_min,
            self.cl_max,
            self.cd0,
            self.cd2_upper,
            self.cd2_lower,
            self.cl_cd0,
            self.re_ref,
            self.re_exp,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PolarError::InvalidAnalytic("parameters must be finite"));
        }
        if self.cl_alpha == 0.0 {
            return Err(PolarError::InvalidAnalytic("lift slope must be non-zero"));
        }
        if self.cl_min >= self.cl_max {
            return Err(PolarError::InvalidAnalytic("cl_min must be below cl_max"));
        }
        if self.re_ref <= 0.0 {
            return Err(PolarError::InvalidAnalytic(
                "reference Reynolds number must be positive",
            ));
        }
        Ok(())
    }

    /// Closed-form `(CL, CD)` at `alpha` (rad) and Reynolds number `re`.
    pub fn evaluate(&self, alpha: f64, re: f64) -> (f64, f64) {
        let linear = self.cl0 + self.cl_alpha * alpha;
        let stalled = linear >= self.cl_max || linear <= self.cl_min;
        let cl = linear.clamp(self.cl_min, self.cl_max);

        let cd2 = if cl >= self.cl_cd0 {
            self.cd2_upper
        } else {
            self.cd2_lower
        };
        let excess = cl - self.cl_cd0;
        let mut cd = (self.cd0 + cd2 * excess * excess) * (re / self.re_ref).powf(self.re_exp);

        if stalled {
            // post-stall growth towards CD = 2 at 90 degrees from zero-lift
            let alpha_cd0 = (self.cl_cd0 - self.cl0) / self.cl_alpha;
            cd += 2.0 * (alpha - alpha_cd0).sin().powi(2);
        }
        (cl, cd)
    }

    /// Polar sampled at `re` over [`SAMPLE_ALPHA_DEG`].
    pub fn polar_at(&self, re: f64) -> Result<Polar, PolarError> {
        let alpha: Vec<f64> = SAMPLE_ALPHA_DEG.iter().map(|&deg| deg_to_rad(deg)).collect();
        let (cl, cd): (Vec<f64>, Vec<f64>) = alpha.iter().map(|&a| self.evaluate(a, re)).unzip();
        Polar::new(re, alpha, cl, cd)
    }

    /// The model sampled on the reference grid, one polar per [`SAMPLE_REYNOLDS`] entry.
    pub fn tabulate(&self) -> Result<Vec<Polar>, PolarError> {
        self.validate()?;
        SAMPLE_REYNOLDS.iter().map(|&re| self.polar_at(re)).collect()
    }
}
