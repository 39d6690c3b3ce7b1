//! Blade-element / vortex model of a single radial station.
//!
//! The unknown is the wake angle `psi` in `[-pi/2, pi/2]`, which places the total velocity
//! on the circle through the freestream and blade-speed vectors. The residual is the
//! mismatch between the circulation implied by the induced swirl and the circulation
//! implied by the section lift.

use std::f64::consts::{FRAC_PI_2, PI};

use rotor_geometry::Section;
use tracing::{trace, warn};

use crate::SolverSettings;
use crate::performance::StationPerformance;

/// Inputs shared by every residual evaluation at one station.
#[derive(Debug, Clone, Copy)]
pub struct StationModel<'a> {
    pub section: &'a Section,
    /// Axial freestream velocity `Ua` (m/s).
    pub axial_speed: f64,
    /// Blade speed `Ut = |Omega| * r` (m/s).
    pub tangential_speed: f64,
    /// Tip radius `D / 2` (m).
    pub tip_radius: f64,
    pub blades: f64,
    pub settings: &'a SolverSettings,
}

/// Everything derived from one wake-angle guess.
#[derive(Debug, Clone, Copy)]
pub struct StationState {
    pub wake_angle: f64,
    pub residual: f64,
    pub circulation: f64,
    pub wake_advance_ratio: f64,
    pub velocity: f64,
    pub inflow_angle: f64,
    pub alpha: f64,
    pub reynolds: f64,
    pub mach: f64,
    pub cl: f64,
    pub cd: f64,
    pub extrapolated: bool,
    pub dt_dr: f64,
    pub dq_dr: f64,
}

impl<'a> StationModel<'a> {
    /// Magnitude of the undisturbed relative velocity `U`.
    pub fn relative_speed(&self) -> f64 {
        self.axial_speed.hypot(self.tangential_speed)
    }

    /// A station at the axis or in still air with a stopped rotor carries no load.
    pub fn is_unloaded(&self) -> bool {
        self.section.radius <= 0.0 || self.relative_speed() <= 0.0
    }

    /// Evaluate the station at wake angle `psi`.
    pub fn evaluate(&self, psi: f64) -> StationState {
        let section = self.section;
        let settings = self.settings;
        let (ua, ut) = (self.axial_speed, self.tangential_speed);
        let u = self.relative_speed();
        let r = section.radius;

        let (sin_psi, cos_psi) = psi.sin_cos();
        let wa = 0.5 * ua + 0.5 * u * sin_psi;
        let wt = 0.5 * ut + 0.5 * u * cos_psi;
        let vt = ut - wt;

        let w = wa.hypot(wt);
        let phi = wa.atan2(wt);
        let alpha = section.twist - phi;
        let reynolds = settings.density * w * section.chord / settings.viscosity;
        let mach = if settings.speed_of_sound > 0.0 {
            w / settings.speed_of_sound
        } else {
            0.0
        };
        let coefficients = section.airfoil.coefficients(alpha, reynolds, mach);
        let (cl, cd) = (coefficients.cl, coefficients.cd);

        let radius_ratio = r / self.tip_radius;
        let lambda_w = radius_ratio * wa / wt;
        let f = 0.5 * self.blades * (1.0 - radius_ratio) / lambda_w;
        // e^(-f) exceeds 1 once the wake turns inboard of the tip
        let tip_loss = (2.0 / PI) * (-f).exp().min(1.0).acos();
        let swirl = 4.0 * lambda_w * self.tip_radius / (PI * self.blades * r);
        let circulation = vt * (4.0 * PI * r / self.blades) * tip_loss * (1.0 + swirl * swirl).sqrt();

        let residual = circulation - 0.5 * w * section.chord * cl;

        let (cn, ct) = if w > 0.0 {
            (
                cl * wt / w - cd * wa / w,
                cl * wa / w + cd * wt / w,
            )
        } else {
            (0.0, 0.0)
        };
        let dynamic = 0.5 * settings.density * w * w * section.chord;

        StationState {
            wake_angle: psi,
            residual,
            circulation,
            wake_advance_ratio: lambda_w,
            velocity: w,
            inflow_angle: phi,
            alpha,
            reynolds,
            mach,
            cl,
            cd,
            extrapolated: coefficients.is_extrapolated(),
            dt_dr: dynamic * cn,
            dq_dr: dynamic * ct * r,
        }
    }

    /// Bracketed bisection on the wake angle.
    ///
    /// Converged when the residual is within tolerance and the half-bracket has shrunk below
    /// it, or when a midpoint hits the root exactly. End-points that do not bracket a sign
    /// change yield the better end-point, flagged as not converged.
    pub fn solve(&self) -> StationPerformance {
        let radius = self.section.radius;
        if self.is_unloaded() {
            return StationPerformance::unloaded(radius);
        }

        let tolerance = self.settings.tolerance;
        let (mut lo, mut hi) = (-FRAC_PI_2, FRAC_PI_2);
        let low = self.evaluate(lo);
        let high = self.evaluate(hi);
        let mut f_lo = low.residual;

        let bracketed = f_lo * high.residual <= 0.0;
        if !bracketed {
            let best = if low.residual.abs() <= high.residual.abs() {
                low
            } else {
                high
            };
            warn!(
                radius,
                residual_low = low.residual,
                residual_high = high.residual,
                "wake angle not bracketed; keeping best end-point"
            );
            return StationPerformance::from_state(radius, &best, false, 0);
        }
        if f_lo == 0.0 {
            return StationPerformance::from_state(radius, &low, true, 0);
        }
        if high.residual == 0.0 {
            return StationPerformance::from_state(radius, &high, true, 0);
        }

        let mut last = low;
        for iteration in 1..=self.settings.max_iterations {
            let mid = 0.5 * (lo + hi);
            let state = self.evaluate(mid);
            let f_mid = state.residual;
            trace!(radius, iteration, psi = mid, residual = f_mid);

            if !f_mid.is_finite() {
                warn!(radius, iteration, "residual became non-finite");
                return StationPerformance::from_state(radius, &state, false, iteration);
            }
            if f_mid == 0.0 || (f_mid.abs() <= tolerance && 0.5 * (hi - lo) <= tolerance) {
                return StationPerformance::from_state(radius, &state, true, iteration);
            }

            if f_lo * f_mid < 0.0 {
                hi = mid;
            } else {
                lo = mid;
                f_lo = f_mid;
            }
            last = state;
        }

        warn!(
            radius,
            residual = last.residual,
            max_iterations = self.settings.max_iterations,
            "station did not converge"
        );
        StationPerformance::from_state(radius, &last, false, self.settings.max_iterations)
    }
}
