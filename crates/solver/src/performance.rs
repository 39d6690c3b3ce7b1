//! Result records returned by the solver.

use serde::Serialize;

use crate::station::StationState;

/// How the spanwise loading was integrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrature {
    /// Each station is the centre of a panel of known width.
    Panel,
    /// Trapezoidal rule over the station radii.
    Trapezoidal,
}

/// Converged state of one radial station.
#[derive(Debug, Clone, Serialize)]
pub struct StationPerformance {
    pub radius_m: f64,
    /// Circulation residual left after the solve.
    pub residual: f64,
    pub converged: bool,
    pub iterations: usize,
    pub wake_angle_rad: f64,
    pub circulation_m2_s: f64,
    /// Local wake advance ratio `lambda_w`.
    pub wake_advance_ratio: f64,
    pub velocity_m_s: f64,
    pub inflow_angle_rad: f64,
    pub alpha_rad: f64,
    pub reynolds: f64,
    pub mach: f64,
    pub cl: f64,
    pub cd: f64,
    /// Thrust per unit span of one blade (N/m).
    pub dt_dr: f64,
    /// Torque per unit span of one blade (N·m/m).
    pub dq_dr: f64,
    /// Coefficients came from outside the stored polar data.
    pub extrapolated: bool,
}

impl StationPerformance {
    pub(crate) fn from_state(
        radius: f64,
        state: &StationState,
        converged: bool,
        iterations: usize,
    ) -> Self {
        Self {
            radius_m: radius,
            residual: state.residual,
            converged,
            iterations,
            wake_angle_rad: state.wake_angle,
            circulation_m2_s: state.circulation,
            wake_advance_ratio: state.wake_advance_ratio,
            velocity_m_s: state.velocity,
            inflow_angle_rad: state.inflow_angle,
            alpha_rad: state.alpha,
            reynolds: state.reynolds,
            mach: state.mach,
            cl: state.cl,
            cd: state.cd,
            dt_dr: state.dt_dr,
            dq_dr: state.dq_dr,
            extrapolated: state.extrapolated,
        }
    }

    pub(crate) fn unloaded(radius: f64) -> Self {
        Self {
            radius_m: radius,
            residual: 0.0,
            converged: true,
            iterations: 0,
            wake_angle_rad: 0.0,
            circulation_m2_s: 0.0,
            wake_advance_ratio: 0.0,
            velocity_m_s: 0.0,
            inflow_angle_rad: 0.0,
            alpha_rad: 0.0,
            reynolds: 0.0,
            mach: 0.0,
            cl: 0.0,
            cd: 0.0,
            dt_dr: 0.0,
            dq_dr: 0.0,
            extrapolated: false,
        }
    }
}

/// Integrated performance of a rotor at one operating point.
#[derive(Debug, Clone, Serialize)]
pub struct RotorPerformance {
    pub airspeed_m_s: f64,
    pub omega_rad_s: f64,
    /// Thrust of all blades (N).
    pub thrust_n: f64,
    /// Shaft torque of all blades (N·m), negative for a rotor turning backwards.
    pub torque_nm: f64,
    /// Shaft power `Q * Omega` (W).
    pub power_w: f64,
    pub ct: f64,
    pub cp: f64,
    /// Advance ratio `J = Uinf / (n D)`, with `n` taken from `|Omega|` so a reversed
    /// rotor keeps the sign of the freestream.
    pub advance_ratio: f64,
    pub quadrature: Quadrature,
    pub stations: Vec<StationPerformance>,
}

impl RotorPerformance {
    /// Propulsive efficiency `T * Uinf / P`; `None` when the shaft absorbs no power.
    pub fn efficiency(&self) -> Option<f64> {
        if self.power_w > 0.0 {
            Some(self.thrust_n * self.airspeed_m_s / self.power_w)
        } else {
            None
        }
    }

    /// True when every station met the tolerance.
    pub fn is_converged(&self) -> bool {
        self.stations.iter().all(|s| s.converged)
    }

    /// Indices of stations that did not converge.
    pub fn unconverged_stations(&self) -> Vec<usize> {
        self.stations
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.converged)
            .map(|(i, _)| i)
            .collect()
    }

    /// Largest absolute residual across the stations.
    pub fn max_residual(&self) -> f64 {
        self.stations
            .iter()
            .map(|s| s.residual.abs())
            .fold(0.0, f64::max)
    }

    pub fn radii(&self) -> Vec<f64> {
        self.column(|s| s.radius_m)
    }

    pub fn residuals(&self) -> Vec<f64> {
        self.column(|s| s.residual)
    }

    pub fn circulations(&self) -> Vec<f64> {
        self.column(|s| s.circulation_m2_s)
    }

    pub fn wake_advance_ratios(&self) -> Vec<f64> {
        self.column(|s| s.wake_advance_ratio)
    }

    pub fn thrust_distribution(&self) -> Vec<f64> {
        self.column(|s| s.dt_dr)
    }

    pub fn torque_distribution(&self) -> Vec<f64> {
        self.column(|s| s.dq_dr)
    }

    fn column(&self, field: impl Fn(&StationPerformance) -> f64) -> Vec<f64> {
        self.stations.iter().map(field).collect()
    }
}
