//! Propeller performance by combined blade-element / vortex theory.
//!
//! [`solve`] finds the wake angle at every radial station of a [`Rotor`], integrates the
//! spanwise loading into thrust and torque, and reports the non-dimensional coefficients.
//! Stations that fail to converge are flagged in the result rather than failing the call.

pub mod performance;
pub mod station;

use std::f64::consts::PI;

use rayon::prelude::*;
use rotor_core::constants::{AIR_DENSITY, AIR_VISCOSITY};
use rotor_core::units::{rad_s_to_rpm, rpm_to_rad_s};
use rotor_geometry::Rotor;
use thiserror::Error;
use tracing::{debug, warn};

pub use performance::{Quadrature, RotorPerformance, StationPerformance};
pub use station::{StationModel, StationState};

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Numerical and atmospheric settings of a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Residual and wake-angle tolerance.
    pub tolerance: f64,
    /// Bisection steps allowed per station.
    pub max_iterations: usize,
    /// Air density (kg/m³).
    pub density: f64,
    /// Dynamic viscosity (Pa·s).
    pub viscosity: f64,
    /// Speed of sound (m/s); zero disables the Mach correction.
    pub speed_of_sound: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
            density: AIR_DENSITY,
            viscosity: AIR_VISCOSITY,
            speed_of_sound: 0.0,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), SolverError> {
        check_finite("density", self.density)?;
        check_finite("viscosity", self.viscosity)?;
        check_finite("speed of sound", self.speed_of_sound)?;
        check_finite("tolerance", self.tolerance)?;
        if self.density <= 0.0 {
            return Err(invalid("density", self.density));
        }
        if self.viscosity <= 0.0 {
            return Err(invalid("viscosity", self.viscosity));
        }
        if self.speed_of_sound < 0.0 {
            return Err(invalid("speed of sound", self.speed_of_sound));
        }
        if self.tolerance <= 0.0 {
            return Err(invalid("tolerance", self.tolerance));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Freestream speed and shaft speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub airspeed_m_s: f64,
    pub omega_rad_s: f64,
}

impl OperatingPoint {
    pub fn new(airspeed_m_s: f64, omega_rad_s: f64) -> Self {
        Self {
            airspeed_m_s,
            omega_rad_s,
        }
    }

    pub fn from_rpm(airspeed_m_s: f64, rpm: f64) -> Self {
        Self::new(airspeed_m_s, rpm_to_rad_s(rpm))
    }

    pub fn rpm(&self) -> f64 {
        rad_s_to_rpm(self.omega_rad_s)
    }

    fn validate(&self) -> Result<(), SolverError> {
        check_finite("airspeed", self.airspeed_m_s)?;
        check_finite("rotational speed", self.omega_rad_s)
    }
}

/// Solve every station of `rotor` at `point` and integrate the loads.
pub fn solve(
    rotor: &Rotor,
    point: &OperatingPoint,
    settings: &SolverSettings,
) -> Result<RotorPerformance, SolverError> {
    settings.validate()?;
    point.validate()?;
    Ok(solve_validated(rotor, point, settings))
}

/// Solve a list of operating points in parallel; results keep the input order.
pub fn sweep(
    rotor: &Rotor,
    points: &[OperatingPoint],
    settings: &SolverSettings,
) -> Result<Vec<RotorPerformance>, SolverError> {
    settings.validate()?;
    for point in points {
        point.validate()?;
    }
    debug!(points = points.len(), "starting sweep");

    let results = points
        .par_iter()
        .map(|point| solve_validated(rotor, point, settings))
        .collect();
    Ok(results)
}

fn solve_validated(
    rotor: &Rotor,
    point: &OperatingPoint,
    settings: &SolverSettings,
) -> RotorPerformance {
    let omega = point.omega_rad_s;
    let tip_radius = rotor.tip_radius();
    let blades = f64::from(rotor.blades());

    let mut stations: Vec<StationPerformance> = rotor
        .sections()
        .iter()
        .map(|section| {
            StationModel {
                section,
                axial_speed: point.airspeed_m_s,
                tangential_speed: omega.abs() * section.radius,
                tip_radius,
                blades,
                settings,
            }
            .solve()
        })
        .collect();

    // geometry is handed for the direction of rotation; only the reaction torque flips
    if omega < 0.0 {
        for station in &mut stations {
            station.dq_dr = -station.dq_dr;
        }
    }

    let (quadrature, thrust, torque) = integrate(rotor, &stations);
    let (thrust, torque) = (blades * thrust, blades * torque);
    let power = torque * omega;

    let diameter = rotor.diameter();
    let revs = omega.abs() / (2.0 * PI);
    let (ct, cp, advance_ratio) = if revs > 0.0 {
        let rho_n2 = settings.density * revs * revs;
        (
            thrust / (rho_n2 * diameter.powi(4)),
            2.0 * PI * torque / (rho_n2 * diameter.powi(5)),
            point.airspeed_m_s / (revs * diameter),
        )
    } else if point.airspeed_m_s == 0.0 {
        (0.0, 0.0, 0.0)
    } else {
        (0.0, 0.0, f64::INFINITY)
    };

    let performance = RotorPerformance {
        airspeed_m_s: point.airspeed_m_s,
        omega_rad_s: omega,
        thrust_n: thrust,
        torque_nm: torque,
        power_w: power,
        ct,
        cp,
        advance_ratio,
        quadrature,
        stations,
    };

    let unconverged = performance.unconverged_stations();
    if unconverged.is_empty() {
        debug!(
            airspeed = point.airspeed_m_s,
            rpm = point.rpm(),
            thrust,
            torque,
            max_residual = performance.max_residual(),
            "operating point converged"
        );
    } else {
        warn!(
            airspeed = point.airspeed_m_s,
            rpm = point.rpm(),
            stations = ?unconverged,
            "operating point has unconverged stations"
        );
    }
    performance
}

/// Per-blade thrust and torque from the spanwise distributions.
fn integrate(rotor: &Rotor, stations: &[StationPerformance]) -> (Quadrature, f64, f64) {
    let sections = rotor.sections();
    if rotor.has_panel_widths() {
        let (thrust, torque) = sections
            .iter()
            .zip(stations)
            .fold((0.0, 0.0), |(t, q), (section, station)| {
                let width = section.width.unwrap_or(0.0);
                (t + station.dt_dr * width, q + station.dq_dr * width)
            });
        return (Quadrature::Panel, thrust, torque);
    }

    let (thrust, torque) = stations
        .windows(2)
        .fold((0.0, 0.0), |(t, q), pair| {
            let dr = pair[1].radius_m - pair[0].radius_m;
            (
                t + 0.5 * (pair[0].dt_dr + pair[1].dt_dr) * dr,
                q + 0.5 * (pair[0].dq_dr + pair[1].dq_dr) * dr,
            )
        });
    (Quadrature::Trapezoidal, thrust, torque)
}

fn check_finite(name: &str, value: f64) -> Result<(), SolverError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, value))
    }
}

fn invalid(name: &str, value: f64) -> SolverError {
    SolverError::InvalidInput(format!("{name} = {value} is out of range"))
}
