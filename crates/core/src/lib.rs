//! Core units, constants, and shared primitives for the rotor performance workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Sea-level standard air density (kg/m³).
    pub const AIR_DENSITY: f64 = 1.225;
    /// Dynamic viscosity of air at 15 °C (Pa·s).
    pub const AIR_VISCOSITY: f64 = 1.81e-5;
    /// Sea-level speed of sound (m/s). Solvers default to 0 (no Mach correction).
    pub const SPEED_OF_SOUND: f64 = 340.0;
    /// Metres per inch.
    pub const INCH_M: f64 = 0.0254;
}

/// Basic unit conversion helpers.
pub mod units {
    use std::f64::consts::PI;

    use super::constants::INCH_M;

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(deg: f64) -> f64 {
        deg * PI / 180.0
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(rad: f64) -> f64 {
        rad * 180.0 / PI
    }

    /// Convert revolutions per minute to radians per second.
    #[inline]
    pub fn rpm_to_rad_s(rpm: f64) -> f64 {
        rpm * PI / 30.0
    }

    /// Convert radians per second to revolutions per minute.
    #[inline]
    pub fn rad_s_to_rpm(omega: f64) -> f64 {
        omega * 30.0 / PI
    }

    /// Convert inches to metres.
    #[inline]
    pub fn inch_to_m(v: f64) -> f64 {
        v * INCH_M
    }
}

/// Piecewise-linear interpolation helpers shared by the polar store and the geometry.
pub mod interp {
    /// Line through `(x1, y1)`-`(x2, y2)` evaluated at `xq`; returns `y1` for a
    /// degenerate segment. Extrapolates linearly outside `[x1, x2]`.
    #[inline]
    pub fn lerp(x1: f64, y1: f64, x2: f64, y2: f64, xq: f64) -> f64 {
        if x2 == x1 {
            return y1;
        }
        y1 + (xq - x1) * (y2 - y1) / (x2 - x1)
    }

    /// Index `i` of the segment `xs[i - 1] < x <= xs[i]` in a strictly ascending slice.
    ///
    /// Returns `None` when `x` is at or below the first sample or above the last one.
    #[inline]
    pub fn bracket(xs: &[f64], x: f64) -> Option<usize> {
        let first = *xs.first()?;
        let last = *xs.last()?;
        if x <= first || x > last {
            return None;
        }
        Some(xs.partition_point(|&v| v < x))
    }

    /// Piecewise-linear interpolation of `ys(xs)` at `x`, clamped to the end values.
    pub fn linear_clamped(xs: &[f64], ys: &[f64], x: f64) -> f64 {
        match bracket(xs, x) {
            Some(i) => lerp(xs[i - 1], ys[i - 1], xs[i], ys[i], x),
            None if x <= xs[0] => ys[0],
            None => ys[ys.len() - 1],
        }
    }
}
