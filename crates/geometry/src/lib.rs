//! Blade geometry: radial stations, rotor validation, and spanwise resampling.

use std::sync::Arc;

use rotor_airfoil::Airfoil;
use rotor_core::interp::linear_clamped;
use thiserror::Error;

/// Relative slack allowed when checking station radii against the tip radius.
const TIP_RADIUS_SLACK: f64 = 1e-9;

/// Errors raised by malformed rotor definitions or resampling requests.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid geometry: rotor diameter must be finite and positive, got {0}")]
    InvalidDiameter(f64),
    #[error("invalid geometry: blade count must be at least 1")]
    InvalidBladeCount,
    #[error("invalid geometry: rotor has no sections")]
    NoSections,
    #[error("invalid geometry: section {index} has {field} = {value}")]
    InvalidSection {
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[error("invalid geometry: section radii must increase strictly (section {index})")]
    NonIncreasingRadius { index: usize },
    #[error("invalid geometry: section {index} at r = {radius} m lies beyond the tip radius {tip} m")]
    BeyondTip { index: usize, radius: f64, tip: f64 },
    #[error("invalid geometry: a single station needs a panel width to span the blade")]
    SingleStationWithoutWidth,
    #[error("invalid geometry: refinement needs at least 2 stations, got {0}")]
    TooFewStations(usize),
    #[error("invalid geometry: cannot resample a blade with a single radial station")]
    DegenerateSpan,
}

/// One radial blade station.
#[derive(Debug, Clone)]
pub struct Section {
    /// Chord length (m).
    pub chord: f64,
    /// Twist angle (rad).
    pub twist: f64,
    /// Radial position (m).
    pub radius: f64,
    /// Width of the panel centred on this station (m), when the blade is described
    /// as a set of panels rather than a set of stations.
    pub width: Option<f64>,
    pub airfoil: Arc<Airfoil>,
}

impl Section {
    pub fn new(chord: f64, twist: f64, radius: f64, airfoil: Arc<Airfoil>) -> Self {
        Self {
            chord,
            twist,
            radius,
            width: None,
            airfoil,
        }
    }

    /// Same station treated as the centre of a panel of the given width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}

/// A rotor: diameter, blade count, and the stations of one blade from hub to tip.
#[derive(Debug, Clone)]
pub struct Rotor {
    diameter: f64,
    blades: u32,
    sections: Vec<Section>,
}

impl Rotor {
    /// Validate and assemble a rotor.
    ///
    /// A blade described by a single station must give that station a panel width.
    pub fn new(diameter: f64, blades: u32, sections: Vec<Section>) -> Result<Self, GeometryError> {
        if !diameter.is_finite() || diameter <= 0.0 {
            return Err(GeometryError::InvalidDiameter(diameter));
        }
        if blades == 0 {
            return Err(GeometryError::InvalidBladeCount);
        }
        if sections.is_empty() {
            return Err(GeometryError::NoSections);
        }

        let tip = 0.5 * diameter;
        for (index, section) in sections.iter().enumerate() {
            check_section(index, section)?;
            if section.radius > tip * (1.0 + TIP_RADIUS_SLACK) {
                return Err(GeometryError::BeyondTip {
                    index,
                    radius: section.radius,
                    tip,
                });
            }
        }
        if let Some(index) = sections
            .windows(2)
            .position(|w| w[1].radius <= w[0].radius)
        {
            return Err(GeometryError::NonIncreasingRadius { index: index + 1 });
        }
        // the trapezoidal rule needs two stations
        if sections.len() == 1 && sections[0].width.is_none() {
            return Err(GeometryError::SingleStationWithoutWidth);
        }

        Ok(Self {
            diameter,
            blades,
            sections,
        })
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn blades(&self) -> u32 {
        self.blades
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of radial stations.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Tip radius `D / 2` used by the tip-loss model.
    pub fn tip_radius(&self) -> f64 {
        0.5 * self.diameter
    }

    /// Radius of the innermost station.
    pub fn hub_radius(&self) -> f64 {
        self.sections[0].radius
    }

    /// Radius of the outermost station.
    pub fn outer_radius(&self) -> f64 {
        self.sections[self.sections.len() - 1].radius
    }

    /// True when every station carries a panel width.
    pub fn has_panel_widths(&self) -> bool {
        self.sections.iter().all(|s| s.width.is_some())
    }

    /// A new rotor with `n` equally spaced stations between the hub and outer radius.
    ///
    /// Chord and twist are interpolated linearly against the existing stations; each new
    /// station takes the airfoil of the nearest existing station (ties go inboard). The
    /// result carries no panel widths. `self` is left untouched.
    pub fn refine(&self, n: usize) -> Result<Rotor, GeometryError> {
        if n < 2 {
            return Err(GeometryError::TooFewStations(n));
        }
        if self.sections.len() < 2 {
            return Err(GeometryError::DegenerateSpan);
        }

        let radii: Vec<f64> = self.sections.iter().map(|s| s.radius).collect();
        let chords: Vec<f64> = self.sections.iter().map(|s| s.chord).collect();
        let twists: Vec<f64> = self.sections.iter().map(|s| s.twist).collect();
        let (r_min, r_max) = (self.hub_radius(), self.outer_radius());
        let step = (r_max - r_min) / (n - 1) as f64;

        let sections = (0..n)
            .map(|i| {
                let r = if i == n - 1 {
                    r_max
                } else {
                    r_min + i as f64 * step
                };
                let nearest = &self.sections[nearest_station(&radii, r)];
                Section::new(
                    linear_clamped(&radii, &chords, r),
                    linear_clamped(&radii, &twists, r),
                    r,
                    Arc::clone(&nearest.airfoil),
                )
            })
            .collect();

        Rotor::new(self.diameter, self.blades, sections)
    }
}

fn check_section(index: usize, section: &Section) -> Result<(), GeometryError> {
    let invalid = |field, value| GeometryError::InvalidSection {
        index,
        field,
        value,
    };
    if !section.chord.is_finite() || section.chord <= 0.0 {
        return Err(invalid("chord", section.chord));
    }
    if !section.twist.is_finite() {
        return Err(invalid("twist", section.twist));
    }
    if !section.radius.is_finite() || section.radius < 0.0 {
        return Err(invalid("radius", section.radius));
    }
    if let Some(width) = section.width {
        if !width.is_finite() || width <= 0.0 {
            return Err(invalid("width", width));
        }
    }
    Ok(())
}

fn nearest_station(radii: &[f64], r: f64) -> usize {
    let upper = radii.partition_point(|&v| v < r);
    if upper == 0 {
        return 0;
    }
    if upper == radii.len() {
        return radii.len() - 1;
    }
    if r - radii[upper - 1] <= radii[upper] - r {
        upper - 1
    } else {
        upper
    }
}
