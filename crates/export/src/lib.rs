//! Export helpers for CSV and JSON artifacts.

pub mod performance {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    use rotor_core::units::rad_s_to_rpm;
    use rotor_solver::RotorPerformance;

    pub const HEADER: &str = "case,airspeed_m_s,rpm,omega_rad_s,thrust_n,torque_nm,power_w,ct,cp,advance_ratio,efficiency,converged,unconverged_stations,max_residual";

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Write the performance CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One operating point of the performance table.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub case: &'a str,
        pub airspeed_m_s: f64,
        pub omega_rad_s: f64,
        pub thrust_n: f64,
        pub torque_nm: f64,
        pub power_w: f64,
        pub ct: f64,
        pub cp: f64,
        pub advance_ratio: f64,
        pub efficiency: Option<f64>,
        pub unconverged_stations: usize,
        pub max_residual: f64,
    }

    impl<'a> Record<'a> {
        pub fn new(case: &'a str, performance: &RotorPerformance) -> Self {
            Self {
                case,
                airspeed_m_s: performance.airspeed_m_s,
                omega_rad_s: performance.omega_rad_s,
                thrust_n: performance.thrust_n,
                torque_nm: performance.torque_nm,
                power_w: performance.power_w,
                ct: performance.ct,
                cp: performance.cp,
                advance_ratio: performance.advance_ratio,
                efficiency: performance.efficiency(),
                unconverged_stations: performance.unconverged_stations().len(),
                max_residual: performance.max_residual(),
            }
        }

        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            let efficiency = self
                .efficiency
                .map(|eta| format!("{:.6}", eta))
                .unwrap_or_default();
            writeln!(
                writer,
                "{},{:.3},{:.1},{:.4},{:.6},{:.6},{:.4},{:.6},{:.6},{:.6},{},{},{},{:.3e}",
                self.case,
                self.airspeed_m_s,
                rad_s_to_rpm(self.omega_rad_s),
                self.omega_rad_s,
                self.thrust_n,
                self.torque_nm,
                self.power_w,
                self.ct,
                self.cp,
                self.advance_ratio,
                efficiency,
                if self.unconverged_stations == 0 { "true" } else { "false" },
                self.unconverged_stations,
                self.max_residual,
            )
        }
    }
}

pub mod distributions {
    use std::fs::{self, File};
    use std::io;
    use std::path::Path;

    use chrono::{SecondsFormat, Utc};
    use rotor_solver::RotorPerformance;
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    /// Rotor description carried alongside the distributions.
    #[derive(Debug)]
    pub struct Metadata<'a> {
        pub case: &'a str,
        pub diameter_m: f64,
        pub blades: u32,
        pub stations: usize,
    }

    #[derive(Serialize)]
    struct Sidecar<'a> {
        case: &'a str,
        generated_at: String,
        diameter_m: f64,
        blades: u32,
        stations: usize,
        points: Vec<PointEntry<'a>>,
    }

    #[derive(Serialize)]
    struct PointEntry<'a> {
        efficiency: Option<f64>,
        converged: bool,
        #[serde(flatten)]
        performance: &'a RotorPerformance,
    }

    /// Write per-station distributions of every operating point as pretty JSON.
    pub fn write_sidecar(
        output: &Path,
        meta: &Metadata<'_>,
        results: &[RotorPerformance],
    ) -> io::Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let sidecar = Sidecar {
            case: meta.case,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            diameter_m: meta.diameter_m,
            blades: meta.blades,
            stations: meta.stations,
            points: results
                .iter()
                .map(|performance| PointEntry {
                    efficiency: performance.efficiency(),
                    converged: performance.is_converged(),
                    performance,
                })
                .collect(),
        };

        to_writer_pretty(File::create(output)?, &sidecar)?;
        Ok(())
    }
}
