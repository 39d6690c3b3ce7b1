use std::io::Write;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use rotor_performance::case::{Case, load_cases};
use rotor_performance::export::distributions::{self, Metadata};
use rotor_performance::export::performance::{Record, write_header, writer_for_path};
use rotor_performance::solver::{RotorPerformance, sweep};
use rotor_performance::units::{rad_s_to_rpm, rad_to_deg};
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Evaluate propeller performance cases and write the results as CSV.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Propeller performance solver (blade-element / vortex theory)"
)]
struct Cli {
    /// Case file (YAML or TOML) or a directory of case files
    #[arg(long)]
    case: PathBuf,

    /// Output CSV file (use '-' for stdout)
    #[arg(long, default_value = "artifacts/performance.csv")]
    output: PathBuf,

    /// Directory for per-station JSON distributions, one file per case
    #[arg(long)]
    distributions: Option<PathBuf>,

    /// Print the per-station table of every operating point
    #[arg(long, default_value_t = false)]
    stations: bool,

    /// Fail when any station does not converge
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let cases = load_cases(&cli.case)?;
    let to_stdout = cli.output.as_os_str() == "-";

    let mut writer = writer_for_path(&cli.output)?;
    write_header(writer.as_mut())?;

    let mut unconverged_points = 0;
    for case in &cases {
        let results = sweep(&case.rotor, &case.points, &case.settings)?;
        for performance in &results {
            Record::new(&case.name, performance).write_to(writer.as_mut())?;
            let unconverged = performance.unconverged_stations();
            if !unconverged.is_empty() {
                unconverged_points += 1;
                warn!(
                    case = %case.name,
                    airspeed = performance.airspeed_m_s,
                    stations = ?unconverged,
                    "stations did not converge"
                );
            }
        }

        if let Some(dir) = &cli.distributions {
            let path = dir.join(format!("{}_stations.json", case.name));
            let meta = Metadata {
                case: &case.name,
                diameter_m: case.rotor.diameter(),
                blades: case.rotor.blades(),
                stations: case.rotor.len(),
            };
            distributions::write_sidecar(&path, &meta, &results)?;
        }

        if !to_stdout {
            print_summary(case, &results, cli.stations);
        }
    }
    writer.flush()?;

    if !to_stdout {
        println!("Wrote {}", cli.output.display());
    }
    if cli.strict && unconverged_points > 0 {
        bail!("{unconverged_points} operating point(s) have unconverged stations");
    }
    Ok(())
}

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_summary(case: &Case, results: &[RotorPerformance], stations: bool) {
    println!("=== {} ===", case.name);
    println!(
        "D = {:.4} m, B = {}, {} stations",
        case.rotor.diameter(),
        case.rotor.blades(),
        case.rotor.len()
    );
    for p in results {
        let efficiency = p
            .efficiency()
            .map(|eta| format!("{:.3}", eta))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "U = {:7.3} m/s  rpm = {:8.1}  T = {:9.5} N  Q = {:9.6} N·m  P = {:9.3} W  CT = {:.5}  CP = {:.5}  J = {:.4}  eta = {}{}",
            p.airspeed_m_s,
            rad_s_to_rpm(p.omega_rad_s),
            p.thrust_n,
            p.torque_nm,
            p.power_w,
            p.ct,
            p.cp,
            p.advance_ratio,
            efficiency,
            if p.is_converged() { "" } else { "  (unconverged)" }
        );
        if stations {
            println!(
                "  {:>8} {:>8} {:>8} {:>10} {:>8} {:>8} {:>10} {:>10} {:>10}",
                "r [m]", "alpha", "phi", "Re", "CL", "CD", "dT/dr", "dQ/dr", "residual"
            );
            for s in &p.stations {
                println!(
                    "  {:8.4} {:8.3} {:8.3} {:10.0} {:8.4} {:8.5} {:10.4} {:10.6} {:10.2e}{}",
                    s.radius_m,
                    rad_to_deg(s.alpha_rad),
                    rad_to_deg(s.inflow_angle_rad),
                    s.reynolds,
                    s.cl,
                    s.cd,
                    s.dt_dr,
                    s.dq_dr,
                    s.residual,
                    if s.converged { "" } else { " *" }
                );
            }
        }
    }
}
