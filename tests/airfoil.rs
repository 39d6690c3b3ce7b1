use std::f64::consts::FRAC_PI_2;

use rotor_performance::airfoil::analytic::{SAMPLE_ALPHA_DEG, SAMPLE_REYNOLDS};
use rotor_performance::airfoil::polar::FLAT_PLATE_CD;
use rotor_performance::airfoil::{
    Airfoil, AnalyticPolar, Polar, PolarError, compressibility_correction,
};
use rotor_performance::units::deg_to_rad;

fn graupner_params() -> AnalyticPolar {
    AnalyticPolar {
        cl0: 0.50,
        cl_alpha: 5.8,
        cl_min: -0.3,
        cl_max: 1.2,
        cd0: 0.028,
        cd2_upper: 0.050,
        cd2_lower: 0.020,
        cl_cd0: 0.5,
        re_ref: 70_000.0,
        re_exp: -0.7,
    }
}

fn flat_polar(re: f64, cl: f64) -> Polar {
    Polar::new(
        re,
        vec![-0.2, 0.0, 0.2],
        vec![cl, cl, cl],
        vec![0.02, 0.01, 0.02],
    )
    .expect("flat polar")
}

#[test]
fn polar_rejects_malformed_tables() {
    assert!(matches!(
        Polar::new(0.0, vec![0.0], vec![0.1], vec![0.01]),
        Err(PolarError::InvalidReynolds(_))
    ));
    assert!(matches!(
        Polar::new(1e5, vec![], vec![], vec![]),
        Err(PolarError::EmptyPolar { .. })
    ));
    assert!(matches!(
        Polar::new(1e5, vec![0.0, 0.1], vec![0.1], vec![0.01, 0.02]),
        Err(PolarError::LengthMismatch { .. })
    ));
    assert!(matches!(
        Polar::new(1e5, vec![0.0, 0.1], vec![0.1, f64::NAN], vec![0.01, 0.02]),
        Err(PolarError::NonFiniteSample { index: 1, .. })
    ));
    assert!(matches!(
        Polar::new(1e5, vec![0.0, 0.1, 0.1], vec![0.1; 3], vec![0.01; 3]),
        Err(PolarError::NonIncreasingAlpha { index: 2, .. })
    ));
}

#[test]
fn polar_interpolates_inside_the_table() {
    let polar = Polar::new(
        1e5,
        vec![0.0, 0.1, 0.2],
        vec![0.2, 0.6, 0.8],
        vec![0.010, 0.014, 0.020],
    )
    .expect("polar");

    let mid = polar.sample(0.05);
    assert!((mid.cl - 0.4).abs() < 1e-12);
    assert!((mid.cd - 0.012).abs() < 1e-12);
    assert!(mid.alpha_in_range);

    let node = polar.sample(0.1);
    assert!((node.cl - 0.6).abs() < 1e-12);
    let first = polar.sample(0.0);
    assert_eq!(first.cl, 0.2);
    assert!(first.alpha_in_range);
}

#[test]
fn polar_blends_drag_towards_flat_plate_outside_the_table() {
    let polar = flat_polar(1e5, 0.3);

    let at_minus_ninety = polar.sample(-FRAC_PI_2);
    assert_eq!(at_minus_ninety.cl, 0.3);
    assert!((at_minus_ninety.cd - FLAT_PLATE_CD).abs() < 1e-12);
    assert!(!at_minus_ninety.alpha_in_range);
    assert!(at_minus_ninety.is_extrapolated());

    let halfway_low = polar.sample(0.5 * (-FRAC_PI_2 - 0.2));
    assert!((halfway_low.cd - 0.5 * (FLAT_PLATE_CD + 0.02)).abs() < 1e-12);

    let at_plus_ninety = polar.sample(FRAC_PI_2);
    assert_eq!(at_plus_ninety.cl, 0.3);
    assert!((at_plus_ninety.cd - FLAT_PLATE_CD).abs() < 1e-12);

    let beyond = polar.sample(2.0);
    assert!(beyond.cd.is_finite());
    assert!(beyond.cd > FLAT_PLATE_CD);
}

#[test]
fn tabulated_airfoil_blends_between_reynolds_numbers() {
    let airfoil = Airfoil::tabulated("flat", vec![flat_polar(2e5, 1.0), flat_polar(1e5, 0.5)])
        .expect("airfoil");
    assert_eq!(airfoil.reynolds_range(), Some((1e5, 2e5)));
    assert_eq!(airfoil.polars()[0].reynolds(), 1e5);

    let mid = airfoil.coefficients(0.0, 1.5e5, 0.0);
    assert!((mid.cl - 0.75).abs() < 1e-12);
    assert!(!mid.is_extrapolated());

    let low = airfoil.coefficients(0.0, 5e4, 0.0);
    assert!((low.cl - 0.5).abs() < 1e-12);
    assert!(!low.reynolds_in_range);

    let high = airfoil.coefficients(0.0, 1e6, 0.0);
    assert!((high.cl - 1.0).abs() < 1e-12, "no extrapolation in Re");
    assert!(high.is_extrapolated());
}

#[test]
fn single_polar_airfoil_ignores_reynolds() {
    let airfoil = Airfoil::tabulated("single", vec![flat_polar(1e5, 0.4)]).expect("airfoil");
    for re in [1e3, 1e5, 1e7] {
        let c = airfoil.coefficients(0.1, re, 0.0);
        assert!((c.cl - 0.4).abs() < 1e-12);
        assert!((c.cd - 0.015).abs() < 1e-12);
    }
}

#[test]
fn tabulated_airfoil_rejects_duplicate_and_missing_polars() {
    assert!(matches!(
        Airfoil::tabulated("dup", vec![flat_polar(1e5, 0.1), flat_polar(1e5, 0.2)]),
        Err(PolarError::DuplicateReynolds(re)) if re == 1e5
    ));
    assert!(matches!(
        Airfoil::tabulated("empty", Vec::new()),
        Err(PolarError::NoPolars)
    ));
}

#[test]
fn mach_correction_scales_lift_only_below_the_limit() {
    assert_eq!(compressibility_correction(0.8, 0.0), 0.8);
    assert!((compressibility_correction(0.8, 0.6) - 1.0).abs() < 1e-12);
    assert_eq!(compressibility_correction(0.8, 0.995), 0.8);

    let airfoil = Airfoil::tabulated("flat", vec![flat_polar(1e5, 0.4)]).expect("airfoil");
    let still = airfoil.coefficients(0.0, 1e5, 0.0);
    let fast = airfoil.coefficients(0.0, 1e5, 0.6);
    assert!((fast.cl - still.cl / 0.8).abs() < 1e-12);
    assert_eq!(fast.cd, still.cd);
}

#[test]
fn analytic_lift_stays_within_limits() {
    let params = graupner_params();
    let airfoil = Airfoil::analytic("graupner", params).expect("analytic");
    for k in -180..=180 {
        let alpha = deg_to_rad(k as f64);
        let c = airfoil.coefficients(alpha, 70_000.0, 0.0);
        assert!(c.cl >= params.cl_min && c.cl <= params.cl_max, "CL at {k} deg");
        assert!(c.cd > 0.0 && c.cd.is_finite());
        assert!(!c.is_extrapolated());
    }
}

#[test]
fn analytic_drag_follows_reynolds_power_law() {
    let params = graupner_params();
    // CL0 equals CLCD0, so alpha = 0 sits at the drag bucket
    let (cl, cd_ref) = params.evaluate(0.0, params.re_ref);
    assert!((cl - 0.5).abs() < 1e-12);
    assert!((cd_ref - params.cd0).abs() < 1e-12);

    let (_, cd_high) = params.evaluate(0.0, 4.0 * params.re_ref);
    assert!((cd_high - params.cd0 * 4f64.powf(params.re_exp)).abs() < 1e-12);

    let (cl_stall, cd_stall) = params.evaluate(deg_to_rad(30.0), params.re_ref);
    assert_eq!(cl_stall, params.cl_max);
    let excess = params.cl_max - params.cl_cd0;
    assert!(cd_stall > params.cd0 + params.cd2_upper * excess * excess + 0.4);
}

#[test]
fn analytic_parameters_are_validated() {
    let mut params = graupner_params();
    params.cl_alpha = 0.0;
    assert!(matches!(
        Airfoil::analytic("bad", params),
        Err(PolarError::InvalidAnalytic(_))
    ));

    let mut params = graupner_params();
    params.cl_min = 2.0;
    assert!(Airfoil::analytic("bad", params).is_err());

    let mut params = graupner_params();
    params.re_ref = -1.0;
    assert!(Airfoil::sampled_analytic("bad", params).is_err());
}

#[test]
fn sampled_analytic_matches_closed_form_on_the_grid() {
    let params = graupner_params();
    let sampled = Airfoil::sampled_analytic("graupner", params).expect("sampled");
    assert_eq!(sampled.polars().len(), SAMPLE_REYNOLDS.len());
    assert_eq!(sampled.polars()[0].len(), SAMPLE_ALPHA_DEG.len());
    assert!(sampled.analytic_params().is_none());

    for &re in &SAMPLE_REYNOLDS {
        for &deg in &SAMPLE_ALPHA_DEG {
            let alpha = deg_to_rad(deg);
            let grid = sampled.coefficients(alpha, re, 0.0);
            let (cl, cd) = params.evaluate(alpha, re);
            assert!((grid.cl - cl).abs() < 1e-12, "CL at Re {re}, {deg} deg");
            assert!((grid.cd - cd).abs() < 1e-12, "CD at Re {re}, {deg} deg");
        }
    }
}
