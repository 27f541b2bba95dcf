//! Pipe sizing behaviour against the PVC catalog.

use proptest::prelude::*;
use sf_hydraulics::cross_section::{fill_angle, shape_factor, strickler_discharge};
use sf_hydraulics::{
    CommercialPipeCatalog, HydraulicsError, PipeSizingSolver, SizingConfig, solve_fill_angle,
};

const STRICKLER: f64 = 80.0;

fn pvc_solver() -> PipeSizingSolver {
    PipeSizingSolver::new(SizingConfig::default(), CommercialPipeCatalog::pvc()).unwrap()
}

#[test]
fn gentle_slope_is_raised_to_self_cleansing_minimum() {
    let solver = pvc_solver();
    let (q, natural) = (0.03, 0.002);

    let first = solver
        .catalog
        .select(solver.trial_diameter(q, natural, STRICKLER))
        .unwrap();
    let expected = solver.min_slope(first.inner);
    assert!(natural < expected);

    let design = solver.size(q, natural, STRICKLER).unwrap();
    assert!(design.min_slope_enforced);
    assert_eq!(design.slope, expected);
}

#[test]
fn steep_slope_is_kept() {
    let design = pvc_solver().size(0.03, 0.02, STRICKLER).unwrap();
    assert!(!design.min_slope_enforced);
    assert_eq!(design.slope, 0.02);
}

#[test]
fn sized_pipe_carries_design_discharge() {
    let design = pvc_solver().size(0.2, 0.01, STRICKLER).unwrap();
    let capacity = strickler_discharge(
        design.size.inner.value,
        fill_angle(0.8),
        STRICKLER,
        design.slope,
    );
    assert!(capacity >= 0.2);
    // Solved angle reproduces the discharge within the bisection tolerance
    let at_solved = strickler_discharge(
        design.size.inner.value,
        design.fill_angle,
        STRICKLER,
        design.slope,
    );
    assert!((at_solved - 0.2).abs() / 0.2 < 0.02);
}

#[test]
fn discharge_beyond_catalog_is_out_of_range() {
    let err = pvc_solver().size(5.0, 0.01, STRICKLER).unwrap_err();
    assert!(matches!(err, HydraulicsError::OutOfCatalogRange { .. }));
    assert!(!err.is_nonconvergence());
}

proptest! {
    #[test]
    fn larger_discharge_never_shrinks_the_pipe(
        q in 0.001_f64..0.3,
        extra in 0.0_f64..0.05,
        slope in 0.005_f64..0.05,
    ) {
        let solver = pvc_solver();
        let small = solver.size(q, slope, STRICKLER).unwrap();
        let large = solver.size(q + extra, slope, STRICKLER).unwrap();
        prop_assert!(large.size.inner >= small.size.inner);
    }

    #[test]
    fn bisection_recovers_constructed_angle(target in 0.3_f64..4.3) {
        let cfg = SizingConfig::default();
        let start = fill_angle(cfg.fill_coefficient);
        let found = solve_fill_angle(shape_factor(target), start, &cfg).unwrap();
        prop_assert!((found - target).abs() < 0.005);
    }
}
