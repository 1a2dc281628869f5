use henon_explorer::core::classify::{
    classify_pair, lyapunov_dimension, AttractorClass, DEFAULT_TOLERANCE,
};
use henon_explorer::core::henon::{iterate, HenonParams, Point2D};
use henon_explorer::core::lyapunov::{estimate, estimate_for, Estimate, LyapunovSettings};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

fn settings(iterations: usize, cut: usize) -> LyapunovSettings {
    LyapunovSettings {
        start: Point2D::ORIGIN,
        iterations,
        cut,
        threshold: None,
    }
}

#[test]
fn iteration_is_deterministic() {
    let a = iterate(Point2D::new(0.1, -0.2), HenonParams::default(), 5000, Some(1e3));
    let b = iterate(Point2D::new(0.1, -0.2), HenonParams::default(), 5000, Some(1e3));
    assert_eq!(a, b);
}

#[test]
fn exponents_agree_between_10k_and_20k_steps() {
    let p = HenonParams::default();
    let short = estimate_for(p, &settings(11_000, 1000)).unwrap().pair().unwrap();
    let long = estimate_for(p, &settings(21_000, 1000)).unwrap().pair().unwrap();
    assert!(approx_eq(short.max(), long.max(), 1e-2), "{short:?} vs {long:?}");
    assert!(approx_eq(short.min(), long.min(), 1e-2), "{short:?} vs {long:?}");
}

#[test]
fn classic_attractor_is_chaotic() {
    let p = HenonParams::new(1.4, 0.3).unwrap();
    let pair = estimate_for(p, &settings(100_000, 1000)).unwrap().pair().unwrap();
    assert!(pair.max() > 0.0);
    assert!(pair.min() < 0.0);
    assert!(approx_eq(pair.max(), 0.42, 0.01), "{pair:?}");
    assert!(approx_eq(pair.min(), -1.62, 0.01), "{pair:?}");

    let class = classify_pair(Some(pair), DEFAULT_TOLERANCE);
    assert!(matches!(class.code(), 3 | 4), "got {class}");
    assert_eq!(class, AttractorClass::Chaotic);

    let d = lyapunov_dimension(pair);
    assert!(approx_eq(d, 1.26, 0.02), "Kaplan-Yorke dimension {d}");
}

#[test]
fn a_equal_one_is_not_chaotic() {
    let p = HenonParams::new(1.0, 0.3).unwrap();
    let pair = estimate_for(p, &settings(20_000, 1000)).unwrap().pair().unwrap();
    assert!(pair.max() <= DEFAULT_TOLERANCE, "{pair:?}");
    let class = classify_pair(Some(pair), DEFAULT_TOLERANCE);
    assert!(class.code() <= 2, "got {class}");
    assert!(!class.is_chaotic());
}

#[test]
fn exponent_sum_is_log_abs_b() {
    for (a, b) in [(1.4, 0.3), (1.2, 0.3), (1.0, 0.2)] {
        let p = HenonParams::new(a, b).unwrap();
        let pair = estimate_for(p, &settings(5000, 500)).unwrap().pair().unwrap();
        assert!(approx_eq(pair.sum(), b.ln(), 1e-9), "a = {a}, b = {b}: {pair:?}");
    }
}

#[test]
fn divergence_is_flagged_not_truncated() {
    let p = HenonParams::new(2.0, 0.3).unwrap();
    let orbit = iterate(Point2D::ORIGIN, p, 1000, Some(1e3));
    let step = orbit.diverged_at().expect("escapes");
    assert!(step < 1000);
    assert!(orbit.completed().is_none());
    assert_eq!(
        estimate(&orbit, 100, p).unwrap(),
        Estimate::Undefined { diverged_at: step }
    );
    let class = classify_pair(None, DEFAULT_TOLERANCE);
    assert_eq!(class.code(), 5);
}
