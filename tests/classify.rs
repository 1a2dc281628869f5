use henon_explorer::core::classify::{classify, classify_grids, AttractorClass, DEFAULT_TOLERANCE};
use henon_explorer::grid::{Axis, Grid};

#[test]
fn classification_is_total() {
    let eps = DEFAULT_TOLERANCE;
    let exponents = [
        f64::NEG_INFINITY,
        -2.0,
        -1.0,
        -eps - 1e-12,
        -eps,
        -eps / 2.0,
        0.0,
        eps / 2.0,
        eps,
        eps + 1e-12,
        1.0,
        f64::INFINITY,
        f64::NAN,
    ];
    for &l1 in &exponents {
        for &l2 in &exponents {
            for t in [0.0, eps, 0.2] {
                let c = classify(Some(l1), Some(l2), t);
                assert!(c.code() <= 5);
            }
        }
        assert_eq!(classify(Some(l1), None, eps), AttractorClass::NoAttractor);
    }
}

#[test]
fn equal_and_zero_exponents() {
    let eps = DEFAULT_TOLERANCE;
    assert_eq!(classify(Some(-0.5), Some(-0.5), eps), AttractorClass::PointDegenerate);
    assert_eq!(classify(Some(0.0), Some(0.0), eps), AttractorClass::Periodic);
    assert_eq!(classify(Some(0.0), Some(-3.0), eps), AttractorClass::Periodic);
    assert_eq!(classify(Some(-eps), Some(-1.0), eps), AttractorClass::Periodic);
    assert_eq!(classify(Some(eps), Some(-1.0), eps), AttractorClass::Periodic);
}

#[test]
fn missing_cells_become_no_attractor() {
    let rows = Axis::new("a", 1.0, 1.5, 1);
    let cols = Axis::new("b", 0.0, 0.5, 3);
    let max =
        Grid::from_cells(rows.clone(), cols.clone(), vec![Some(0.42), None, Some(-0.3)]).unwrap();
    let min = Grid::from_cells(rows, cols, vec![Some(-1.62), Some(-1.0), Some(-0.9)]).unwrap();
    let classes = classify_grids(&max, &min, DEFAULT_TOLERANCE).unwrap();
    assert_eq!(classes.cells(), &[Some(3.0), Some(5.0), Some(0.0)]);
    assert_eq!(classes.rows(), max.rows());
}
