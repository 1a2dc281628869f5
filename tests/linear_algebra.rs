use henon_explorer::core::linear_algebra::{dot, gram_schmidt, mat_vec, norm, normalize, project};
use henon_explorer::core::HenonError;

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn matvec_2x2() {
    let m = [[1.0, 2.0], [3.0, 4.0]];
    assert_eq!(mat_vec(&m, &[5.0, 6.0]), [17.0, 39.0]);
}

#[test]
fn projection_onto_axis() {
    let p = project(&[2.0, 0.0], &[3.0, 4.0]).expect("projection ok");
    assert!(approx_eq(p[0], 3.0, 1e-12));
    assert!(approx_eq(p[1], 0.0, 1e-12));
}

#[test]
fn gram_schmidt_outputs_are_orthogonal() {
    let pairs = [
        [[1.0, 0.0], [1.0, 1.0]],
        [[3.0, 1.0], [2.0, 2.0]],
        [[-2.8, 0.3], [1.0, 0.0]],
        [[1e-3, 5.0], [7.0, -2.0]],
    ];
    for input in pairs {
        let out = gram_schmidt(&input).expect("independent vectors");
        assert_eq!(out.len(), 2);
        // first vector passes through unchanged
        assert_eq!(out[0], input[0]);
        let cos = dot(&out[0], &out[1]) / (norm(&out[0]) * norm(&out[1]));
        assert!(approx_eq(cos, 0.0, 1e-12), "{input:?} -> {out:?}");
    }
}

#[test]
fn parallel_vectors_are_degenerate() {
    let err = gram_schmidt(&[[1.0, 2.0], [2.0, 4.0]]).unwrap_err();
    assert!(matches!(err, HenonError::DegenerateGeometry { index: 1, .. }));
    assert!(normalize(&[0.0, 0.0]).is_err());
}

#[test]
fn normalize_returns_length() {
    let (unit, len) = normalize(&[3.0, 4.0]).unwrap();
    assert!(approx_eq(len, 5.0, 1e-12));
    assert!(approx_eq(norm(&unit), 1.0, 1e-12));
}
