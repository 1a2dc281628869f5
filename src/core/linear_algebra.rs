//! Fixed-size 2D vector/matrix kernel used by the tangent-space propagation.

use super::error::{HenonError, HenonResult};

pub type Vec2 = [f64; 2];
pub type Mat2 = [[f64; 2]; 2];

/// Relative size below which an orthogonalized vector counts as collapsed.
/// Compared on squared norms, so this is a ratio of 1e-12 in length.
pub const DEGENERACY_RATIO_SQ: f64 = 1e-24;

pub fn dot(v1: &Vec2, v2: &Vec2) -> f64 {
    v1[0] * v2[0] + v1[1] * v2[1]
}

pub fn norm_squared(v: &Vec2) -> f64 {
    dot(v, v)
}

pub fn norm(v: &Vec2) -> f64 {
    // hypot avoids overflow for large components
    v[0].hypot(v[1])
}

pub fn scale(v: &Vec2, factor: f64) -> Vec2 {
    [v[0] * factor, v[1] * factor]
}

pub fn sub(v1: &Vec2, v2: &Vec2) -> Vec2 {
    [v1[0] - v2[0], v1[1] - v2[1]]
}

pub fn mat_vec(m: &Mat2, v: &Vec2) -> Vec2 {
    // Multiplies a 2x2 matrix with a column vector
    [
        m[0][0] * v[0] + m[0][1] * v[1],
        m[1][0] * v[0] + m[1][1] * v[1],
    ]
}

pub fn standard_basis() -> [Vec2; 2] {
    [[1.0, 0.0], [0.0, 1.0]]
}

/// Projection of `v` onto the line spanned by `onto`.
pub fn project(onto: &Vec2, v: &Vec2) -> HenonResult<Vec2> {
    let denom = norm_squared(onto);
    if denom == 0.0 || !denom.is_finite() {
        return Err(HenonError::degenerate(0));
    }
    Ok(scale(onto, dot(onto, v) / denom))
}

/// Unit vector in the direction of `v`, together with the original length.
pub fn normalize(v: &Vec2) -> HenonResult<(Vec2, f64)> {
    let n = norm(v);
    if n == 0.0 || !n.is_finite() {
        return Err(HenonError::degenerate(0));
    }
    Ok((scale(v, 1.0 / n), n))
}

/// Classical Gram-Schmidt without normalization.
///
/// Vector `i` of the output is input `i` minus its projections onto every
/// already-orthogonalized output `0..i`. Any output whose length collapses
/// relative to its input is reported as `DegenerateGeometry` carrying the
/// offending index; with more than two inputs in R² this always happens.
pub fn gram_schmidt(vectors: &[Vec2]) -> HenonResult<Vec<Vec2>> {
    let mut basis: Vec<Vec2> = Vec::with_capacity(vectors.len());

    for (i, v) in vectors.iter().enumerate() {
        let mut u = *v;
        for prev in &basis {
            let p = project(prev, v).map_err(|_| HenonError::degenerate(i))?;
            u = sub(&u, &p);
        }

        let input_sq = norm_squared(v);
        let output_sq = norm_squared(&u);
        if input_sq == 0.0 || !output_sq.is_finite() || output_sq <= DEGENERACY_RATIO_SQ * input_sq
        {
            return Err(HenonError::degenerate(i));
        }
        basis.push(u);
    }

    Ok(basis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn dot_and_norm() {
        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
        assert_eq!(norm_squared(&[3.0, 4.0]), 25.0);
        assert!(approx_eq(norm(&[3.0, 4.0]), 5.0, 1e-15));
    }

    #[test]
    fn mat_vec_2x2() {
        let m = [[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(mat_vec(&m, &[5.0, 6.0]), [17.0, 39.0]);
    }

    #[test]
    fn project_onto_axis() {
        let p = project(&[2.0, 0.0], &[3.0, 5.0]).expect("projection ok");
        assert_eq!(p, [3.0, 0.0]);
    }

    #[test]
    fn project_onto_zero_is_degenerate() {
        let err = project(&[0.0, 0.0], &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, HenonError::DegenerateGeometry { .. }));
    }

    #[test]
    fn gram_schmidt_orthogonalizes_in_input_order() {
        let out = gram_schmidt(&[[1.0, 1.0], [1.0, 0.0]]).expect("independent vectors");
        assert_eq!(out[0], [1.0, 1.0]);
        assert!(approx_eq(dot(&out[0], &out[1]), 0.0, 1e-15));
        assert!(approx_eq(out[1][0], 0.5, 1e-15));
        assert!(approx_eq(out[1][1], -0.5, 1e-15));
    }

    #[test]
    fn gram_schmidt_rejects_parallel_vectors() {
        let err = gram_schmidt(&[[1.0, 2.0], [2.0, 4.0]]).unwrap_err();
        assert!(matches!(
            err,
            HenonError::DegenerateGeometry { index: 1, .. }
        ));
    }

    #[test]
    fn gram_schmidt_rejects_third_vector_in_plane() {
        let err = gram_schmidt(&[[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]).unwrap_err();
        assert!(matches!(
            err,
            HenonError::DegenerateGeometry { index: 2, .. }
        ));
    }

    #[test]
    fn normalize_returns_length() {
        let (u, n) = normalize(&[0.0, -2.0]).expect("non-zero");
        assert_eq!(u, [0.0, -1.0]);
        assert_eq!(n, 2.0);
    }
}
