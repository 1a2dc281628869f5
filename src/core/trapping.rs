//! Trapping region of the classic map: a quadrilateral mapped into itself.

use serde::{Deserialize, Serialize};

use super::error::{HenonError, HenonResult};
use super::henon::{iterate_points, HenonParams, Point2D};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub vertices: [Point2D; 4],
}

impl Quadrilateral {
    /// Encloses the attractor for a = 1.4, b = 0.3.
    pub const HENON: Quadrilateral = Quadrilateral {
        vertices: [
            Point2D { x: -1.33, y: 0.42 },
            Point2D { x: 1.32, y: 0.133 },
            Point2D { x: 1.245, y: -0.14 },
            Point2D { x: -1.06, y: -0.5 },
        ],
    };

    fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        (0..4).map(move |i| (self.vertices[i], self.vertices[(i + 1) % 4]))
    }

    /// Point-in-convex-polygon test; points on an edge count as inside.
    pub fn contains(&self, p: Point2D) -> bool {
        let mut sign = 0.0_f64;
        for (u, v) in self.edges() {
            let cross = (v.x - u.x) * (p.y - u.y) - (v.y - u.y) * (p.x - u.x);
            if cross == 0.0 {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    /// Closed ring of `per_edge` evenly spaced points on every edge, starting
    /// at each vertex.
    pub fn boundary(&self, per_edge: usize) -> Vec<Point2D> {
        let mut ring = Vec::with_capacity(4 * per_edge);
        for (u, v) in self.edges() {
            for k in 0..per_edge {
                let t = k as f64 / per_edge as f64;
                ring.push(Point2D::new(u.x + t * (v.x - u.x), u.y + t * (v.y - u.y)));
            }
        }
        ring
    }

    /// Boundary images after 1..=n applications of the map.
    pub fn images(
        &self,
        params: HenonParams,
        per_edge: usize,
        n: usize,
    ) -> HenonResult<Vec<Vec<Point2D>>> {
        if per_edge == 0 {
            return Err(HenonError::precondition("boundary needs at least one point per edge"));
        }
        Ok(iterate_points(&self.boundary(per_edge), params, n))
    }

    /// Whether the sampled boundary maps into the region.
    ///
    /// The map is a homeomorphism for b ≠ 0, so a boundary mapped inside
    /// implies the whole region is.
    pub fn maps_into_itself(&self, params: HenonParams, per_edge: usize) -> HenonResult<bool> {
        let images = self.images(params, per_edge, 1)?;
        Ok(images
            .first()
            .is_some_and(|ring| ring.iter().all(|p| self.contains(*p))))
    }
}
