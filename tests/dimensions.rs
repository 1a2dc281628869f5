use henon_explorer::core::dimensions::{
    box_count, box_counting_dimension, information_dimension, Region,
};
use henon_explorer::core::henon::{iterate, HenonParams, Point2D};
use henon_explorer::core::trapping::Quadrilateral;

fn attractor() -> Vec<Point2D> {
    let orbit = iterate(Point2D::ORIGIN, HenonParams::default(), 101_000, None);
    orbit.trajectory().tail(1001).to_vec()
}

#[test]
fn classic_attractor_dimensions() {
    let points = attractor();
    assert_eq!(points.len(), 100_000);

    let boxes = box_counting_dimension(&points, &Region::CLASSIC, 3..=8).unwrap();
    assert!(
        (1.15..=1.35).contains(&boxes.dimension),
        "box-counting dimension {}",
        boxes.dimension
    );
    assert_eq!(boxes.samples.len(), 6);

    let info = information_dimension(&points, &Region::CLASSIC, 3..=8).unwrap();
    assert!(
        (1.15..=1.35).contains(&info.dimension),
        "information dimension {}",
        info.dimension
    );
    assert!(info.dimension <= boxes.dimension + 0.05);
}

#[test]
fn occupied_boxes_grow_with_level() {
    let points = attractor();
    let counts: Vec<usize> = (2..=7)
        .map(|k| box_count(&points, &Region::CLASSIC, k).unwrap())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] < w[1]), "{counts:?}");
}

#[test]
fn attractor_lies_in_trapping_region() {
    let q = Quadrilateral::HENON;
    assert!(attractor().iter().all(|p| q.contains(*p)));
    let images = q.images(HenonParams::default(), 50, 4).unwrap();
    assert_eq!(images.len(), 4);
    assert!(images.iter().all(|ring| ring.iter().all(|p| q.contains(*p))));
}
