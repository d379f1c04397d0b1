use kurbo::{Point, Rect};

/// `bounds` must be the element's bounding box at the time of the event; it is
/// never cached since the element can move or resize between events.
pub fn element_relative(client: Point, bounds: Rect) -> Point {
    client - bounds.origin().to_vec2()
}

pub fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

pub fn separation(a: Point, b: Point) -> f64 {
    a.distance(b)
}
