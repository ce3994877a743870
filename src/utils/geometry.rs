//! Box geometry shared by every layout stage.
//!
//! All functions are total: degenerate boxes have zero area and every ratio
//! with a zero denominator is reported as 0.0.

use crate::core::types::BoundingBox;

/// Area of a box (0.0 for degenerate boxes)
#[inline]
pub fn area(b: &BoundingBox) -> f64 {
    (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0)
}

/// Area shared by two boxes, 0.0 when they are disjoint or only touch
pub fn intersection_area(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    if x2 <= x1 || y2 <= y1 {
        return 0.0;
    }

    (x2 - x1) * (y2 - y1)
}

/// Intersection over union
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let intersection = intersection_area(a, b);
    let union = area(a) + area(b) - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Fraction of `b` covered by `a` (intersection / area of `b`).
///
/// Directional: `containment_ratio(a, b) != containment_ratio(b, a)` in general.
pub fn containment_ratio(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let b_area = area(b);
    if b_area > 0.0 {
        intersection_area(a, b) / b_area
    } else {
        0.0
    }
}

/// Center point `(cx, cy)`
#[inline]
pub fn centroid(b: &BoundingBox) -> (f64, f64) {
    ((b.x1 + b.x2) / 2.0, (b.y1 + b.y2) / 2.0)
}

/// Squared distance between two box centers
pub fn centroid_distance_sq(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let (ax, ay) = centroid(a);
    let (bx, by) = centroid(b);
    (ax - bx).powi(2) + (ay - by).powi(2)
}

/// Width of the horizontal overlap between two boxes (0.0 if none)
pub fn horizontal_overlap(a: &BoundingBox, b: &BoundingBox) -> f64 {
    (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0)
}
