//! Point-count normalization so two shapes can be blended pointwise.
//!
//! Shorter shapes are padded with ghost copies of their last point. An empty
//! shape has nothing to copy and stays empty; such a pair cannot be blended
//! and callers hold the earlier shape instead.

use crate::data::Shape;

/// Pad `shape` to `target_len` points. Never truncates.
pub fn normalize(shape: &Shape, target_len: usize) -> Shape {
    let Some(last) = shape.last().copied() else {
        return shape.clone();
    };
    if shape.len() >= target_len {
        return shape.clone();
    }
    let pad = target_len - shape.len();
    shape
        .iter()
        .copied()
        .chain(std::iter::repeat(last.ghost()).take(pad))
        .collect()
}

/// Normalize both shapes to their common maximum length.
///
/// Returns `None` when exactly one side is empty.
pub fn normalize_pair(a: &Shape, b: &Shape) -> Option<(Shape, Shape)> {
    if a.is_empty() != b.is_empty() {
        return None;
    }
    let len = a.len().max(b.len());
    Some((normalize(a, len), normalize(b, len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Point;

    #[test]
    fn pads_with_ghost_copies_of_last_point() {
        let shape = Shape::from_coords(&[(0.0, 0.0), (3.0, 4.0)]);
        let out = normalize(&shape, 4);
        assert_eq!(out.len(), 4);
        assert_eq!(out.get(1), Some(&Point::new(3.0, 4.0)));
        assert_eq!(out.get(2), Some(&Point::new(3.0, 4.0).ghost()));
        assert_eq!(out.get(3), Some(&Point::new(3.0, 4.0).ghost()));
    }

    #[test]
    fn identity_at_own_length() {
        let shape = Shape::from_coords(&[(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(normalize(&shape, shape.len()), shape);
    }

    #[test]
    fn idempotent() {
        let shape = Shape::from_coords(&[(1.0, 2.0)]);
        let once = normalize(&shape, 3);
        assert_eq!(normalize(&once, 3), once);
    }

    #[test]
    fn never_truncates() {
        let shape = Shape::from_coords(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]);
        assert_eq!(normalize(&shape, 1), shape);
    }

    #[test]
    fn empty_stays_empty() {
        assert!(normalize(&Shape::new(), 3).is_empty());
    }

    #[test]
    fn pair_with_one_empty_side_is_not_blendable() {
        let one = Shape::from_coords(&[(1.0, 1.0)]);
        assert!(normalize_pair(&Shape::new(), &one).is_none());
        assert!(normalize_pair(&one, &Shape::new()).is_none());
        let (a, b) = normalize_pair(&Shape::new(), &Shape::new()).unwrap();
        assert!(a.is_empty() && b.is_empty());
    }
}
