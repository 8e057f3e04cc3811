//! Shoelace area helpers
//!
//! Areas are returned doubled so integer vertices stay exact.

use super::types::Vertex;

/// Twice the signed area of a ring. Positive for counter-clockwise rings
/// in a y-up frame.
pub fn signed_doubled_area(ring: &[Vertex]) -> i64 {
    if ring.len() < 3 {
        return 0;
    }
    let mut sum = 0i64;
    let mut prev = ring[ring.len() - 1];
    for &v in ring {
        sum += (prev.x as i64) * (v.y as i64) - (v.x as i64) * (prev.y as i64);
        prev = v;
    }
    sum
}

/// Twice the unsigned area of a ring
pub fn ring_doubled_area(ring: &[Vertex]) -> i64 {
    signed_doubled_area(ring).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: u16, y0: u16, x1: u16, y1: u16) -> Vec<Vertex> {
        vec![
            Vertex::new(x0, y0),
            Vertex::new(x1, y0),
            Vertex::new(x1, y1),
            Vertex::new(x0, y1),
        ]
    }

    #[test]
    fn test_rectangle_area() {
        let ring = rect(0, 0, 10, 5);
        assert_eq!(signed_doubled_area(&ring), 100);

        let mut reversed = ring.clone();
        reversed.reverse();
        assert_eq!(signed_doubled_area(&reversed), -100);
        assert_eq!(ring_doubled_area(&reversed), 100);
    }

    #[test]
    fn test_degenerate_ring_has_no_area() {
        assert_eq!(ring_doubled_area(&[Vertex::new(1, 1), Vertex::new(5, 5)]), 0);
    }
}
