//! Tests for region contour tracing

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};
    use seamtile::analysis::contours::{BoundaryTracer, ContourTracer};
    use seamtile::spatial::buffer::Point;

    fn corners(points: &[Point]) -> Vec<(i64, i64)> {
        let mut out: Vec<(i64, i64)> = points.iter().map(|p| (p.x as i64, p.y as i64)).collect();
        out.sort_unstable();
        out
    }

    // Tests that a uniform block yields one square loop without collinear points
    // Verified by skipping drop_collinear in trace
    #[test]
    fn test_single_region_square() {
        let labels = Array2::<usize>::zeros((2, 2));
        let regions = BoundaryTracer.trace(&labels);
        assert_eq!(regions.len(), 1);
        let region = regions.first().cloned().unwrap_or_else(|| panic!("no region"));
        assert_eq!(region.label, 0);
        assert_eq!(region.area, 4);
        assert_eq!(region.loops.len(), 1);
        let ring = region.loops.first().cloned().unwrap_or_default();
        assert_eq!(corners(&ring), vec![(0, 0), (0, 2), (2, 0), (2, 2)]);
    }

    // Tests that an enclosed region produces a hole loop in its surrounding region
    #[test]
    fn test_hole_loops() {
        let labels = array![[0, 0, 0], [0, 1, 0], [0, 0, 0]];
        let regions = BoundaryTracer.trace(&labels);
        assert_eq!(regions.len(), 2);

        let outer = regions.first().cloned().unwrap_or_else(|| panic!("no outer region"));
        assert_eq!(outer.label, 0);
        assert_eq!(outer.area, 8);
        assert_eq!(outer.loops.len(), 2);
        let mut loop_corners: Vec<Vec<(i64, i64)>> = outer.loops.iter().map(|l| corners(l)).collect();
        loop_corners.sort();
        assert!(loop_corners.contains(&vec![(0, 0), (0, 3), (3, 0), (3, 3)]));
        assert!(loop_corners.contains(&vec![(1, 1), (1, 2), (2, 1), (2, 2)]));

        let inner = regions.get(1).cloned().unwrap_or_else(|| panic!("no inner region"));
        assert_eq!(inner.label, 1);
        assert_eq!(inner.area, 1);
        assert_eq!(inner.loops.len(), 1);
    }

    // Tests that same-label components stay separate and are ordered by label then position
    #[test]
    fn test_component_ordering() {
        let labels = array![[1, 0, 1], [1, 0, 0]];
        let regions = BoundaryTracer.trace(&labels);
        let summary: Vec<(usize, usize)> = regions.iter().map(|r| (r.label, r.area)).collect();
        assert_eq!(summary, vec![(0, 3), (1, 2), (1, 1)]);
    }

    #[test]
    fn test_diagonal_pixels_are_not_connected() {
        let labels = array![[0, 1], [1, 0]];
        let regions = BoundaryTracer.trace(&labels);
        assert_eq!(regions.len(), 4);
        assert!(regions.iter().all(|r| r.area == 1 && r.loops.len() == 1));
        assert!(regions.iter().flat_map(|r| &r.loops).all(|l| l.len() == 4));
    }

    #[test]
    fn test_empty_label_map() {
        let labels = Array2::<usize>::zeros((0, 0));
        assert!(BoundaryTracer.trace(&labels).is_empty());
    }
}
