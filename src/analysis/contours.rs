//! Region contour extraction over a label map
//!
//! `ContourTracer` is the seam where alternative contour algorithms plug in. The default
//! `BoundaryTracer` splits the label map into 4-connected components and walks the crack
//! edges between pixels, producing one closed loop per outer boundary and per hole.

use std::collections::{HashMap, VecDeque};

use ndarray::Array2;

use crate::spatial::buffer::Point;

/// Closed polygon loops covering one connected region of a single label
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Palette index shared by every pixel of the region
    pub label: usize,
    /// Pixel count
    pub area: usize,
    /// Outer boundary and hole loops, each implicitly closed
    pub loops: Vec<Vec<Point>>,
}

/// Produces closed point sequences for every colour region of a label map
pub trait ContourTracer {
    /// Trace all regions, ordered by label then by position
    fn trace(&self, labels: &Array2<usize>) -> Vec<Region>;
}

/// Crack-edge tracer over 4-connected components
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryTracer;

type GridPoint = (i64, i64);
type Segment = (GridPoint, GridPoint);

struct Component {
    label: usize,
    area: usize,
    min_x: usize,
    min_y: usize,
}

impl ContourTracer for BoundaryTracer {
    fn trace(&self, labels: &Array2<usize>) -> Vec<Region> {
        let (components, component_grid) = label_components(labels);
        let segments = boundary_segments(&component_grid, components.len());

        let mut regions: Vec<(usize, usize, Region)> = components
            .iter()
            .zip(segments)
            .map(|(component, segments)| {
                let loops = chain_loops(segments)
                    .into_iter()
                    .map(|ring| drop_collinear(&ring))
                    .filter(|ring| ring.len() >= 3)
                    .collect();
                (
                    component.min_y,
                    component.min_x,
                    Region {
                        label: component.label,
                        area: component.area,
                        loops,
                    },
                )
            })
            .collect();

        regions.sort_by(|a, b| {
            a.2.label
                .cmp(&b.2.label)
                .then(a.0.cmp(&b.0))
                .then(a.1.cmp(&b.1))
        });
        regions.into_iter().map(|(_, _, region)| region).collect()
    }
}

fn label_components(labels: &Array2<usize>) -> (Vec<Component>, Array2<usize>) {
    let (height, width) = labels.dim();
    let mut component_grid = Array2::from_elem((height, width), usize::MAX);
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for ((start_y, start_x), &label) in labels.indexed_iter() {
        if component_grid.get((start_y, start_x)).copied() != Some(usize::MAX) {
            continue;
        }
        let id = components.len();
        let mut component = Component {
            label,
            area: 0,
            min_x: start_x,
            min_y: start_y,
        };
        if let Some(cell) = component_grid.get_mut((start_y, start_x)) {
            *cell = id;
        }
        queue.push_back((start_x, start_y));

        while let Some((x, y)) = queue.pop_front() {
            component.area += 1;
            component.min_x = component.min_x.min(x);
            component.min_y = component.min_y.min(y);

            let neighbors = [
                x.checked_sub(1).map(|nx| (nx, y)),
                (x + 1 < width).then_some((x + 1, y)),
                y.checked_sub(1).map(|ny| (x, ny)),
                (y + 1 < height).then_some((x, y + 1)),
            ];
            for (nx, ny) in neighbors.into_iter().flatten() {
                let unvisited = component_grid.get((ny, nx)).copied() == Some(usize::MAX);
                if unvisited && labels.get((ny, nx)).copied() == Some(label) {
                    if let Some(cell) = component_grid.get_mut((ny, nx)) {
                        *cell = id;
                    }
                    queue.push_back((nx, ny));
                }
            }
        }
        components.push(component);
    }

    (components, component_grid)
}

fn boundary_segments(component_grid: &Array2<usize>, count: usize) -> Vec<Vec<Segment>> {
    let mut segments = vec![Vec::new(); count];
    let (height, width) = component_grid.dim();
    let differs = |x: Option<usize>, y: Option<usize>, id: usize| match (x, y) {
        (Some(nx), Some(ny)) if nx < width && ny < height => {
            component_grid.get((ny, nx)).copied() != Some(id)
        }
        _ => true,
    };

    for ((y, x), &id) in component_grid.indexed_iter() {
        let Some(list) = segments.get_mut(id) else {
            continue;
        };
        let (px, py) = (x as i64, y as i64);
        // Clockwise in image coordinates: top, right, bottom, left
        if differs(Some(x), y.checked_sub(1), id) {
            list.push(((px, py), (px + 1, py)));
        }
        if differs(Some(x + 1), Some(y), id) {
            list.push(((px + 1, py), (px + 1, py + 1)));
        }
        if differs(Some(x), Some(y + 1), id) {
            list.push(((px + 1, py + 1), (px, py + 1)));
        }
        if differs(x.checked_sub(1), Some(y), id) {
            list.push(((px, py + 1), (px, py)));
        }
    }
    segments
}

const fn direction_rank(from: GridPoint, to: GridPoint) -> u8 {
    match (to.0 - from.0, to.1 - from.1) {
        (1, 0) => 0,
        (0, 1) => 1,
        (-1, 0) => 2,
        (0, -1) => 3,
        _ => 4,
    }
}

fn chain_loops(mut segments: Vec<Segment>) -> Vec<Vec<GridPoint>> {
    segments.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| direction_rank(a.0, a.1).cmp(&direction_rank(b.0, b.1)))
    });

    let mut starts: HashMap<GridPoint, Vec<usize>> = HashMap::new();
    for (index, segment) in segments.iter().enumerate() {
        starts.entry(segment.0).or_default().push(index);
    }

    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();
    for first in 0..segments.len() {
        if used.get(first).copied().unwrap_or(true) {
            continue;
        }
        let Some(&(loop_start, _)) = segments.get(first) else {
            continue;
        };
        let mut ring = vec![loop_start];
        let mut current = loop_start;

        for _ in 0..=segments.len() {
            let next = starts.get(&current).and_then(|outgoing| {
                outgoing
                    .iter()
                    .copied()
                    .find(|&candidate| !used.get(candidate).copied().unwrap_or(true))
            });
            let Some(selected) = next else {
                break;
            };
            if let Some(flag) = used.get_mut(selected) {
                *flag = true;
            }
            let Some(&(_, end)) = segments.get(selected) else {
                break;
            };
            current = end;
            if current == loop_start {
                break;
            }
            ring.push(end);
        }

        if ring.len() >= 4 {
            loops.push(ring);
        }
    }
    loops
}

fn drop_collinear(ring: &[GridPoint]) -> Vec<Point> {
    let len = ring.len();
    let mut kept = Vec::with_capacity(len);
    for (i, &current) in ring.iter().enumerate() {
        let prev = ring.get((i + len - 1) % len).copied().unwrap_or(current);
        let next = ring.get((i + 1) % len).copied().unwrap_or(current);
        let straight = (prev.0 == current.0 && current.0 == next.0)
            || (prev.1 == current.1 && current.1 == next.1);
        if !straight {
            kept.push(Point::new(current.0 as f64, current.1 as f64));
        }
    }
    kept
}
