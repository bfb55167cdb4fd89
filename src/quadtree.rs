//! Quadtree spatial index for exact nearest-neighbor hit-testing
//!
//! The index is built once over the full dataset and is immutable afterwards:
//! point positions never move, so the tree never needs rebalancing. Queries
//! always run against the complete unsampled dataset, independent of whatever
//! level-of-detail subset is currently being drawn.

use crate::store::PointStore;
use geo::{Coord, Rect};

/// Leaf occupancy above which a node is subdivided
const MAX_LEAF_POINTS: usize = 16;

/// Hard subdivision limit so coincident points terminate
const MAX_DEPTH: u32 = 32;

/// Padding applied to degenerate (zero-extent) root bounds
const DEGENERATE_PAD: f64 = 0.5;

/// Point quadtree keyed by data-space coordinates
///
/// Each stored entry carries a back-reference to a [`crate::Point`]'s stable
/// index, which is the only thing queries return.
#[derive(Debug)]
pub struct SpatialIndex {
    root: Option<QuadtreeNode>,
    len: usize,
}

/// A single node, either a leaf holding points or an internal node with
/// exactly four children
#[derive(Debug)]
struct QuadtreeNode {
    bounding_box: Rect<f64>,
    depth: u32,
    points: Vec<(Coord<f64>, usize)>,
    children: Option<Box<[QuadtreeNode; 4]>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl SpatialIndex {
    /// Build an index over the full dataset, average O(n log n)
    ///
    /// An empty dataset builds an empty index whose queries return `None`.
    pub fn build(store: &PointStore) -> Self {
        // Profile index construction separately from ingestion
        #[cfg(feature = "profiling")]
        profiling::scope!("quadtree::build");

        let Some(bbox) = store.bounding_box() else {
            return Self { root: None, len: 0 };
        };

        let mut root = QuadtreeNode::new(pad_degenerate(bbox), 0);
        let mut len = 0;
        for point in store.iter_all() {
            root.insert(
                Coord {
                    x: point.x,
                    y: point.y,
                },
                point.index,
            );
            len += 1;
        }

        tracing::debug!("Built spatial index over {} points", len);
        Self {
            root: Some(root),
            len,
        }
    }

    /// Find the index of the point nearest to `query` in Euclidean distance
    ///
    /// Returns the mathematically exact nearest point by descending into the
    /// quadrant containing the query first and pruning quadrants whose
    /// bounding box cannot beat the best distance found so far. Returns `None`
    /// only if the dataset is empty.
    pub fn nearest(&self, query: (f64, f64)) -> Option<usize> {
        // Per-query profiling scope; this is the hit-testing hot path
        #[cfg(feature = "profiling")]
        profiling::scope!("quadtree::nearest");

        let root = self.root.as_ref()?;
        let q = Coord {
            x: query.0,
            y: query.1,
        };
        let mut best: Option<(f64, usize)> = None;
        root.nearest(q, &mut best);
        best.map(|(_, index)| index)
    }

    /// Number of indexed points
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl QuadtreeNode {
    fn new(bounding_box: Rect<f64>, depth: u32) -> Self {
        Self {
            bounding_box,
            depth,
            points: Vec::new(),
            children: None,
        }
    }

    /// Insert a point, subdividing when the leaf occupancy threshold is hit
    fn insert(&mut self, coord: Coord<f64>, index: usize) {
        if let Some(children) = &mut self.children {
            let mid = self.bounding_box.center();
            children[quadrant_of(mid, coord)].insert(coord, index);
            return;
        }

        self.points.push((coord, index));

        if self.points.len() > MAX_LEAF_POINTS && self.depth < MAX_DEPTH {
            self.subdivide();
        }
    }

    /// Split this leaf into four children and redistribute its points
    fn subdivide(&mut self) {
        let min = self.bounding_box.min();
        let max = self.bounding_box.max();
        let mid = self.bounding_box.center();
        let child_depth = self.depth + 1;

        // Child order matches quadrant_of: SW, SE, NW, NE
        let mut children = Box::new([
            QuadtreeNode::new(
                Rect::new(min, mid),
                child_depth,
            ),
            QuadtreeNode::new(
                Rect::new(
                    Coord { x: mid.x, y: min.y },
                    Coord { x: max.x, y: mid.y },
                ),
                child_depth,
            ),
            QuadtreeNode::new(
                Rect::new(
                    Coord { x: min.x, y: mid.y },
                    Coord { x: mid.x, y: max.y },
                ),
                child_depth,
            ),
            QuadtreeNode::new(
                Rect::new(mid, max),
                child_depth,
            ),
        ]);

        for (coord, index) in std::mem::take(&mut self.points) {
            children[quadrant_of(mid, coord)].insert(coord, index);
        }
        self.children = Some(children);
    }

    /// Best-first descent with bounding-box distance pruning
    fn nearest(&self, q: Coord<f64>, best: &mut Option<(f64, usize)>) {
        if let Some((best_sq, _)) = best
            && min_dist_sq(self.bounding_box, q) > *best_sq
        {
            return;
        }

        match &self.children {
            Some(children) => {
                // Visit nearer quadrants first so pruning kicks in early
                let mut order: [(f64, usize); 4] = [(0.0, 0); 4];
                for (i, child) in children.iter().enumerate() {
                    order[i] = (min_dist_sq(child.bounding_box, q), i);
                }
                order.sort_by(|a, b| a.0.total_cmp(&b.0));

                for (dist_sq, i) in order {
                    if let Some((best_sq, _)) = best
                        && dist_sq > *best_sq
                    {
                        break;
                    }
                    children[i].nearest(q, best);
                }
            }
            None => {
                for (coord, index) in &self.points {
                    let dx = coord.x - q.x;
                    let dy = coord.y - q.y;
                    let dist_sq = dx * dx + dy * dy;
                    if best.is_none_or(|(best_sq, _)| dist_sq < best_sq) {
                        *best = Some((dist_sq, *index));
                    }
                }
            }
        }
    }
}

/// Quadrant index for a coordinate relative to a cell midpoint
///
/// Points exactly on a midline are routed to the high quadrant; routing only
/// needs to be deterministic, not geometrically unique.
#[inline]
fn quadrant_of(mid: Coord<f64>, coord: Coord<f64>) -> usize {
    (usize::from(coord.x >= mid.x)) | (usize::from(coord.y >= mid.y) << 1)
}

/// Squared distance from a point to the nearest edge of a rect (0 inside)
#[inline]
fn min_dist_sq(rect: Rect<f64>, q: Coord<f64>) -> f64 {
    let dx = (rect.min().x - q.x).max(q.x - rect.max().x).max(0.0);
    let dy = (rect.min().y - q.y).max(q.y - rect.max().y).max(0.0);
    dx * dx + dy * dy
}

/// Expand zero-extent axes so a single point (or a collinear set) still gets
/// a subdividable root cell
fn pad_degenerate(bbox: Rect<f64>) -> Rect<f64> {
    let mut min = bbox.min();
    let mut max = bbox.max();
    if max.x - min.x <= 0.0 {
        min.x -= DEGENERATE_PAD;
        max.x += DEGENERATE_PAD;
    }
    if max.y - min.y <= 0.0 {
        min.y -= DEGENERATE_PAD;
        max.y += DEGENERATE_PAD;
    }
    Rect::new(min, max)
}
