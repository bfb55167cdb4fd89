//! Point storage module
//!
//! This module provides the `PointStore` struct owning the immutable dataset
//! together with the single mutable selection slot. Point positions never move
//! after construction; the only mutation the store permits is moving the
//! selection from one index to another.

use geo::Rect;

/// A single data point with its stable identity and selection flag
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Position on the data-space X axis
    pub x: f64,
    /// Position on the data-space Y axis
    pub y: f64,
    /// Stable identity assigned at dataset creation, never reused or reordered
    pub index: usize,
    /// Whether this point is the current selection
    pub selected: bool,
}

/// Owner of the dataset and the at-most-one-selected invariant
///
/// The dataset is append-only at construction and indexed by `Point::index`
/// in O(1). Selection may only be changed through [`PointStore::select`] and
/// [`PointStore::clear_selection`], which keep the flags and the cached
/// selected index consistent.
#[derive(Clone, Debug)]
pub struct PointStore {
    points: Vec<Point>,
    selected: Option<usize>,
    /// Precomputed data-space bounding box (None if empty)
    bounding_box: Option<Rect<f64>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PointStore {
    /// Create a store from raw `(x, y)` coordinates
    ///
    /// Indices are assigned in input order. Non-finite coordinates cannot be
    /// indexed or projected meaningfully and are skipped with a warning.
    pub fn from_coords<I>(coords: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        // Profile dataset ingestion (filtering + bounding box computation)
        #[cfg(feature = "profiling")]
        profiling::scope!("store::from_coords");

        let mut points = Vec::new();
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for (x, y) in coords {
            if !x.is_finite() || !y.is_finite() {
                tracing::warn!("Skipping non-finite point: ({}, {})", x, y);
                continue;
            }

            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            points.push(Point {
                x,
                y,
                index: points.len(),
                selected: false,
            });
        }

        let bounding_box = if points.is_empty() {
            None
        } else {
            Some(Rect::new(
                geo::Coord { x: min_x, y: min_y },
                geo::Coord { x: max_x, y: max_y },
            ))
        };

        Self {
            points,
            selected: None,
            bounding_box,
        }
    }

    /// Get a point by its stable index
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    /// Number of points in the dataset
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the dataset is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over all points in index order
    #[inline]
    pub fn iter_all(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Get the data-space bounding box
    ///
    /// Returns `None` if the dataset is empty.
    #[inline]
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        self.bounding_box
    }

    /// Index of the currently selected point, if any
    #[inline]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Move the selection to `index`, clearing any previous selection
    ///
    /// Returns the previously selected index. Out-of-range indices leave the
    /// selection untouched.
    pub(crate) fn select(&mut self, index: usize) -> Option<usize> {
        if index >= self.points.len() {
            return self.selected;
        }

        let previous = self.selected;
        if let Some(prev) = previous {
            self.set_selected(prev, false);
        }
        self.set_selected(index, true);
        self.selected = Some(index);
        previous
    }

    /// Clear the selection, if any
    pub(crate) fn clear_selection(&mut self) {
        if let Some(prev) = self.selected.take() {
            self.set_selected(prev, false);
        }
    }

    /// Flip a single selection flag; callers must keep `self.selected` in sync
    #[inline]
    fn set_selected(&mut self, index: usize, selected: bool) {
        if let Some(point) = self.points.get_mut(index) {
            point.selected = selected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_input_order() {
        let store = PointStore::from_coords(vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]);

        assert_eq!(store.len(), 3);
        for (i, point) in store.iter_all().enumerate() {
            assert_eq!(point.index, i);
            assert!(!point.selected);
        }
        assert_eq!(store.get(1).unwrap().x, 3.0);
        assert!(store.get(3).is_none());
    }

    #[test]
    fn test_empty_store() {
        let store = PointStore::from_coords(std::iter::empty());
        assert!(store.is_empty());
        assert!(store.bounding_box().is_none());
        assert!(store.selected_index().is_none());
    }

    #[test]
    fn test_non_finite_points_are_skipped() {
        let store = PointStore::from_coords(vec![
            (0.0, 0.0),
            (f64::NAN, 1.0),
            (2.0, f64::INFINITY),
            (3.0, 3.0),
        ]);

        assert_eq!(store.len(), 2);
        // Indices stay dense after filtering
        assert_eq!(store.get(1).unwrap().x, 3.0);
    }

    #[test]
    fn test_bounding_box() {
        let store = PointStore::from_coords(vec![(-1.0, 5.0), (4.0, -2.0), (0.0, 0.0)]);
        let bbox = store.bounding_box().unwrap();

        assert_eq!(bbox.min().x, -1.0);
        assert_eq!(bbox.min().y, -2.0);
        assert_eq!(bbox.max().x, 4.0);
        assert_eq!(bbox.max().y, 5.0);
    }

    #[test]
    fn test_select_moves_selection() {
        let mut store = PointStore::from_coords(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);

        assert_eq!(store.select(0), None);
        assert_eq!(store.selected_index(), Some(0));
        assert!(store.get(0).unwrap().selected);

        assert_eq!(store.select(2), Some(0));
        assert_eq!(store.selected_index(), Some(2));
        assert!(!store.get(0).unwrap().selected);
        assert!(store.get(2).unwrap().selected);

        // Exactly one point carries the flag
        let flagged = store.iter_all().filter(|p| p.selected).count();
        assert_eq!(flagged, 1);
    }

    #[test]
    fn test_select_out_of_range_is_noop() {
        let mut store = PointStore::from_coords(vec![(0.0, 0.0), (1.0, 1.0)]);
        store.select(1);

        assert_eq!(store.select(99), Some(1));
        assert_eq!(store.selected_index(), Some(1));
        assert!(store.get(1).unwrap().selected);
    }

    #[test]
    fn test_clear_selection() {
        let mut store = PointStore::from_coords(vec![(0.0, 0.0), (1.0, 1.0)]);
        store.select(1);
        store.clear_selection();

        assert!(store.selected_index().is_none());
        assert!(store.iter_all().all(|p| !p.selected));
    }

    #[test]
    fn test_reselecting_same_point_keeps_invariant() {
        let mut store = PointStore::from_coords(vec![(0.0, 0.0), (1.0, 1.0)]);
        store.select(1);
        assert_eq!(store.select(1), Some(1));

        assert_eq!(store.selected_index(), Some(1));
        assert!(store.get(1).unwrap().selected);
        assert_eq!(store.iter_all().filter(|p| p.selected).count(), 1);
    }
}
