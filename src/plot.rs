//! ScatterPlot - Top-level manager wiring gestures, hit-testing and redraws
//!
//! This module provides the high-level API for the interactive scatter view:
//! it owns the point store, the spatial index, the viewport, the LOD subset
//! and the interaction state machine, and exposes the event entry points the
//! host calls with already-normalized pointer and wheel/drag input.
//!
//! Everything is single-threaded and event-driven: each entry point runs to
//! completion before the next event is handled, and the only asynchronous
//! element is the host-owned settle timer, which is made safe to fire late
//! through the generation check in [`InteractionController`].

use crate::interaction::{InteractionController, InteractionState, SettleToken};
use crate::quadtree::SpatialIndex;
use crate::render::{PointStyle, Rasterizer, RenderPlanner};
use crate::sampler::sample_indices;
use crate::store::PointStore;
use crate::viewport::Viewport;
use crate::{PlotError, Result};

use instant::{Duration, Instant};

/// How the click hit radius relates to zoom
///
/// `ScreenConstant` keeps a constant on-screen radius equal to the drawn
/// radius; `ZoomScaled` grows the on-screen radius with the zoom level, which
/// approximates a constant data-space radius.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitRadiusPolicy {
    #[default]
    ScreenConstant,
    ZoomScaled,
}

/// Configuration for the scatter plot
///
/// Defaults mirror the reference setup: a 1600x1000 screen, 2px points, a
/// 1000-point LOD subset and a 250ms settle delay.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Screen width in pixels
    pub screen_width: f64,
    /// Screen height in pixels
    pub screen_height: f64,
    /// Number of points drawn during active interaction
    pub lod_subset_size: usize,
    /// Seed for the deterministic LOD sample
    pub sample_seed: u64,
    /// Quiet period after the last gesture before the full redraw
    pub settle_delay: Duration,
    /// Cumulative zoom level bounds as `(min, max)`
    pub zoom_extent: (f64, f64),
    /// Click hit-radius policy
    pub hit_radius_policy: HitRadiusPolicy,
    /// Point drawing style
    pub style: PointStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: 1600.0,
            screen_height: 1000.0,
            lod_subset_size: 1000,
            sample_seed: 0,
            settle_delay: Duration::from_millis(250),
            zoom_extent: (0.1, 10.0),
            hit_radius_policy: HitRadiusPolicy::default(),
            style: PointStyle::default(),
        }
    }
}

impl Config {
    fn validate(&self) -> Result<()> {
        if !(self.screen_width.is_finite() && self.screen_width > 0.0)
            || !(self.screen_height.is_finite() && self.screen_height > 0.0)
        {
            return Err(PlotError::InvalidConfig(
                "screen dimensions must be positive",
            ));
        }
        if !(self.zoom_extent.0 > 0.0 && self.zoom_extent.0 <= self.zoom_extent.1) {
            return Err(PlotError::InvalidConfig(
                "zoom extent must satisfy 0 < min <= max",
            ));
        }
        if !(self.style.radius.is_finite() && self.style.radius > 0.0) {
            return Err(PlotError::InvalidConfig("point radius must be positive"));
        }
        Ok(())
    }
}

/// Information about the plot
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlotInfo {
    /// Number of points in the dataset
    pub point_count: usize,
    /// Size of the LOD draw set
    pub lod_subset_size: usize,
    /// Currently selected point, if any
    pub selected: Option<usize>,
}

/// Outbound notifications to external collaborators
///
/// `redraw_axes` fires whenever the viewport changes so an external axis
/// renderer can stay synchronized; `selection_changed` fires when the
/// selection moves, for e.g. a detail panel. Both default to no-ops.
pub trait PlotObserver {
    fn redraw_axes(&mut self, _viewport: &Viewport) {}

    fn selection_changed(&mut self, _selected: Option<usize>) {}
}

/// Observer that ignores every notification
impl PlotObserver for () {}

/// Interactive scatter view over a large immutable point dataset
pub struct ScatterPlot {
    store: PointStore,
    index: SpatialIndex,
    viewport: Viewport,
    /// Fixed LOD draw set, sampled once at construction
    lod_subset: Vec<usize>,
    controller: InteractionController,
    planner: RenderPlanner,
    config: Config,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl ScatterPlot {
    /// Build a plot from materialized `(x, y)` coordinates
    ///
    /// Constructs the store, the spatial index over the full dataset and the
    /// LOD subset, and fits the viewport to the padded data bounds. The
    /// dataset is immutable afterwards.
    pub fn new<I>(coords: I, config: Config) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        // Profile the one-time startup cost
        #[cfg(feature = "profiling")]
        profiling::scope!("plot::new");

        config.validate()?;

        let store = PointStore::from_coords(coords);
        let index = SpatialIndex::build(&store);
        let lod_subset = sample_indices(store.len(), config.lod_subset_size, config.sample_seed);

        let mut viewport = Viewport::new(
            config.screen_width,
            config.screen_height,
            config.zoom_extent,
        );
        if let Some(bbox) = store.bounding_box() {
            viewport.rescale_to(bbox);
        }

        let controller = InteractionController::new(config.settle_delay);
        let planner = RenderPlanner::new(config.style);

        Ok(Self {
            store,
            index,
            viewport,
            lod_subset,
            controller,
            planner,
            config,
        })
    }

    /// Handle a pan gesture tick
    ///
    /// Enters (or stays in) the interacting state, shifts the viewport and
    /// redraws with the LOD subset.
    pub fn pan(
        &mut self,
        delta_screen: (f64, f64),
        rasterizer: &mut dyn Rasterizer,
        observer: &mut dyn PlotObserver,
    ) {
        self.controller.begin_gesture();
        self.viewport.pan(delta_screen);
        self.redraw(rasterizer);
        observer.redraw_axes(&self.viewport);
    }

    /// Handle a zoom gesture tick anchored at a screen position
    pub fn zoom(
        &mut self,
        factor: f64,
        anchor_screen: (f64, f64),
        rasterizer: &mut dyn Rasterizer,
        observer: &mut dyn PlotObserver,
    ) {
        self.controller.begin_gesture();
        self.viewport.zoom(factor, anchor_screen);
        self.redraw(rasterizer);
        observer.redraw_axes(&self.viewport);
    }

    /// Handle the end of a gesture
    ///
    /// Returns the settle token the host should fire back at
    /// `token.deadline()`. `None` when no gesture was in progress.
    pub fn end_gesture(&mut self, now: Instant) -> Option<SettleToken> {
        self.controller.end_gesture(now)
    }

    /// Handle the settle timer firing
    ///
    /// Issues the one full-fidelity redraw if the token is still current and
    /// the deadline has passed; stale or early fires are no-ops. Returns
    /// whether the redraw happened.
    pub fn settle(
        &mut self,
        token: SettleToken,
        now: Instant,
        rasterizer: &mut dyn Rasterizer,
    ) -> bool {
        if !self.controller.fire(token, now) {
            return false;
        }

        tracing::debug!("Interaction settled, full redraw of {} points", self.store.len());
        self.redraw(rasterizer);
        true
    }

    /// Handle a pointer click at screen coordinates
    ///
    /// Hit-tests against the full unsampled dataset via the spatial index,
    /// commits the selection only when the nearest point lies within the hit
    /// radius on screen, and redraws with the current state's draw set.
    /// Returns the newly selected index, or `None` when nothing was hit.
    pub fn click(
        &mut self,
        screen: (f64, f64),
        rasterizer: &mut dyn Rasterizer,
        observer: &mut dyn PlotObserver,
    ) -> Option<usize> {
        // Hit-testing accuracy must not degrade during LOD interaction
        #[cfg(feature = "profiling")]
        profiling::scope!("plot::click");

        let data = self.viewport.unproject(screen);
        let nearest = self.index.nearest(data)?;
        let point = self.store.get(nearest)?;

        let projected = self.viewport.project((point.x, point.y));
        let dx = projected.0 - screen.0;
        let dy = projected.1 - screen.1;
        if (dx * dx + dy * dy).sqrt() > self.hit_radius() {
            return None;
        }

        let previous = self.store.select(nearest);
        if previous != Some(nearest) {
            observer.selection_changed(Some(nearest));
        }
        self.redraw(rasterizer);
        Some(nearest)
    }

    /// Clear the current selection
    ///
    /// Notifies `selection_changed(None)` and redraws with the current
    /// state's draw set. A no-op when nothing is selected.
    pub fn clear_selection(
        &mut self,
        rasterizer: &mut dyn Rasterizer,
        observer: &mut dyn PlotObserver,
    ) {
        if self.store.selected_index().is_none() {
            return;
        }

        self.store.clear_selection();
        observer.selection_changed(None);
        self.redraw(rasterizer);
    }

    /// Redraw with the current state's draw set
    ///
    /// The LOD subset while interacting, the full dataset otherwise.
    pub fn redraw(&self, rasterizer: &mut dyn Rasterizer) {
        #[cfg(feature = "profiling")]
        profiling::scope!("plot::redraw");

        let subset = if self.controller.is_interacting() {
            Some(self.lod_subset.as_slice())
        } else {
            None
        };
        let plan = self.planner.plan(&self.store, subset);
        self.planner.execute(&plan, &self.store, &self.viewport, rasterizer);
    }

    /// Effective on-screen hit radius under the configured policy
    fn hit_radius(&self) -> f64 {
        match self.config.hit_radius_policy {
            HitRadiusPolicy::ScreenConstant => self.config.style.radius,
            HitRadiusPolicy::ZoomScaled => self.config.style.radius * self.viewport.zoom_level(),
        }
    }

    /// Current viewport transform
    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Currently selected point index, if any
    #[inline]
    pub fn selected(&self) -> Option<usize> {
        self.store.selected_index()
    }

    /// Current interaction state
    #[inline]
    pub fn state(&self) -> InteractionState {
        self.controller.state()
    }

    /// The underlying point store
    #[inline]
    pub fn store(&self) -> &PointStore {
        &self.store
    }

    /// The LOD draw set indices
    #[inline]
    pub fn lod_subset(&self) -> &[usize] {
        &self.lod_subset
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get plot information
    #[inline]
    pub fn info(&self) -> PlotInfo {
        PlotInfo {
            point_count: self.store.len(),
            lod_subset_size: self.lod_subset.len(),
            selected: self.store.selected_index(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;

    /// Counts raster calls; frame count == clear count
    #[derive(Default)]
    struct CountingRasterizer {
        clears: usize,
        circles: usize,
    }

    impl Rasterizer for CountingRasterizer {
        fn clear(&mut self, _width: f64, _height: f64) {
            self.clears += 1;
            self.circles = 0;
        }

        fn set_fill_color(&mut self, _color: Color) {}

        fn draw_filled_circle(&mut self, _center_screen: (f64, f64), _radius: f64) {
            self.circles += 1;
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        axis_redraws: usize,
        selections: Vec<Option<usize>>,
    }

    impl PlotObserver for RecordingObserver {
        fn redraw_axes(&mut self, _viewport: &Viewport) {
            self.axis_redraws += 1;
        }

        fn selection_changed(&mut self, selected: Option<usize>) {
            self.selections.push(selected);
        }
    }

    fn four_point_plot() -> ScatterPlot {
        ScatterPlot::new(
            vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (10.0, 10.0)],
            Config::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.screen_width, 1600.0);
        assert_eq!(config.screen_height, 1000.0);
        assert_eq!(config.lod_subset_size, 1000);
        assert_eq!(config.settle_delay, Duration::from_millis(250));
        assert_eq!(config.hit_radius_policy, HitRadiusPolicy::ScreenConstant);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.screen_width = 0.0;
        assert!(ScatterPlot::new(vec![(0.0, 0.0)], config).is_err());

        let mut config = Config::default();
        config.zoom_extent = (0.0, 10.0);
        assert!(ScatterPlot::new(vec![(0.0, 0.0)], config).is_err());

        let mut config = Config::default();
        config.style.radius = -1.0;
        assert!(ScatterPlot::new(vec![(0.0, 0.0)], config).is_err());
    }

    #[test]
    fn test_lod_subset_is_clamped_and_deterministic() {
        let plot = four_point_plot();
        assert_eq!(plot.lod_subset().len(), 4);

        let again = four_point_plot();
        assert_eq!(plot.lod_subset(), again.lod_subset());
    }

    #[test]
    fn test_click_selects_nearest_within_radius() {
        let mut plot = four_point_plot();
        let mut raster = CountingRasterizer::default();
        let mut observer = RecordingObserver::default();

        // Click exactly on point 0's screen position
        let screen = plot.viewport().project((0.0, 0.0));
        let selected = plot.click(screen, &mut raster, &mut observer);

        assert_eq!(selected, Some(0));
        assert_eq!(plot.selected(), Some(0));
        assert_eq!(observer.selections, vec![Some(0)]);
        assert_eq!(raster.clears, 1);
    }

    #[test]
    fn test_click_outside_hit_radius_is_noop() {
        let mut plot = four_point_plot();
        let mut raster = CountingRasterizer::default();
        let mut observer = RecordingObserver::default();

        // Far from every point on screen
        let screen = plot.viewport().project((5.0, 5.0));
        let selected = plot.click(screen, &mut raster, &mut observer);

        assert_eq!(selected, None);
        assert_eq!(plot.selected(), None);
        assert!(observer.selections.is_empty());
        assert_eq!(raster.clears, 0);
    }

    #[test]
    fn test_click_on_empty_dataset_is_noop() {
        let mut plot = ScatterPlot::new(std::iter::empty(), Config::default()).unwrap();
        let mut raster = CountingRasterizer::default();

        assert_eq!(plot.click((800.0, 500.0), &mut raster, &mut ()), None);
        assert_eq!(raster.clears, 0);
    }

    #[test]
    fn test_reclick_same_point_does_not_renotify() {
        let mut plot = four_point_plot();
        let mut raster = CountingRasterizer::default();
        let mut observer = RecordingObserver::default();

        let screen = plot.viewport().project((0.0, 0.0));
        plot.click(screen, &mut raster, &mut observer);
        plot.click(screen, &mut raster, &mut observer);

        assert_eq!(observer.selections, vec![Some(0)]);
        assert_eq!(raster.clears, 2);
    }

    #[test]
    fn test_clear_selection_notifies_and_redraws() {
        let mut plot = four_point_plot();
        let mut raster = CountingRasterizer::default();
        let mut observer = RecordingObserver::default();

        let screen = plot.viewport().project((0.0, 0.0));
        plot.click(screen, &mut raster, &mut observer);
        assert_eq!(plot.selected(), Some(0));

        plot.clear_selection(&mut raster, &mut observer);
        assert_eq!(plot.selected(), None);
        assert!(plot.store().iter_all().all(|p| !p.selected));
        assert_eq!(observer.selections, vec![Some(0), None]);
        assert_eq!(raster.clears, 2);
    }

    #[test]
    fn test_clear_selection_without_selection_is_noop() {
        let mut plot = four_point_plot();
        let mut raster = CountingRasterizer::default();
        let mut observer = RecordingObserver::default();

        plot.clear_selection(&mut raster, &mut observer);
        assert!(observer.selections.is_empty());
        assert_eq!(raster.clears, 0);
    }

    #[test]
    fn test_zoom_scaled_hit_radius_grows_with_zoom() {
        let mut config = Config::default();
        config.hit_radius_policy = HitRadiusPolicy::ZoomScaled;
        let mut plot = ScatterPlot::new(vec![(0.0, 0.0), (10.0, 10.0)], config).unwrap();
        let mut raster = CountingRasterizer::default();

        // A miss by ~4px at zoom level 1
        let target = plot.viewport().project((0.0, 0.0));
        let near_miss = (target.0 + 4.0, target.1);
        assert_eq!(plot.click(near_miss, &mut raster, &mut ()), None);

        // Zoom in 4x around the point; 4px is now inside the scaled radius
        plot.zoom(4.0, target, &mut raster, &mut ());
        let target = plot.viewport().project((0.0, 0.0));
        let near_miss = (target.0 + 4.0, target.1);
        assert_eq!(plot.click(near_miss, &mut raster, &mut ()), Some(0));
    }

    #[test]
    fn test_interacting_frames_use_lod_subset() {
        let mut config = Config::default();
        config.lod_subset_size = 10;
        let coords: Vec<(f64, f64)> = (0..100).map(|i| (i as f64, i as f64)).collect();
        let mut plot = ScatterPlot::new(coords, config).unwrap();

        let mut raster = CountingRasterizer::default();
        plot.redraw(&mut raster);
        assert_eq!(raster.circles, 100);

        plot.pan((5.0, 0.0), &mut raster, &mut ());
        assert_eq!(raster.circles, 10);
    }

    #[test]
    fn test_gesture_notifies_axis_observer() {
        let mut plot = four_point_plot();
        let mut raster = CountingRasterizer::default();
        let mut observer = RecordingObserver::default();

        plot.pan((10.0, 5.0), &mut raster, &mut observer);
        plot.zoom(2.0, (800.0, 500.0), &mut raster, &mut observer);

        assert_eq!(observer.axis_redraws, 2);
    }

    #[test]
    fn test_info() {
        let mut plot = four_point_plot();
        let mut raster = CountingRasterizer::default();
        let screen = plot.viewport().project((10.0, 10.0));
        plot.click(screen, &mut raster, &mut ());

        let info = plot.info();
        assert_eq!(info.point_count, 4);
        assert_eq!(info.lod_subset_size, 4);
        assert_eq!(info.selected, Some(3));
    }
}
