//! Viewport transform module
//!
//! The viewport is a pair of independent 1-D affine maps from data space to
//! screen space, one per axis, invertible in closed form. The Y axis uses an
//! inverted screen range (screen coordinates grow downwards). Gestures mutate
//! the domains in place; projection and inversion stay exact inverses of each
//! other throughout.

/// One affine data-to-screen axis map
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        }
    }

    /// Map a data value to its screen value
    #[inline]
    fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    /// Map a screen value back to its data value (exact inverse of `scale`)
    #[inline]
    fn invert(&self, value: f64) -> f64 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// Shift the domain by a screen-space delta
    #[inline]
    fn pan(&mut self, delta_screen: f64) {
        let data_per_px = (self.domain_max - self.domain_min) / (self.range_max - self.range_min);
        let shift = delta_screen * data_per_px;
        self.domain_min -= shift;
        self.domain_max -= shift;
    }

    /// Contract the domain around the data value under `anchor_screen`
    ///
    /// The anchor's data value is a fixed point of the transform, so whatever
    /// sits under the anchor stays under it.
    #[inline]
    fn zoom(&mut self, factor: f64, anchor_screen: f64) {
        let anchor_data = self.invert(anchor_screen);
        self.domain_min = anchor_data + (self.domain_min - anchor_data) / factor;
        self.domain_max = anchor_data + (self.domain_max - anchor_data) / factor;
    }

    #[inline]
    fn domain_extent(&self) -> f64 {
        self.domain_max - self.domain_min
    }
}

/// Affine mapping between data coordinates and screen coordinates
///
/// Constructed once per session, then mutated in place by pan/zoom gestures.
/// Zoom is clamped to a configurable level extent relative to the domain set
/// by [`Viewport::rescale_to`], mirroring the usual scale-extent behaviour of
/// interactive plots; a factor that would exceed the extent is clamped, never
/// rejected.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    x: LinearScale,
    y: LinearScale,
    /// X domain extent at rescale time, the baseline for the zoom level
    reference_extent: f64,
    min_zoom: f64,
    max_zoom: f64,
}

/// Fraction of the data range added as padding on each side at rescale
const DOMAIN_PADDING: f64 = 0.1;

/// Fallback half-extent for zero-extent domains
const DEGENERATE_HALF_EXTENT: f64 = 0.5;

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Viewport {
    /// Create a viewport mapping the unit domain onto a screen area
    ///
    /// `zoom_extent` bounds the cumulative zoom level as `(min, max)`,
    /// e.g. `(0.1, 10.0)`.
    pub fn new(screen_width: f64, screen_height: f64, zoom_extent: (f64, f64)) -> Self {
        Self {
            x: LinearScale::new((0.0, 1.0), (0.0, screen_width)),
            // Screen Y grows downwards, so the range is inverted
            y: LinearScale::new((0.0, 1.0), (screen_height, 0.0)),
            reference_extent: 1.0,
            min_zoom: zoom_extent.0,
            max_zoom: zoom_extent.1,
        }
    }

    /// Fit the domain to a data extent with padding on every side
    ///
    /// Padding is 10% of the range per side so no point sits on a screen
    /// edge; zero-extent ranges fall back to a constant pad so the scales
    /// stay invertible. Resets the zoom level baseline.
    pub fn rescale_to(&mut self, extent: geo::Rect<f64>) {
        let (x_min, x_max) = pad_domain(extent.min().x, extent.max().x);
        let (y_min, y_max) = pad_domain(extent.min().y, extent.max().y);

        self.x.domain_min = x_min;
        self.x.domain_max = x_max;
        self.y.domain_min = y_min;
        self.y.domain_max = y_max;
        self.reference_extent = self.x.domain_extent();
    }

    /// Project a data-space position to screen space
    #[inline]
    pub fn project(&self, data: (f64, f64)) -> (f64, f64) {
        (self.x.scale(data.0), self.y.scale(data.1))
    }

    /// Map a screen position back to data space (exact inverse of `project`)
    #[inline]
    pub fn unproject(&self, screen: (f64, f64)) -> (f64, f64) {
        (self.x.invert(screen.0), self.y.invert(screen.1))
    }

    /// Pan by a screen-space delta
    pub fn pan(&mut self, delta_screen: (f64, f64)) {
        self.x.pan(delta_screen.0);
        self.y.pan(delta_screen.1);
    }

    /// Zoom by `factor` keeping `anchor_screen` fixed under the transform
    ///
    /// The effective factor is clamped so the cumulative zoom level stays
    /// within the configured extent; both axes always receive the same factor.
    pub fn zoom(&mut self, factor: f64, anchor_screen: (f64, f64)) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }

        let level = self.zoom_level();
        let clamped = (level * factor).clamp(self.min_zoom, self.max_zoom) / level;

        self.x.zoom(clamped, anchor_screen.0);
        self.y.zoom(clamped, anchor_screen.1);
    }

    /// Current zoom level relative to the rescaled baseline (1.0 = fitted)
    #[inline]
    pub fn zoom_level(&self) -> f64 {
        self.reference_extent / self.x.domain_extent()
    }

    /// Current X domain as `(min, max)`
    #[inline]
    pub fn x_domain(&self) -> (f64, f64) {
        (self.x.domain_min, self.x.domain_max)
    }

    /// Current Y domain as `(min, max)`
    #[inline]
    pub fn y_domain(&self) -> (f64, f64) {
        (self.y.domain_min, self.y.domain_max)
    }

    /// Screen area as `(width, height)`
    #[inline]
    pub fn screen_size(&self) -> (f64, f64) {
        (self.x.range_max - self.x.range_min, self.y.range_min - self.y.range_max)
    }
}

fn pad_domain(min: f64, max: f64) -> (f64, f64) {
    let range = max - min;
    if range > 0.0 {
        (min - range * DOMAIN_PADDING, max + range * DOMAIN_PADDING)
    } else {
        (min - DEGENERATE_HALF_EXTENT, max + DEGENERATE_HALF_EXTENT)
    }
}
