//! Draw planning and the rasterizer boundary
//!
//! The planner turns the current draw set (full dataset or LOD subset) into an
//! ordered draw list and replays it against an immediate-mode drawing surface.
//! The core never touches pixel buffers; it only issues draw calls in plan
//! order. The one ordering invariant is that the selected point is always
//! drawn last, so painter's-algorithm z-order puts the highlight on top of
//! everything else.

use crate::store::PointStore;
use crate::viewport::Viewport;

/// An RGB fill color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// How points are drawn
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointStyle {
    /// Drawn radius in screen pixels
    pub radius: f64,
    /// Fill for unselected points
    pub base_color: Color,
    /// Fill for the selected point
    pub highlight_color: Color,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            radius: 2.0,
            base_color: Color::BLACK,
            highlight_color: Color::RED,
        }
    }
}

/// Immediate-mode 2D drawing surface provided by the host
///
/// Implementations receive calls strictly in plan order within a frame.
pub trait Rasterizer {
    /// Clear the drawing region
    fn clear(&mut self, width: f64, height: f64);

    /// Set the fill color for subsequent circles
    fn set_fill_color(&mut self, color: Color);

    /// Draw a filled circle at a screen-space center
    fn draw_filled_circle(&mut self, center_screen: (f64, f64), radius: f64);
}

/// An ordered draw list for one frame
///
/// `base` holds the non-selected members of the draw set in draw order;
/// `selected` is carried separately and always drawn after every base point,
/// whether or not it is a member of the draw set.
#[derive(Clone, Debug, Default)]
pub struct DrawPlan {
    pub base: Vec<usize>,
    pub selected: Option<usize>,
}

/// Per-frame draw-list builder and executor
#[derive(Clone, Debug, Default)]
pub struct RenderPlanner {
    style: PointStyle,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RenderPlanner {
    pub fn new(style: PointStyle) -> Self {
        Self { style }
    }

    #[inline]
    pub fn style(&self) -> &PointStyle {
        &self.style
    }

    /// Build the draw list for the given draw set
    ///
    /// `subset` of `None` draws the full dataset; `Some` draws only the given
    /// indices. The selected point is excluded from the base list and placed
    /// last, even when the subset does not contain it, so the highlight stays
    /// visible during LOD interaction.
    pub fn plan(&self, store: &PointStore, subset: Option<&[usize]>) -> DrawPlan {
        // Profile list construction apart from rasterization
        #[cfg(feature = "profiling")]
        profiling::scope!("render::plan");

        let selected = store.selected_index();
        let base = match subset {
            Some(indices) => indices
                .iter()
                .copied()
                .filter(|&i| Some(i) != selected && i < store.len())
                .collect(),
            None => (0..store.len()).filter(|&i| Some(i) != selected).collect(),
        };

        DrawPlan { base, selected }
    }

    /// Replay a draw list against the rasterizer
    pub fn execute(
        &self,
        plan: &DrawPlan,
        store: &PointStore,
        viewport: &Viewport,
        rasterizer: &mut dyn Rasterizer,
    ) {
        // The per-frame rasterization cost lives here
        #[cfg(feature = "profiling")]
        profiling::scope!("render::execute");

        let (width, height) = viewport.screen_size();
        rasterizer.clear(width, height);

        rasterizer.set_fill_color(self.style.base_color);
        for &index in &plan.base {
            if let Some(point) = store.get(index) {
                let center = viewport.project((point.x, point.y));
                rasterizer.draw_filled_circle(center, self.style.radius);
            }
        }

        if let Some(index) = plan.selected
            && let Some(point) = store.get(index)
        {
            rasterizer.set_fill_color(self.style.highlight_color);
            let center = viewport.project((point.x, point.y));
            rasterizer.draw_filled_circle(center, self.style.radius);
        }
    }
}
