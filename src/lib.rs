//! Large Scatter Library - Interactive Viewing of Large 2D Point Datasets
//!
//! This library provides the core data structures for rendering a large 2D point
//! dataset interactively: panning and zooming a viewport, exact nearest-point
//! hit-testing on pointer clicks, and a single highlighted selection drawn above
//! the rest. While the viewport is being manipulated, a fixed-size representative
//! subset of the dataset is drawn (level of detail); once interaction settles, a
//! single full-fidelity redraw is issued.
//!
//! # Architecture
//!
//! - **[`PointStore`]**: Immutable point storage with the single selection slot
//! - **[`SpatialIndex`]**: Point quadtree with exact nearest-neighbor queries
//! - **[`Viewport`]**: Invertible affine mapping between data and screen space
//! - **[`RenderPlanner`]**: Ordered draw lists with the selected point on top
//! - **[`InteractionController`]**: Idle/Interacting/Settling state machine
//! - **[`ScatterPlot`]**: High-level facade wiring gestures, clicks and redraws
//!
//! # Performance Characteristics
//!
//! - **Index Build**: O(N log N), once per dataset
//! - **Hit-Test**: O(log N) exact nearest neighbor
//! - **Interacting Frame**: O(S) for a subset of S points, independent of N
//! - **Settled Frame**: O(N), paid once per completed gesture cycle

mod interaction;
mod plot;
mod quadtree;
mod render;
mod sampler;
mod store;
mod viewport;

// Public API exports
pub use interaction::{InteractionController, InteractionState, SettleToken};
pub use plot::{Config, HitRadiusPolicy, PlotInfo, PlotObserver, ScatterPlot};
pub use quadtree::SpatialIndex;
pub use render::{Color, DrawPlan, PointStyle, Rasterizer, RenderPlanner};
pub use sampler::sample_indices;
pub use store::{Point, PointStore};
pub use viewport::Viewport;

/// Error types for the plot core
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, PlotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn() -> Config = Config::default;
        let _: fn(usize, usize, u64) -> Vec<usize> = sample_indices;
    }
}
