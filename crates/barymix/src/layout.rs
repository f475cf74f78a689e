//! Anchor layout and Gram matrix construction.
//!
//! Purpose
//! - Turn a layout request (an anchor count, or explicit points) into the
//!   fixed anchor set of one mixer instance, scaled into the configured
//!   canvas, plus the pairwise inner-product (Gram) matrix the weight solve
//!   uses as its coefficient block.
//!
//! Model
//! - Auto mode places `n` points on a circle of radius 1/2 (offset so raw
//!   coordinates land in [0, 1]), starting at the top (−π/2) plus an optional
//!   rotation, then rescales so the x-extent maps onto [0, size] with the
//!   y-axis stretched by the same factor (aspect-preserving).
//! - Manual mode takes the caller's points verbatim, or runs them through
//!   the same rescaling when `normalize` is set.
//! - The Gram entry (i, j) is the true dot product `x_i·x_j + y_i·y_j`.
//!
//! Code cross-refs: `boundary::Boundary::build`, `solver::solve_weights`.

use nalgebra::{DMatrix, Vector2};
use std::fmt;

use crate::boundary::BoundaryMode;

/// Default canvas size (square side) for layouts.
pub const DEFAULT_SIZE: f64 = 300.0;

/// Coordinate extents treated as collapsed during rescaling.
const EXTENT_EPS: f64 = 1e-12;

/// Construction-time failure. Degenerate geometry past construction never
/// errors; it degrades to uniform/box behavior instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Fewer than one anchor was requested or supplied.
    InvalidAnchorCount { got: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::InvalidAnchorCount { got } => {
                write!(f, "anchor count must be a positive integer (got {got})")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// How the anchor set is obtained.
#[derive(Clone, Debug)]
pub enum LayoutSpec {
    /// `n` anchors evenly spaced on a circle.
    Auto(usize),
    /// Explicit anchor points, order defining the weight index mapping.
    Manual(Vec<Vector2<f64>>),
}

impl LayoutSpec {
    #[inline]
    fn count(&self) -> usize {
        match self {
            LayoutSpec::Auto(n) => *n,
            LayoutSpec::Manual(points) => points.len(),
        }
    }
}

/// Layout options shared by both construction modes.
#[derive(Clone, Debug)]
pub struct LayoutCfg {
    /// Canvas side length the anchors are scaled into.
    pub size: f64,
    /// Extra clockwise rotation (radians) applied to auto placement.
    pub rotate: f64,
    /// Padding around the anchor bounding box reported to UI collaborators.
    pub handle_offset: f64,
    /// Boundary mode override. Defaults to polygon for auto layouts and box
    /// for manual layouts when unset.
    pub boundary: Option<BoundaryMode>,
    /// Rescale manual points into the canvas. Auto layouts always rescale.
    pub normalize: bool,
    /// Starting weights; must have one entry per anchor or it is ignored in
    /// favor of a one-hot vector on anchor 0.
    pub initial_weights: Option<Vec<f64>>,
}

impl Default for LayoutCfg {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            rotate: 0.0,
            handle_offset: 0.0,
            boundary: None,
            normalize: true,
            initial_weights: None,
        }
    }
}

/// A fixed anchor set with its Gram matrix, built once per mixer instance.
#[derive(Clone, Debug)]
pub struct Layout {
    anchors: Vec<Vector2<f64>>,
    gram: DMatrix<f64>,
    boundary_mode: BoundaryMode,
    size: f64,
    handle_offset: f64,
}

impl Layout {
    /// Build the anchor set and Gram matrix for `spec`.
    ///
    /// Errors with [`LayoutError::InvalidAnchorCount`] when `spec` carries
    /// zero anchors; everything else degrades gracefully downstream.
    pub fn build(spec: &LayoutSpec, cfg: &LayoutCfg) -> Result<Layout, LayoutError> {
        let n = spec.count();
        if n < 1 {
            return Err(LayoutError::InvalidAnchorCount { got: n });
        }
        let (anchors, default_mode) = match spec {
            LayoutSpec::Auto(n) => {
                let raw = circle_points(*n, cfg.rotate);
                (rescale_to_canvas(&raw, cfg.size), BoundaryMode::Polygon)
            }
            LayoutSpec::Manual(points) => {
                let anchors = if cfg.normalize {
                    rescale_to_canvas(points, cfg.size)
                } else {
                    points.clone()
                };
                (anchors, BoundaryMode::Box)
            }
        };
        let gram = gram_matrix(&anchors);
        Ok(Layout {
            anchors,
            gram,
            boundary_mode: cfg.boundary.unwrap_or(default_mode),
            size: cfg.size,
            handle_offset: cfg.handle_offset,
        })
    }

    /// Anchor count.
    #[inline]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Anchor positions in canvas coordinates, in weight-index order.
    #[inline]
    pub fn anchors(&self) -> &[Vector2<f64>] {
        &self.anchors
    }

    /// Pairwise dot-product matrix of the anchors (symmetric, n×n).
    #[inline]
    pub fn gram(&self) -> &DMatrix<f64> {
        &self.gram
    }

    #[inline]
    pub fn boundary_mode(&self) -> BoundaryMode {
        self.boundary_mode
    }

    #[inline]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[inline]
    pub fn handle_offset(&self) -> f64 {
        self.handle_offset
    }

    /// Anchor bounding box inflated by `handle_offset`, as
    /// `(origin_x, origin_y, width, height)` for UI viewports.
    pub fn view_box(&self) -> (f64, f64, f64, f64) {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for a in &self.anchors {
            x_min = x_min.min(a.x);
            x_max = x_max.max(a.x);
            y_min = y_min.min(a.y);
            y_max = y_max.max(a.y);
        }
        let off = self.handle_offset;
        (
            x_min - off,
            y_min - off,
            2.0 * off + (x_max - x_min),
            2.0 * off + (y_max - y_min),
        )
    }
}

/// `n` points on the circle of radius 1/2 centered at (1/2, 1/2), starting
/// at the top and proceeding clockwise in screen coordinates (y down).
/// Coordinates are rounded to 5 decimals so symmetric layouts come out
/// bit-symmetric.
fn circle_points(n: usize, rotate: f64) -> Vec<Vector2<f64>> {
    let step = 2.0 * std::f64::consts::PI / (n as f64);
    (0..n)
        .map(|i| {
            let theta = (i as f64) * step - (std::f64::consts::FRAC_PI_2 + rotate);
            Vector2::new(
                round5(0.5 * theta.cos() + 0.5),
                round5(0.5 * theta.sin() + 0.5),
            )
        })
        .collect()
}

#[inline]
fn round5(v: f64) -> f64 {
    (v * 1e5).round() / 1e5
}

/// Map the x-extent of `points` onto [0, size], stretching y by the same
/// factor. Collapsed x-extents fall back to the y-extent (points centered
/// horizontally); fully coincident points land at the canvas center.
fn rescale_to_canvas(points: &[Vector2<f64>], size: f64) -> Vec<Vector2<f64>> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for p in points {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }
    let x_extent = x_max - x_min;
    let y_extent = y_max - y_min;
    if x_extent > EXTENT_EPS {
        points
            .iter()
            .map(|p| {
                Vector2::new(
                    (p.x - x_min) / x_extent * size,
                    p.y / x_extent * size,
                )
            })
            .collect()
    } else if y_extent > EXTENT_EPS {
        // Vertical line of anchors: center x, spread the y-extent.
        points
            .iter()
            .map(|p| Vector2::new(size / 2.0, (p.y - y_min) / y_extent * size))
            .collect()
    } else {
        points.iter().map(|_| Vector2::new(size / 2.0, size / 2.0)).collect()
    }
}

fn gram_matrix(anchors: &[Vector2<f64>]) -> DMatrix<f64> {
    let n = anchors.len();
    DMatrix::from_fn(n, n, |i, j| anchors[i].dot(&anchors[j]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn zero_anchors_is_a_construction_error() {
        let err = Layout::build(&LayoutSpec::Auto(0), &LayoutCfg::default()).unwrap_err();
        assert_eq!(err, LayoutError::InvalidAnchorCount { got: 0 });
        let err =
            Layout::build(&LayoutSpec::Manual(Vec::new()), &LayoutCfg::default()).unwrap_err();
        assert_eq!(err, LayoutError::InvalidAnchorCount { got: 0 });
    }

    #[test]
    fn auto_triangle_spans_the_canvas() {
        let layout = Layout::build(&LayoutSpec::Auto(3), &LayoutCfg::default()).unwrap();
        let a = layout.anchors();
        assert_eq!(a.len(), 3);
        // Apex at the top center, base corners at the full width.
        assert!((a[0].x - 150.0).abs() < 1e-6, "a0 = {}", a[0]);
        assert!(a[0].y.abs() < 1e-6);
        assert!((a[1].x - 300.0).abs() < 1e-6, "a1 = {}", a[1]);
        assert!(a[2].x.abs() < 1e-6, "a2 = {}", a[2]);
        assert!((a[1].y - a[2].y).abs() < 1e-9);
        assert_eq!(layout.boundary_mode(), BoundaryMode::Polygon);
    }

    #[test]
    fn rotation_shifts_auto_placement() {
        let cfg = LayoutCfg {
            rotate: std::f64::consts::PI,
            ..LayoutCfg::default()
        };
        let layout = Layout::build(&LayoutSpec::Auto(3), &cfg).unwrap();
        // Rotated half a turn: the apex moves to the bottom.
        let a = layout.anchors();
        assert!((a[0].x - 150.0).abs() < 1e-6);
        assert!(a[0].y > a[1].y && a[0].y > a[2].y);
    }

    #[test]
    fn manual_points_keep_order_and_default_to_box() {
        let points = vec![
            vector![1.0, 0.25],
            vector![0.75, 0.79],
            vector![0.5, 0.6],
            vector![0.25, 0.25],
        ];
        let layout = Layout::build(&LayoutSpec::Manual(points), &LayoutCfg::default()).unwrap();
        assert_eq!(layout.boundary_mode(), BoundaryMode::Box);
        let a = layout.anchors();
        // x-extent [0.25, 1] maps onto [0, 300]; y stretches by the same 400x.
        assert!((a[0].x - 300.0).abs() < 1e-9);
        assert!((a[0].y - 100.0).abs() < 1e-9);
        assert!((a[3].x - 0.0).abs() < 1e-9);
        assert!((a[1].y - 316.0).abs() < 1e-9);
    }

    #[test]
    fn manual_points_unscaled_when_normalize_is_off() {
        let points = vec![vector![10.0, 20.0], vector![30.0, 5.0]];
        let cfg = LayoutCfg {
            normalize: false,
            ..LayoutCfg::default()
        };
        let layout = Layout::build(&LayoutSpec::Manual(points.clone()), &cfg).unwrap();
        assert_eq!(layout.anchors(), points.as_slice());
    }

    #[test]
    fn gram_matrix_is_symmetric_dot_products() {
        let points = vec![vector![1.0, 2.0], vector![3.0, 4.0]];
        let cfg = LayoutCfg {
            normalize: false,
            ..LayoutCfg::default()
        };
        let layout = Layout::build(&LayoutSpec::Manual(points), &cfg).unwrap();
        let g = layout.gram();
        assert_eq!(g[(0, 0)], 5.0);
        assert_eq!(g[(0, 1)], 11.0);
        assert_eq!(g[(1, 0)], 11.0);
        assert_eq!(g[(1, 1)], 25.0);
    }

    #[test]
    fn single_anchor_collapses_to_canvas_center() {
        let layout = Layout::build(&LayoutSpec::Auto(1), &LayoutCfg::default()).unwrap();
        let a = layout.anchors()[0];
        assert!((a.x - 150.0).abs() < 1e-9);
        assert!((a.y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn two_auto_anchors_form_a_vertical_axis() {
        let layout = Layout::build(&LayoutSpec::Auto(2), &LayoutCfg::default()).unwrap();
        let a = layout.anchors();
        assert!((a[0].x - 150.0).abs() < 1e-9);
        assert!((a[1].x - 150.0).abs() < 1e-9);
        assert!(a[0].y.abs() < 1e-9);
        assert!((a[1].y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn view_box_includes_handle_offset() {
        let cfg = LayoutCfg {
            handle_offset: 10.0,
            ..LayoutCfg::default()
        };
        let layout = Layout::build(&LayoutSpec::Auto(4), &cfg).unwrap();
        let (x, y, w, h) = layout.view_box();
        assert!((x + 10.0).abs() < 1e-9);
        assert!((y + 10.0).abs() < 1e-9);
        assert!((w - 320.0).abs() < 1e-9);
        assert!((h - 320.0).abs() < 1e-9);
    }
}
