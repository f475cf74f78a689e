//! Boundary description and query-point clamping.
//!
//! Purpose
//! - Reduce "is this pointer position valid" to a 1D interval test per
//!   y-row: each non-horizontal polygon edge becomes an inverse-linear
//!   function x(y) over its y-span, and clamping a query means clamping y
//!   into the anchor bounding box, then x into the [min, max] of every edge
//!   function whose span contains that y.
//!
//! Why this design
//! - Exact point-in-polygon testing is avoided; the row reduction is O(n)
//!   per query and numerically robust for the convex auto layouts it serves.
//! - Spans live in an explicit y-sorted list rather than a float-keyed map,
//!   so lookup is a plain interval scan with no ordering surprises.
//!
//! Code cross-refs: `layout::Layout`, `session::Mixer::input`.

use nalgebra::Vector2;

/// Slope magnitude below which an edge counts as horizontal and contributes
/// no x(y) function (absorbs rounding error in generated layouts).
const SLOPE_EPS: f64 = 1e-7;

/// Which region clamps the handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryMode {
    /// The convex polygon through consecutive anchors (auto layouts).
    Polygon,
    /// The anchor bounding box (arbitrary manual layouts).
    Box,
}

/// One non-horizontal edge reduced to `x(y) = x0 + (y - y0) * inv_slope`,
/// valid for y in `[y_min, y_max]`.
#[derive(Clone, Copy, Debug)]
struct EdgeSpan {
    y_min: f64,
    y_max: f64,
    x0: f64,
    y0: f64,
    inv_slope: f64,
}

impl EdgeSpan {
    #[inline]
    fn contains(&self, y: f64) -> bool {
        y >= self.y_min && y <= self.y_max
    }

    #[inline]
    fn eval(&self, y: f64) -> f64 {
        self.x0 + (y - self.y0) * self.inv_slope
    }
}

/// Axis-aligned anchor bounding box.
#[derive(Clone, Copy, Debug)]
struct BBox {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl BBox {
    fn of(points: &[Vector2<f64>]) -> BBox {
        let mut b = BBox {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for p in points {
            b.x_min = b.x_min.min(p.x);
            b.x_max = b.x_max.max(p.x);
            b.y_min = b.y_min.min(p.y);
            b.y_max = b.y_max.max(p.y);
        }
        b
    }
}

/// Valid x-interval for one y-row, as produced by [`Boundary::x_interval`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XInterval {
    pub min_x: f64,
    pub max_x: f64,
    /// The y actually used, after clamping into the anchor bounding box.
    pub y: f64,
}

/// Immutable boundary description derived from one anchor set.
#[derive(Clone, Debug)]
pub struct Boundary {
    mode: BoundaryMode,
    spans: Vec<EdgeSpan>,
    bbox: BBox,
    n: usize,
    size: f64,
}

impl Boundary {
    /// Derive the boundary for `anchors` under `mode`. `size` is the canvas
    /// side, used for the fixed n = 1 midpoint and the full n = 2 width.
    pub fn build(anchors: &[Vector2<f64>], mode: BoundaryMode, size: f64) -> Boundary {
        let bbox = BBox::of(anchors);
        let spans = match mode {
            BoundaryMode::Box => Vec::new(),
            BoundaryMode::Polygon => {
                let n = anchors.len();
                let mut spans: Vec<EdgeSpan> = Vec::with_capacity(n);
                for i in 0..n {
                    let a = anchors[i];
                    let b = anchors[(i + 1) % n];
                    // Slope in y-per-x; NaN (coincident anchors) fails the
                    // test and the edge is dropped.
                    let m = (b.y - a.y) / (b.x - a.x);
                    if m.abs() > SLOPE_EPS {
                        let (lo, hi) = if a.y <= b.y { (a, b) } else { (b, a) };
                        spans.push(EdgeSpan {
                            y_min: lo.y,
                            y_max: hi.y,
                            x0: lo.x,
                            y0: lo.y,
                            inv_slope: (b.x - a.x) / (b.y - a.y),
                        });
                    }
                }
                spans.sort_by(|s, t| {
                    s.y_min
                        .partial_cmp(&t.y_min)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                spans
            }
        };
        Boundary {
            mode,
            spans,
            bbox,
            n: anchors.len(),
            size,
        }
    }

    #[inline]
    pub fn mode(&self) -> BoundaryMode {
        self.mode
    }

    /// Minimal valid x-interval at height `query_y`.
    ///
    /// The y is first clamped into the anchor bounding box; the returned
    /// interval is consistent with the polygon (or box) at that height.
    /// One anchor pins x to the canvas midpoint; two anchors leave the full
    /// canvas width free.
    pub fn x_interval(&self, query_y: f64) -> XInterval {
        let y = query_y.clamp(self.bbox.y_min, self.bbox.y_max);
        if self.n == 1 {
            let mid = self.size / 2.0;
            return XInterval {
                min_x: mid,
                max_x: mid,
                y,
            };
        }
        if self.n == 2 {
            return XInterval {
                min_x: 0.0,
                max_x: self.size,
                y,
            };
        }
        match self.mode {
            BoundaryMode::Box => XInterval {
                min_x: self.bbox.x_min,
                max_x: self.bbox.x_max,
                y,
            },
            BoundaryMode::Polygon => {
                let mut min_x = f64::INFINITY;
                let mut max_x = f64::NEG_INFINITY;
                for span in &self.spans {
                    if span.contains(y) {
                        let x = span.eval(y);
                        min_x = min_x.min(x);
                        max_x = max_x.max(x);
                    }
                }
                if min_x > max_x {
                    // No edge crosses this row (degenerate polygon); the
                    // bounding box still bounds the handle.
                    min_x = self.bbox.x_min;
                    max_x = self.bbox.x_max;
                }
                XInterval { min_x, max_x, y }
            }
        }
    }

    /// Clamp `point` into the valid region. Idempotent: an in-boundary point
    /// comes back unchanged.
    pub fn clamp(&self, point: Vector2<f64>) -> Vector2<f64> {
        let iv = self.x_interval(point.y);
        Vector2::new(point.x.clamp(iv.min_x, iv.max_x), iv.y)
    }
}
