//! The mixer instance and its drag session.
//!
//! Purpose
//! - Tie layout, boundary, and weight solve together behind a narrow signal
//!   interface: callers feed normalized `start`/`move`/`end` pointer signals
//!   and receive the clamped handle position plus the updated weight vector.
//!
//! Why this design
//! - The session is an explicit two-state machine instead of device event
//!   wiring, so the engine is testable without simulating pointer hardware.
//! - Everything runs synchronously inside [`Mixer::input`]: no queuing, no
//!   stale events, and emissions are strictly ordered by signal arrival.
//!   Instances share no mutable state.
//!
//! Code cross-refs: `boundary::Boundary::clamp`, `solver::solve_weights`,
//! `scope::ScopeRegistry`.

use nalgebra::{DVector, Vector2};

use crate::boundary::Boundary;
use crate::layout::{Layout, LayoutCfg, LayoutError, LayoutSpec};
use crate::scope::ScopeId;
use crate::solver::solve_weights;

/// Normalized pointer intent, decoupled from any concrete input device.
/// Pointer-leave maps to `Cancel` (or `End`) by the event source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerSignal {
    Start(Vector2<f64>),
    Move(Vector2<f64>),
    End,
    Cancel,
}

/// Drag-session phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Inactive,
    Active,
}

/// One emitted update: the clamped handle position and the weight vector
/// derived from it. Owned by the caller once emitted.
#[derive(Clone, Debug, PartialEq)]
pub struct MixUpdate {
    pub position: Vector2<f64>,
    pub weights: DVector<f64>,
}

/// One interactive mixer: a fixed anchor set, its boundary, and the drag
/// session state feeding the weight solve.
#[derive(Debug)]
pub struct Mixer {
    layout: Layout,
    boundary: Boundary,
    scope: ScopeId,
    phase: DragPhase,
    position: Vector2<f64>,
    weights: DVector<f64>,
}

impl Mixer {
    /// Build a mixer for `spec`. The scope id comes from the caller's
    /// [`crate::scope::ScopeRegistry`].
    pub fn new(spec: &LayoutSpec, cfg: &LayoutCfg, scope: ScopeId) -> Result<Mixer, LayoutError> {
        let layout = Layout::build(spec, cfg)?;
        let boundary = Boundary::build(layout.anchors(), layout.boundary_mode(), layout.size());
        let n = layout.len();
        let weights = match &cfg.initial_weights {
            Some(w) if w.len() == n => DVector::from_row_slice(w),
            _ => one_hot(n),
        };
        let mid = layout.size() / 2.0;
        Ok(Mixer {
            layout,
            boundary,
            scope,
            phase: DragPhase::Inactive,
            position: Vector2::new(mid, mid),
            weights,
        })
    }

    /// Feed one pointer signal through the session state machine.
    ///
    /// Returns the new update while a drag is active (`Start` immediately
    /// processes its point, as does every `Move`); `None` for ignored moves
    /// while inactive and for `End`/`Cancel`.
    pub fn input(&mut self, signal: PointerSignal) -> Option<MixUpdate> {
        match (self.phase, signal) {
            (_, PointerSignal::Start(p)) => {
                self.phase = DragPhase::Active;
                Some(self.update(p))
            }
            (DragPhase::Active, PointerSignal::Move(p)) => Some(self.update(p)),
            (DragPhase::Inactive, PointerSignal::Move(_)) => None,
            (_, PointerSignal::End) | (_, PointerSignal::Cancel) => {
                self.phase = DragPhase::Inactive;
                None
            }
        }
    }

    fn update(&mut self, raw: Vector2<f64>) -> MixUpdate {
        let clamped = self.boundary.clamp(raw);
        let weights = solve_weights(self.layout.gram(), self.layout.anchors(), clamped);
        self.position = clamped;
        self.weights = weights.clone();
        MixUpdate {
            position: clamped,
            weights,
        }
    }

    #[inline]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Anchor positions in canvas coordinates.
    #[inline]
    pub fn anchors(&self) -> &[Vector2<f64>] {
        self.layout.anchors()
    }

    /// Last emitted (or initial) weight vector.
    #[inline]
    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    /// Last clamped (or initial) handle position.
    #[inline]
    pub fn position(&self) -> Vector2<f64> {
        self.position
    }

    #[inline]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }
}

fn one_hot(n: usize) -> DVector<f64> {
    DVector::from_fn(n, |i, _| if i == 0 { 1.0 } else { 0.0 })
}
