//! Barycentric weight-mixer engine.
//!
//! One draggable 2D handle inside a region spanned by N anchor points,
//! continuously resolved into an N-dimensional, non-negative, unit-sum
//! weight vector (a generalized barycentric mix). The engine covers anchor
//! layout, boundary clamping, and the weight solve; rendering and pointer
//! wiring belong to the caller, which feeds normalized
//! [`session::PointerSignal`]s and consumes [`session::MixUpdate`]s.
//!
//! Data flows one way: anchors → Gram matrix → boundary description →
//! per-move clamp → weight solve. All per-move work is synchronous and
//! cheap (O(n) clamp, O(n³) solve with n ≤ ~12 anchors), comfortably within
//! interactive rates.

pub mod boundary;
pub mod layout;
pub mod linalg;
pub mod scope;
pub mod session;
pub mod solver;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::boundary::{Boundary, BoundaryMode, XInterval};
    pub use crate::layout::{Layout, LayoutCfg, LayoutError, LayoutSpec, DEFAULT_SIZE};
    pub use crate::scope::{ScopeId, ScopeRegistry};
    pub use crate::session::{DragPhase, MixUpdate, Mixer, PointerSignal};
    pub use crate::solver::solve_weights;
    pub use nalgebra::Vector2 as Vec2;
}
