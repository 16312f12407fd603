pub mod document;
pub mod error;
pub mod eval;
pub mod geometry;
pub mod id;
pub mod kernels;
pub mod lint;
pub mod matrix;
pub mod model;
pub mod offset;

pub use document::{Document, Listeners, Meta, MetaPatch, Subscription};
pub use error::{EvalError, KernelError};
pub use eval::{EvalResults, evaluate, evaluation_order};
pub use geometry::{Bounds, Contour, EvalResult, Knot, PathGeometry, Segment};
pub use id::NodeId;
pub use kernels::{KernelInputs, run_kernel};
pub use lint::{LintDiagnostic, LintSeverity, lint_document};
pub use matrix::{Matrix, Point, Vector};
pub use model::*;
