mod ast;
mod builder;
mod coercion;
mod eval;
mod rewrite;


pub use ast::{CompareOp, ComparePredicate, OVERLAY_TEXT_FIELD, OverlayPredicate, Predicate};
pub use builder::{FieldRef, field};
pub use coercion::CoercionId;
pub use eval::{FieldPresence, Row, eval};
pub use rewrite::{RewriteError, rewrite};
