//! The Target AST: an opaque builder API, per spec §3 and §6. The
//! lowerer in `transc` never inspects these nodes except through the
//! constructors exposed here. A small recursive-descent renderer is
//! included so the rest of the workspace (and its tests) has something
//! to assert literal output shapes against — spec §6 treats the real
//! renderer as an external collaborator, but without *a* renderer the
//! scenarios in spec §8 would be untestable.

mod expr;
mod node;
mod render;
mod ty;

pub use expr::{Block, Expr, NumBase, NumberLiteral, Stmt, SwitchCase};
pub use node::Node;
pub use render::render;
pub use ty::TargetTy;
