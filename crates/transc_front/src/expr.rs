use crate::{CQualType, DeclId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,    // `!`
    BitNot, // `~`
    Deref,  // `*p`
    AddrOf, // `&x`
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    LogAnd,
    LogOr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        use BinaryOp::*;
        matches!(self, Lt | Le | Gt | Ge | Eq | Ne)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LogAnd | BinaryOp::LogOr)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StringKind {
    Narrow,
    Utf16,
    Utf32,
    Wide,
}

/// A designator in a C99 designated initializer (`.field = x`, `[i] = x`).
#[derive(Clone, Debug, PartialEq)]
pub enum Designator {
    Field(String),
    Index(u64),
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InitElement {
    pub designator: Designator,
    pub value: CExpr,
}

/// A C expression, already type-checked by the front-end (every variant
/// carries its resolved `CQualType`). Spec §4.D's lowerer dispatches on
/// this enum.
#[derive(Clone, Debug, PartialEq)]
pub enum CExpr {
    IntLiteral { value: i128, ty: CQualType },
    FloatLiteral { value: f64, ty: CQualType },
    StringLiteral { bytes: Vec<u8>, kind: StringKind, ty: CQualType },
    DeclRef { id: DeclId, name: String, ty: CQualType },
    Unary { op: UnaryOp, operand: Box<CExpr>, ty: CQualType },
    Binary { op: BinaryOp, lhs: Box<CExpr>, rhs: Box<CExpr>, ty: CQualType },
    Assign { lhs: Box<CExpr>, rhs: Box<CExpr>, ty: CQualType },
    CompoundAssign { op: BinaryOp, lhs: Box<CExpr>, rhs: Box<CExpr>, ty: CQualType },
    Call { callee: Box<CExpr>, args: Vec<CExpr>, ty: CQualType },
    Member { base: Box<CExpr>, field: String, arrow: bool, ty: CQualType },
    Index { base: Box<CExpr>, index: Box<CExpr>, ty: CQualType },
    Cast { operand: Box<CExpr>, ty: CQualType },
    Conditional { cond: Box<CExpr>, then: Box<CExpr>, els: Box<CExpr>, ty: CQualType },
    /// GNU `x ?: y`.
    BinaryConditional { cond: Box<CExpr>, els: Box<CExpr>, ty: CQualType },
    Comma { lhs: Box<CExpr>, rhs: Box<CExpr>, ty: CQualType },
    InitList { elements: Vec<InitElement>, ty: CQualType },
    SizeOfType { ty: CQualType, result_ty: CQualType },
    AlignOfType { ty: CQualType, result_ty: CQualType },
    Paren { inner: Box<CExpr> },
}

impl CExpr {
    pub fn ty(&self) -> &CQualType {
        match self {
            CExpr::IntLiteral { ty, .. }
            | CExpr::FloatLiteral { ty, .. }
            | CExpr::StringLiteral { ty, .. }
            | CExpr::DeclRef { ty, .. }
            | CExpr::Unary { ty, .. }
            | CExpr::Binary { ty, .. }
            | CExpr::Assign { ty, .. }
            | CExpr::CompoundAssign { ty, .. }
            | CExpr::Call { ty, .. }
            | CExpr::Member { ty, .. }
            | CExpr::Index { ty, .. }
            | CExpr::Cast { ty, .. }
            | CExpr::Conditional { ty, .. }
            | CExpr::BinaryConditional { ty, .. }
            | CExpr::Comma { ty, .. }
            | CExpr::InitList { ty, .. } => ty,
            CExpr::SizeOfType { result_ty, .. } | CExpr::AlignOfType { result_ty, .. } => {
                result_ty
            }
            CExpr::Paren { inner } => inner.ty(),
        }
    }

    /// Structural l-value test: is this something `&expr` could bind to?
    /// Drives the ref/deref shape of `++`/`--`/compound-assignment lowering
    /// in spec §4.D.
    pub fn is_lvalue(&self) -> bool {
        match self {
            CExpr::DeclRef { .. } | CExpr::Member { .. } | CExpr::Index { .. } => true,
            CExpr::Unary { op: UnaryOp::Deref, .. } => true,
            CExpr::Paren { inner } => inner.is_lvalue(),
            _ => false,
        }
    }
}
