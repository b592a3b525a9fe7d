use crate::TargetTy;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NumBase {
    Decimal,
    Octal,
    Hex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberLiteral {
    pub base: NumBase,
    /// Digits only, no base prefix and no sign.
    pub digits: String,
    pub negative: bool,
}

/// An expression node in the Target AST. Spec §3 lists the builder
/// constructors this corresponds to; each variant below is one of them.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(NumberLiteral),
    Float(String),
    Bool(bool),
    Null,
    /// A narrow string literal, already escaped into Target syntax.
    Str(String),
    Ident(String),
    Binary { op: &'static str, lhs: Box<Expr>, rhs: Box<Expr> },
    Unary { op: &'static str, operand: Box<Expr> },
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// One of the intrinsic-call wrappers from spec §3 (`@bitCast`,
    /// `@truncate`, `@intCast`, `@ptrCast`, `@alignCast`, `@alignOf`,
    /// `@sizeOf`, `@boolToInt`, `@intToEnum`, `@enumToInt`, `@as`, ...).
    Intrinsic { name: &'static str, args: Vec<Expr> },
    Field { base: Box<Expr>, name: String },
    Deref { base: Box<Expr> },
    AddrOf { base: Box<Expr> },
    Index { base: Box<Expr>, index: Box<Expr> },
    Paren(Box<Expr>),
    If { cond: Box<Expr>, then: Box<Expr>, els: Box<Expr> },
    Assign { lhs: Box<Expr>, op: &'static str, rhs: Box<Expr> },
    /// A value-producing block (`blk: { ...; break :blk v; }`).
    Block(Block),
    /// Not a real expression — a `TargetTy` smuggled through `Expr` so it
    /// can sit as the first argument of an `@as(ty, value)` intrinsic
    /// call without giving every intrinsic arg slot a separate ty/expr
    /// union. The renderer special-cases it.
    TypeTag(Box<TargetTy>),
    /// `.{ .field = value, ... }`, an anonymous struct literal (record
    /// and union initializer lists lower to this).
    StructLiteral(Vec<(String, Expr)>),
    /// `.{ v0, v1, ... }`, an anonymous array/tuple literal (array
    /// initializer lists lower to this).
    ArrayLiteral(Vec<Expr>),
    /// `<expr>.?`, unwrapping an `Optional(T)` (spec §4.D: calling through
    /// a function-pointer-typed callee that isn't itself a direct
    /// function-declaration reference).
    OptionalUnwrap(Box<Expr>),
    /// `([_]elem_ty{filler}) ** count`, the short-initializer-list filler
    /// spec §4.D's initializer-list lowering describes for arrays.
    Repeat { elem_ty: Box<TargetTy>, filler: Box<Expr>, count: Box<Expr> },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn int(value: i128) -> Self {
        Expr::Number(NumberLiteral {
            base: NumBase::Decimal,
            digits: value.unsigned_abs().to_string(),
            negative: value < 0,
        })
    }

    pub fn bin(op: &'static str, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn unary(op: &'static str, operand: Expr) -> Self {
        Expr::Unary { op, operand: Box::new(operand) }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call { callee: Box::new(callee), args }
    }

    pub fn intrinsic(name: &'static str, args: Vec<Expr>) -> Self {
        Expr::Intrinsic { name, args }
    }

    pub fn field(base: Expr, name: impl Into<String>) -> Self {
        Expr::Field { base: Box::new(base), name: name.into() }
    }

    pub fn deref(base: Expr) -> Self {
        Expr::Deref { base: Box::new(base) }
    }

    pub fn addr_of(base: Expr) -> Self {
        Expr::AddrOf { base: Box::new(base) }
    }

    pub fn index(base: Expr, index: Expr) -> Self {
        Expr::Index { base: Box::new(base), index: Box::new(index) }
    }

    pub fn paren(inner: Expr) -> Self {
        Expr::Paren(Box::new(inner))
    }

    pub fn if_expr(cond: Expr, then: Expr, els: Expr) -> Self {
        Expr::If { cond: Box::new(cond), then: Box::new(then), els: Box::new(els) }
    }

    pub fn assign(lhs: Expr, op: &'static str, rhs: Expr) -> Self {
        Expr::Assign { lhs: Box::new(lhs), op, rhs: Box::new(rhs) }
    }

    /// `@as(ty, self)`, spec §4.D's literal-typing / hygiene wrapper.
    pub fn as_ty(self, ty: TargetTy) -> Self {
        Expr::Intrinsic { name: "as", args: vec![Expr::TypeTag(Box::new(ty)), self] }
    }
}

// `Expr::TypeTag` isn't a real expression the Target language has; it's a
// marker the renderer special-cases so `@as(T, x)` can carry a `TargetTy`
// as its first argument without the whole `Expr` tree needing a `Ty`
// variant duplicated everywhere `TargetTy` already lives.
impl Expr {
    pub fn type_tag(ty: TargetTy) -> Self {
        Expr::TypeTag(Box::new(ty))
    }

    pub fn struct_literal(fields: Vec<(String, Expr)>) -> Self {
        Expr::StructLiteral(fields)
    }

    pub fn array_literal(elements: Vec<Expr>) -> Self {
        Expr::ArrayLiteral(elements)
    }

    pub fn optional_unwrap(inner: Expr) -> Self {
        Expr::OptionalUnwrap(Box::new(inner))
    }

    pub fn repeat(elem_ty: TargetTy, filler: Expr, count: Expr) -> Self {
        Expr::Repeat { elem_ty: Box::new(elem_ty), filler: Box::new(filler), count: Box::new(count) }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub label: Option<String>,
    pub stmts: Vec<Stmt>,
    /// When `Some`, this block is used as an expression and its value is
    /// the argument of the final `break :label value;`.
    pub result: Option<Box<Expr>>,
}

impl Block {
    pub fn new() -> Self {
        Block { label: None, stmts: Vec::new(), result: None }
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Block { label: Some(label.into()), stmts: Vec::new(), result: None }
    }

    pub fn push(&mut self, stmt: Stmt) -> &mut Self {
        self.stmts.push(stmt);
        self
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub values: Vec<Expr>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    VarDecl { name: String, mutable: bool, ty: Option<TargetTy>, init: Option<Expr> },
    Return(Option<Expr>),
    Break { label: Option<String>, value: Option<Expr> },
    Continue(Option<String>),
    If { cond: Expr, then: Block, els: Option<Block> },
    While { cond: Expr, continue_expr: Option<Expr>, body: Block },
    Switch { cond: Expr, cases: Vec<SwitchCase>, else_body: Option<Block> },
    Block(Block),
}
