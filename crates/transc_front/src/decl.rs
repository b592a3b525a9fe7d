use crate::{CEnumDef, CExpr, CQualType, CRecordDef, CStmt, DeclId, SourceLoc};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StorageClass {
    None,
    Static,
    Extern,
    /// `__private_extern__` / Apple's variant; always a compile-error decl
    /// per spec §7.
    PrivateExtern,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CParam {
    pub name: Option<String>,
    pub ty: CQualType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CFunctionDecl {
    pub id: DeclId,
    pub name: String,
    pub params: Vec<CParam>,
    pub return_ty: CQualType,
    pub variadic: bool,
    pub storage: StorageClass,
    pub is_definition: bool,
    pub body: Option<CStmt>,
    /// Canonical id of a definition elsewhere, when this decl is a
    /// prototype-only redeclaration (spec §4.C: "if not a definition but
    /// a definition exists elsewhere, recurse to it").
    pub definition_elsewhere: Option<DeclId>,
    pub is_noreturn: bool,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CTypedefDecl {
    pub id: DeclId,
    pub name: String,
    pub underlying: CQualType,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CVarDecl {
    pub id: DeclId,
    pub name: String,
    pub ty: CQualType,
    pub storage: StorageClass,
    pub initializer: Option<CExpr>,
    /// True when this decl lives inside a function body rather than at
    /// file scope; drives the visibility computation in spec §4.C.
    pub is_block_scope: bool,
    /// An explicit `_Alignas`/`__attribute__((aligned(N)))` on the
    /// variable itself, carried into an `align(N)` annotation.
    pub align: Option<u32>,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CDecl {
    Function(CFunctionDecl),
    Typedef(CTypedefDecl),
    Record(CRecordDef),
    Enum(CEnumDef),
    Var(CVarDecl),
}

impl CDecl {
    pub fn id(&self) -> DeclId {
        match self {
            CDecl::Function(d) => d.id,
            CDecl::Typedef(d) => d.id,
            CDecl::Record(d) => d.id,
            CDecl::Enum(d) => d.id,
            CDecl::Var(d) => d.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            CDecl::Function(d) => Some(&d.name),
            CDecl::Typedef(d) => Some(&d.name),
            CDecl::Record(d) => d.name.as_deref(),
            CDecl::Enum(d) => d.name.as_deref(),
            CDecl::Var(d) => Some(&d.name),
        }
    }
}
