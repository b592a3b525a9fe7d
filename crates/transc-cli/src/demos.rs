//! Canned translation units, one per end-to-end scenario spec §8 names
//! literally, so the CLI has something concrete to run without a real C
//! front-end wired up.

use transc_front::{
    CBuiltin, CDecl, CExpr, CField, CFunctionDecl, CParam, CQualType, CRecordDef, CStmt,
    CType, CTypedefDecl, DeclId, MacroDef, SourceLoc, StorageClass, TranslationUnit, UnaryOp,
};

pub const NAMES: &[&str] = &[
    "typedef",
    "opaque-bitfield",
    "signed-modulus",
    "post-increment",
    "function-macro",
    "octal-macro",
];

pub fn build(name: &str) -> Option<TranslationUnit> {
    Some(match name {
        "typedef" => identity_typedef(),
        "opaque-bitfield" => opaque_demotion_by_bitfield(),
        "signed-modulus" => signed_modulus(),
        "post-increment" => post_increment_used(),
        "function-macro" => function_like_macro(),
        "octal-macro" => octal_literal_macro(),
        _ => return None,
    })
}

fn loc() -> SourceLoc {
    SourceLoc { file: "demo.c".into(), line: 1, column: 1 }
}

/// spec §8 scenario 1: `typedef int my_int;` → `pub const my_int = c_int;`.
fn identity_typedef() -> TranslationUnit {
    TranslationUnit {
        decls: vec![CDecl::Typedef(CTypedefDecl {
            id: DeclId(1),
            name: "my_int".into(),
            underlying: CQualType::builtin(CBuiltin::Int),
            loc: loc(),
        })],
        macros: vec![],
    }
}

/// spec §8 scenario 2: `struct S { int a : 3; int b; };` → demoted to
/// opaque, with a warning comment naming the demotion.
fn opaque_demotion_by_bitfield() -> TranslationUnit {
    let def = CRecordDef {
        id: DeclId(1),
        name: Some("S".into()),
        is_union: false,
        fields: Some(vec![
            CField {
                name: Some("a".into()),
                ty: CQualType::builtin(CBuiltin::Int),
                bit_width: Some(3),
                is_flexible_array: false,
                align: None,
            },
            CField {
                name: Some("b".into()),
                ty: CQualType::builtin(CBuiltin::Int),
                bit_width: None,
                is_flexible_array: false,
                align: None,
            },
        ]),
        align: None,
        loc: loc(),
    };
    TranslationUnit { decls: vec![CDecl::Record(def)], macros: vec![] }
}

/// spec §8 scenario 3: `int r(int a, int b) { return a % b; }` → body
/// contains `return @rem(a, b);`.
fn signed_modulus() -> TranslationUnit {
    let a_ref = CExpr::DeclRef { id: DeclId(2), name: "a".into(), ty: CQualType::builtin(CBuiltin::Int) };
    let b_ref = CExpr::DeclRef { id: DeclId(3), name: "b".into(), ty: CQualType::builtin(CBuiltin::Int) };
    let rem = CExpr::Binary {
        op: transc_front::BinaryOp::Rem,
        lhs: Box::new(a_ref),
        rhs: Box::new(b_ref),
        ty: CQualType::builtin(CBuiltin::Int),
    };
    let f = CFunctionDecl {
        id: DeclId(1),
        name: "r".into(),
        params: vec![
            CParam { name: Some("a".into()), ty: CQualType::builtin(CBuiltin::Int) },
            CParam { name: Some("b".into()), ty: CQualType::builtin(CBuiltin::Int) },
        ],
        return_ty: CQualType::builtin(CBuiltin::Int),
        variadic: false,
        storage: StorageClass::None,
        is_definition: true,
        body: Some(CStmt::Compound(vec![CStmt::Return(Some(rem))])),
        definition_elsewhere: None,
        is_noreturn: false,
        loc: loc(),
    };
    TranslationUnit { decls: vec![CDecl::Function(f)], macros: vec![] }
}

/// spec §8 scenario 4: `int g(int *p) { return (*p)++; }` → a labeled
/// block binding `ref = &(*p)`, then `tmp = ref.*`, then `ref.* += 1`,
/// then breaking with `tmp`.
fn post_increment_used() -> TranslationUnit {
    let ptr_ty = CQualType::new(CType::Pointer(Box::new(CQualType::builtin(CBuiltin::Int))));
    let p_ref = CExpr::DeclRef { id: DeclId(2), name: "p".into(), ty: ptr_ty };
    let deref =
        CExpr::Unary { op: UnaryOp::Deref, operand: Box::new(p_ref), ty: CQualType::builtin(CBuiltin::Int) };
    let post_inc = CExpr::Unary {
        op: UnaryOp::PostInc,
        operand: Box::new(deref),
        ty: CQualType::builtin(CBuiltin::Int),
    };
    let f = CFunctionDecl {
        id: DeclId(1),
        name: "g".into(),
        params: vec![CParam {
            name: Some("p".into()),
            ty: CQualType::new(CType::Pointer(Box::new(CQualType::builtin(CBuiltin::Int)))),
        }],
        return_ty: CQualType::builtin(CBuiltin::Int),
        variadic: false,
        storage: StorageClass::None,
        is_definition: true,
        body: Some(CStmt::Compound(vec![CStmt::Return(Some(post_inc))])),
        definition_elsewhere: None,
        is_noreturn: false,
        loc: loc(),
    };
    TranslationUnit { decls: vec![CDecl::Function(f)], macros: vec![] }
}

/// spec §8 scenario 5: `#define SQ(x) ((x)*(x))` → an inline function
/// whose return type is inferred with `@TypeOf`.
fn function_like_macro() -> TranslationUnit {
    TranslationUnit {
        decls: vec![],
        macros: vec![MacroDef { name: "SQ".into(), loc: loc(), raw_source: "(x) ((x)*(x))".into() }],
    }
}

/// spec §8 scenario 6: `#define MODE 0755` → `pub const MODE = 0o755;`.
fn octal_literal_macro() -> TranslationUnit {
    TranslationUnit {
        decls: vec![],
        macros: vec![MacroDef { name: "MODE".into(), loc: loc(), raw_source: "0755".into() }],
    }
}
