//! End-to-end scenarios from spec §8: exercises `transc::translate` +
//! `transc_target::render` as a whole, the way a real driver would call
//! them, rather than the individual-stage unit tests colocated with each
//! module.

use transc_front::{
    BinaryOp, CBuiltin, CDecl, CEnumDef, CEnumerator, CExpr, CField, CFunctionDecl, CParam,
    CQualType, CRecordDef, CStmt, CType, CVarDecl, DeclId, MacroDef, SourceLoc, StorageClass,
    TranslationUnit,
};

fn loc() -> SourceLoc {
    SourceLoc { file: "t.c".into(), line: 1, column: 1 }
}

fn int_lit(v: i128) -> CExpr {
    CExpr::IntLiteral { value: v, ty: CQualType::builtin(CBuiltin::Int) }
}

#[test]
fn empty_translation_unit_has_only_the_preamble() {
    let unit = TranslationUnit::default();
    let nodes = transc::translate(&unit);
    let text = transc_target::render(&nodes);
    assert!(text.starts_with("usingnamespace @import(\"builtins\");\n"));
    assert!(!text.contains("pub const"));
}

#[test]
fn macro_only_translation_unit_has_only_macro_decls() {
    let unit = TranslationUnit {
        decls: vec![],
        macros: vec![MacroDef { name: "MODE".into(), loc: loc(), raw_source: "0755".into() }],
    };
    let nodes = transc::translate(&unit);
    let text = transc_target::render(&nodes);
    assert!(text.starts_with("usingnamespace @import(\"builtins\");\n"));
    assert!(text.contains("pub const MODE = 0o755;"));
}

#[test]
fn flexible_array_only_record_is_opaque() {
    let def = CRecordDef {
        id: DeclId(1),
        name: Some("Buf".into()),
        is_union: false,
        fields: Some(vec![CField {
            name: Some("data".into()),
            ty: CQualType::builtin(CBuiltin::Char),
            bit_width: None,
            is_flexible_array: true,
            align: None,
        }]),
        align: None,
        loc: loc(),
    };
    let unit = TranslationUnit { decls: vec![CDecl::Record(def)], macros: vec![] };
    let text = transc_target::render(&transc::translate(&unit));
    assert!(text.contains("pub const struct_Buf = opaque {};"));
    assert!(text.contains("demoted"));
}

#[test]
fn enum_with_no_explicit_values_is_tag_only_with_c_int_underlying() {
    let def = CEnumDef {
        id: DeclId(1),
        name: Some("Color".into()),
        underlying: CQualType::builtin(CBuiltin::Int),
        enumerators: vec![
            CEnumerator { name: "RED".into(), value: 0, is_explicit: false },
            CEnumerator { name: "GREEN".into(), value: 1, is_explicit: false },
        ],
        loc: loc(),
    };
    let unit = TranslationUnit { decls: vec![CDecl::Enum(def)], macros: vec![] };
    let text = transc_target::render(&transc::translate(&unit));
    assert!(text.contains("pub const enum_Color = enum(c_int)"));
    assert!(text.contains("RED"));
    assert!(text.contains("GREEN"));
    // Each enumerator is also visible at file scope.
    assert!(text.contains("pub const RED = enum_Color.RED;"));
}

#[test]
fn enum_with_an_explicit_value_becomes_individual_constants() {
    let def = CEnumDef {
        id: DeclId(1),
        name: Some("Flags".into()),
        underlying: CQualType::builtin(CBuiltin::UInt),
        enumerators: vec![
            CEnumerator { name: "A".into(), value: 1, is_explicit: true },
            CEnumerator { name: "B".into(), value: 2, is_explicit: true },
        ],
        loc: loc(),
    };
    let unit = TranslationUnit { decls: vec![CDecl::Enum(def)], macros: vec![] };
    let text = transc_target::render(&transc::translate(&unit));
    assert!(!text.contains("enum(c_int) {"));
    assert!(text.contains("pub const A"));
    assert!(text.contains("pub const B"));
}

#[test]
fn shift_by_width_equal_constant_emits_log2_int_cast() {
    let a = CExpr::DeclRef { id: DeclId(2), name: "a".into(), ty: CQualType::builtin(CBuiltin::Int) };
    let expr = CExpr::Binary {
        op: BinaryOp::Shl,
        lhs: Box::new(a),
        rhs: Box::new(int_lit(31)),
        ty: CQualType::builtin(CBuiltin::Int),
    };
    let f = CFunctionDecl {
        id: DeclId(1),
        name: "shift_it".into(),
        params: vec![CParam { name: Some("a".into()), ty: CQualType::builtin(CBuiltin::Int) }],
        return_ty: CQualType::builtin(CBuiltin::Int),
        variadic: false,
        storage: StorageClass::None,
        is_definition: true,
        body: Some(CStmt::Compound(vec![CStmt::Return(Some(expr))])),
        definition_elsewhere: None,
        is_noreturn: false,
        loc: loc(),
    };
    let unit = TranslationUnit { decls: vec![CDecl::Function(f)], macros: vec![] };
    let text = transc_target::render(&transc::translate(&unit));
    assert!(text.contains("@intCast(@Log2Int(c_int)"));
    assert!(text.contains("<<"));
}

#[test]
fn signed_div_by_minus_one_is_preserved_as_div_trunc() {
    let a = CExpr::DeclRef { id: DeclId(2), name: "a".into(), ty: CQualType::builtin(CBuiltin::Int) };
    let minus_one = CExpr::Unary {
        op: transc_front::UnaryOp::Neg,
        operand: Box::new(int_lit(1)),
        ty: CQualType::builtin(CBuiltin::Int),
    };
    let expr = CExpr::Binary {
        op: BinaryOp::Div,
        lhs: Box::new(a),
        rhs: Box::new(minus_one),
        ty: CQualType::builtin(CBuiltin::Int),
    };
    let f = CFunctionDecl {
        id: DeclId(1),
        name: "divide_it".into(),
        params: vec![CParam { name: Some("a".into()), ty: CQualType::builtin(CBuiltin::Int) }],
        return_ty: CQualType::builtin(CBuiltin::Int),
        variadic: false,
        storage: StorageClass::None,
        is_definition: true,
        body: Some(CStmt::Compound(vec![CStmt::Return(Some(expr))])),
        definition_elsewhere: None,
        is_noreturn: false,
        loc: loc(),
    };
    let unit = TranslationUnit { decls: vec![CDecl::Function(f)], macros: vec![] };
    let text = transc_target::render(&transc::translate(&unit));
    assert!(text.contains("@divTrunc(a, -@as(c_int, 1))"));
}

#[test]
fn extern_variable_declaration_round_trips_linkage() {
    let v = CVarDecl {
        id: DeclId(1),
        name: "g_count".into(),
        ty: CQualType::builtin(CBuiltin::Int),
        storage: StorageClass::Extern,
        initializer: None,
        is_block_scope: false,
        align: None,
        loc: loc(),
    };
    let unit = TranslationUnit { decls: vec![CDecl::Var(v)], macros: vec![] };
    let text = transc_target::render(&transc::translate(&unit));
    assert!(text.contains("pub extern var g_count: c_int;"));
}
