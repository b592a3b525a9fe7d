//! Drives the macro translator (spec §4.F–G) over a translation unit's
//! macro list after every top-level decl has been visited, and applies
//! the macro → function-pointer-alias substitution spec §4.G describes.

use crate::context::Context;
use crate::ty_trans;
use transc_errors::TranslateError;
use transc_front::{CDecl, CQualType, CType, MacroDef, SourceLoc, TranslationUnit};
use transc_macros::MacroTranslation;
use transc_target::{Block, Expr, Node, Stmt, TargetTy};

/// spec §5: "Macros are translated last, after all decls, so macro-name
/// mangling can see the full decl-name set." Each macro's node is
/// appended to `ctx.root_nodes` in source order.
pub fn translate_all(ctx: &mut Context, unit: &TranslationUnit) {
    for def in &unit.macros {
        translate_one(ctx, unit, def);
    }
}

fn translate_one(ctx: &mut Context, unit: &TranslationUnit, def: &MacroDef) {
    let translation = match transc_macros::translate_macro(def) {
        Ok(t) => t,
        Err(err) => {
            // spec §7: a macro that fails to parse is skipped with a
            // warning rather than aborting the whole translation.
            tracing::warn!("macro {} not translated: {}", def.name, err.message);
            return;
        }
    };

    let mangled = ctx.make_root_mangled_name(&def.name);

    if let MacroTranslation::ObjectLike(Expr::Ident(ref_name)) = &translation {
        if let Some(signature) = function_pointer_global_signature(unit, ref_name) {
            match ctx.decl_table.get(ref_name_decl_id(unit, ref_name)).cloned() {
                Some(target_name) => {
                    match build_function_alias_wrapper(ctx, &mangled, &target_name, signature, &def.loc) {
                        Ok(node) => {
                            ctx.root_nodes.push(node);
                            return;
                        }
                        Err(err) => {
                            tracing::warn!("{}", transc_errors::warning_comment(&err));
                            ctx.root_nodes.push(transc_errors::compile_error_decl(mangled, &err));
                            return;
                        }
                    }
                }
                None => {
                    // The referenced global was never translated (e.g. it
                    // was itself demoted into a diagnostic decl); fall
                    // back to the ordinary alias below.
                }
            }
        }
    }

    ctx.root_nodes.push(transc_macros::macro_translation_to_node(&mangled, translation));
}

/// If `ref_name` names a file-scope variable of function-pointer type,
/// its parameter and return types, cloned out so the caller doesn't have
/// to juggle a borrow of `unit` alongside a mutable borrow of `ctx`.
fn function_pointer_global_signature(
    unit: &TranslationUnit,
    ref_name: &str,
) -> Option<(CQualType, Vec<CQualType>)> {
    let var = unit.decls.iter().find_map(|d| match d {
        CDecl::Var(v) if v.name == ref_name => Some(v),
        _ => None,
    })?;
    match &*var.ty.desugar().ty {
        CType::Pointer(pointee) => match &*pointee.desugar().ty {
            CType::FunctionProto { ret, params, variadic: false } => {
                Some(((**ret).clone(), params.clone()))
            }
            _ => None,
        },
        _ => None,
    }
}

fn ref_name_decl_id<'a>(unit: &'a TranslationUnit, ref_name: &str) -> &'a transc_front::DeclId {
    unit.decls
        .iter()
        .find_map(|d| match d {
            CDecl::Var(v) if v.name == ref_name => Some(&v.id),
            _ => None,
        })
        .expect("caller already confirmed this variable exists")
}

/// Builds `pub inline fn NAME(arg0: T0, ...) RetTy { return TARGET.?(arg0,
/// ...); }` in place of the plain `const NAME = TARGET;` alias a macro
/// naming a function pointer would otherwise get — that alias would copy
/// the optional pointer value, not call through it.
fn build_function_alias_wrapper(
    ctx: &mut Context,
    mangled_name: &str,
    target_name: &str,
    (ret, params): (CQualType, Vec<CQualType>),
    loc: &SourceLoc,
) -> Result<Node, TranslateError> {
    let mut out_params = Vec::with_capacity(params.len());
    for (i, p) in params.iter().enumerate() {
        let name = format!("arg{}", i);
        let ty = ty_trans::translate_qual_type(ctx, p, loc)?;
        out_params.push((name, ty));
    }
    let return_ty =
        if ret.is_void() { TargetTy::ident("void") } else { ty_trans::translate_qual_type(ctx, &ret, loc)? };

    let callee = Expr::optional_unwrap(Expr::ident(target_name.to_string()));
    let args = out_params.iter().map(|(n, _)| Expr::ident(n.clone())).collect();
    let call = Expr::call(callee, args);

    let mut body = Block::new();
    if matches!(&return_ty, TargetTy::Ident(n) if n == "void") {
        body.push(Stmt::Expr(call));
    } else {
        body.push(Stmt::Return(Some(call)));
    }

    Ok(Node::FnDecl {
        name: mangled_name.to_string(),
        is_pub: true,
        is_extern: false,
        is_inline: true,
        params: out_params,
        return_ty,
        body: Some(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use transc_front::{CBuiltin, CVarDecl, DeclId, StorageClass};

    fn loc() -> SourceLoc {
        SourceLoc { file: "t.c".into(), line: 1, column: 1 }
    }

    fn fn_ptr_var(id: u32, name: &str) -> CDecl {
        CDecl::Var(CVarDecl {
            id: DeclId(id),
            name: name.into(),
            ty: CQualType::new(CType::Pointer(Box::new(CQualType::new(CType::FunctionProto {
                ret: Box::new(CQualType::builtin(CBuiltin::Int)),
                params: vec![CQualType::builtin(CBuiltin::Int)],
                variadic: false,
            })))),
            storage: StorageClass::None,
            initializer: None,
            is_block_scope: false,
            align: None,
            loc: loc(),
        })
    }

    #[test]
    fn macro_aliasing_function_pointer_global_becomes_wrapper() {
        let mut ctx = Context::new();
        let var_decl = fn_ptr_var(1, "g_handler");
        ctx.decl_table.insert(DeclId(1), "g_handler".to_string());
        let unit = TranslationUnit {
            decls: vec![var_decl],
            macros: vec![MacroDef { name: "HANDLER".into(), loc: loc(), raw_source: "g_handler".into() }],
        };
        translate_all(&mut ctx, &unit);
        let text = transc_target::render(&ctx.root_nodes);
        assert!(text.contains("pub inline fn HANDLER(arg0: c_int) c_int"));
        assert!(text.contains("g_handler.?(arg0)"));
    }

    #[test]
    fn plain_object_macro_is_unaffected() {
        let mut ctx = Context::new();
        let unit = TranslationUnit {
            decls: vec![],
            macros: vec![MacroDef { name: "MODE".into(), loc: loc(), raw_source: "0755".into() }],
        };
        translate_all(&mut ctx, &unit);
        let text = transc_target::render(&ctx.root_nodes);
        assert_eq!(text, "pub const MODE = 0o755;\n");
    }
}
