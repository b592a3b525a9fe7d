//! The C-to-Target translator core (spec §2–§5): scope stack, type
//! translator, cast engine, declaration visitor, statement/expression
//! lowerer, and the finalizer that assembles everything the renderer
//! needs. `transc_front` stands in for the C front-end this crate only
//! consumes; `transc_target` is the Target AST + renderer it produces.

mod cast;
mod context;
mod decl_visit;
mod finalize;
mod lower;
mod macros;
mod scope;
mod ty_trans;

use transc_front::TranslationUnit;
use transc_target::Node;

pub use context::Context;

/// Translates one already-parsed, semantically-resolved `TranslationUnit`
/// into an ordered list of Target AST nodes, ready for
/// `transc_target::render`.
///
/// Implements the driver loop spec §6 otherwise leaves to the caller
/// (which, upstream, also owns argv parsing and allocator provisioning —
/// both out of this crate's scope per spec §1):
///
/// 1. A first pass populates `Context::global_names` over every decl and
///    macro name, so mangling decisions made while visiting the first
///    decl don't collide with a name only the tenth decl introduces
///    (spec §5, "Ordering guarantees").
/// 2. Every top-level decl is visited in source order.
/// 3. Every macro is translated last, once all decls have names (spec §5;
///    spec §4.G's macro → function-pointer-alias substitution depends on
///    this ordering too).
/// 4. The finalizer (spec §4.H) prepends the preamble and flushes queued
///    tag-name aliases.
pub fn translate(unit: &TranslationUnit) -> Vec<Node> {
    let mut ctx = Context::new();
    populate_first_pass(&mut ctx, unit);

    for decl in &unit.decls {
        decl_visit::visit_top_level_decl(&mut ctx, decl);
    }

    macros::translate_all(&mut ctx, unit);

    finalize::finalize(&mut ctx)
}

fn populate_first_pass(ctx: &mut Context, unit: &TranslationUnit) {
    for decl in &unit.decls {
        ctx.decls_by_id.insert(decl.id(), decl.clone());
        if let Some(name) = decl.name() {
            ctx.global_names.insert(name.to_string());
        }
        // C enumerators are visible at file scope, not just through
        // their enum's own name, so they need reserving too.
        if let transc_front::CDecl::Enum(e) = decl {
            for enumerator in &e.enumerators {
                ctx.global_names.insert(enumerator.name.clone());
            }
        }
    }
    for m in &unit.macros {
        ctx.global_names.insert(m.name.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transc_front::{CBuiltin, CDecl, CQualType, CTypedefDecl, DeclId, MacroDef, SourceLoc};

    fn loc() -> SourceLoc {
        SourceLoc { file: "t.c".into(), line: 1, column: 1 }
    }

    #[test]
    fn translates_typedef_and_macro_in_one_pass() {
        let unit = TranslationUnit {
            decls: vec![CDecl::Typedef(CTypedefDecl {
                id: DeclId(1),
                name: "my_int".into(),
                underlying: CQualType::builtin(CBuiltin::Int),
                loc: loc(),
            })],
            macros: vec![MacroDef { name: "MODE".into(), loc: loc(), raw_source: "0755".into() }],
        };
        let nodes = translate(&unit);
        let text = transc_target::render(&nodes);
        assert!(text.starts_with("usingnamespace @import(\"builtins\");\n"));
        assert!(text.contains("pub const my_int = c_int;"));
        assert!(text.contains("pub const MODE = 0o755;"));
    }

    #[test]
    fn macro_name_colliding_with_a_decl_name_is_mangled() {
        let unit = TranslationUnit {
            decls: vec![CDecl::Typedef(CTypedefDecl {
                id: DeclId(1),
                name: "FOO".into(),
                underlying: CQualType::builtin(CBuiltin::Int),
                loc: loc(),
            })],
            macros: vec![MacroDef { name: "FOO".into(), loc: loc(), raw_source: "1".into() }],
        };
        let nodes = translate(&unit);
        let text = transc_target::render(&nodes);
        assert!(text.contains("pub const FOO = c_int;"));
        assert!(text.contains("pub const FOO_1 = 1;"));
    }
}
