use crate::context::Context;
use crate::ty_trans;
use transc_errors::TranslateError;
use transc_front::{CBuiltin, CQualType, CType, SourceLoc};
use transc_target::{Expr, TargetTy};

/// spec §4.E: the 7-rule cast table, given `(src_type, dst_type, expr)`
/// with `dst != src`. Dispatches on the *original* C types rather than
/// the already-erased `TargetTy`, since the width ladder and enum/bool
/// distinctions the table needs (rule 2's integer rank, rule 5/6's
/// bool/enum participation) only exist on the C side.
pub fn cast_expr(
    ctx: &mut Context,
    src_c: &CQualType,
    dst_c: &CQualType,
    operand: Expr,
    loc: &SourceLoc,
) -> Result<Expr, TranslateError> {
    let dst_ty = ty_trans::translate_qual_type(ctx, dst_c, loc)?;
    let src = src_c.desugar();
    let dst = dst_c.desugar();

    match (&*src.ty, &*dst.ty) {
        (CType::Pointer(src_pointee), CType::Pointer(dst_pointee)) => {
            pointer_to_pointer(ctx, src_pointee, dst_pointee, dst_ty, operand, loc)
        }
        (CType::Builtin(CBuiltin::Bool), CType::Builtin(db)) if db.is_integer() => Ok(Expr::intrinsic(
            "as",
            vec![Expr::type_tag(dst_ty), Expr::intrinsic("boolToInt", vec![operand])],
        )),
        (CType::Builtin(sb), CType::Builtin(db)) if sb.is_integer() && db.is_integer() => {
            Ok(int_to_int(*sb, *db, dst_ty, operand))
        }
        (CType::Enum(_), CType::Builtin(db)) if db.is_integer() => {
            let as_int = Expr::intrinsic("enumToInt", vec![operand]);
            // The enum's underlying rank isn't visible from here; `Int`
            // is the common default C gives an enum with no fixed
            // underlying type, so this approximates rule 2's ladder.
            Ok(int_to_int(CBuiltin::Int, *db, dst_ty, as_int))
        }
        (CType::Builtin(sb), CType::Enum(_)) if sb.is_integer() => {
            Ok(Expr::intrinsic("intToEnum", vec![Expr::type_tag(dst_ty), operand]))
        }
        (CType::Builtin(sb), CType::Pointer(_)) if sb.is_integer() => {
            Ok(Expr::intrinsic("intToPtr", vec![Expr::type_tag(dst_ty), operand]))
        }
        (CType::Pointer(_), CType::Builtin(db)) if db.is_integer() => Ok(Expr::intrinsic(
            "intCast",
            vec![Expr::type_tag(dst_ty), Expr::intrinsic("ptrToInt", vec![operand])],
        )),
        (CType::Builtin(sb), CType::Builtin(db)) if sb.is_float() && db.is_float() => {
            Ok(Expr::intrinsic("floatCast", vec![Expr::type_tag(dst_ty), operand]))
        }
        (CType::Builtin(sb), CType::Builtin(db)) if sb.is_float() && db.is_integer() => {
            Ok(Expr::intrinsic("floatToInt", vec![Expr::type_tag(dst_ty), operand]))
        }
        (CType::Builtin(sb), CType::Builtin(db)) if sb.is_integer() && db.is_float() => {
            Ok(Expr::intrinsic("intToFloat", vec![Expr::type_tag(dst_ty), operand]))
        }
        _ => Ok(Expr::intrinsic("as", vec![Expr::type_tag(dst_ty), operand])),
    }
}

fn pointer_to_pointer(
    ctx: &mut Context,
    src_pointee: &CQualType,
    dst_pointee: &CQualType,
    dst_ty: TargetTy,
    operand: Expr,
    loc: &SourceLoc,
) -> Result<Expr, TranslateError> {
    let drops_qualifiers = src_pointee.is_const && !dst_pointee.is_const;
    if drops_qualifiers {
        return Ok(Expr::intrinsic(
            "intToPtr",
            vec![Expr::type_tag(dst_ty), Expr::intrinsic("ptrToInt", vec![operand])],
        ));
    }
    let child_is_opaque = dst_pointee.is_void() || ty_trans::was_demoted_to_opaque(ctx, dst_pointee);
    if child_is_opaque {
        return Ok(Expr::intrinsic("ptrCast", vec![Expr::type_tag(dst_ty), operand]));
    }
    let child_ty = ty_trans::translate_qual_type(ctx, dst_pointee, loc)?;
    Ok(Expr::intrinsic(
        "ptrCast",
        vec![
            Expr::type_tag(dst_ty),
            Expr::intrinsic(
                "alignCast",
                vec![Expr::intrinsic("alignOf", vec![Expr::type_tag(child_ty)]), operand],
            ),
        ],
    ))
}

/// spec §4.E rule 2: classify by width ordering on the fixed ladder
/// (`char < short < int < long < long long < int128`); `@truncate` when
/// narrowing, `@as` when widening, then `@bitCast` on top if the final
/// signedness differs from what the first step produced.
fn int_to_int(src: CBuiltin, dst: CBuiltin, dst_ty: TargetTy, operand: Expr) -> Expr {
    let src_rank = src.integer_rank().unwrap_or(3);
    let dst_rank = dst.integer_rank().unwrap_or(3);
    use std::cmp::Ordering::*;
    match src_rank.cmp(&dst_rank) {
        Equal => {
            if src.is_signed() == dst.is_signed() {
                operand
            } else {
                Expr::intrinsic("bitCast", vec![Expr::type_tag(dst_ty), operand])
            }
        }
        Less => {
            let widened = Expr::intrinsic("as", vec![Expr::type_tag(dst_ty.clone()), operand]);
            if src.is_signed() != dst.is_signed() {
                Expr::intrinsic("bitCast", vec![Expr::type_tag(dst_ty), widened])
            } else {
                widened
            }
        }
        Greater => {
            let truncated = Expr::intrinsic("truncate", vec![Expr::type_tag(dst_ty.clone()), operand]);
            if src.is_signed() != dst.is_signed() {
                Expr::intrinsic("bitCast", vec![Expr::type_tag(dst_ty), truncated])
            } else {
                truncated
            }
        }
    }
}

pub fn target_ty_eq(a: &TargetTy, b: &TargetTy) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLoc {
        SourceLoc { file: "t.c".into(), line: 1, column: 1 }
    }

    #[test]
    fn narrowing_truncates() {
        let mut ctx = Context::new();
        let src = CQualType::builtin(CBuiltin::Long);
        let dst = CQualType::builtin(CBuiltin::Short);
        let e = cast_expr(&mut ctx, &src, &dst, Expr::ident("x"), &loc()).unwrap();
        assert!(matches!(e, Expr::Intrinsic { name: "truncate", .. }));
    }

    #[test]
    fn widening_same_signedness_is_as() {
        let mut ctx = Context::new();
        let src = CQualType::builtin(CBuiltin::Int);
        let dst = CQualType::builtin(CBuiltin::Long);
        let e = cast_expr(&mut ctx, &src, &dst, Expr::ident("x"), &loc()).unwrap();
        assert!(matches!(e, Expr::Intrinsic { name: "as", .. }));
    }

    #[test]
    fn bool_to_int_wraps_boolToInt_then_as() {
        let mut ctx = Context::new();
        let src = CQualType::builtin(CBuiltin::Bool);
        let dst = CQualType::builtin(CBuiltin::Int);
        let e = cast_expr(&mut ctx, &src, &dst, Expr::ident("b"), &loc()).unwrap();
        match e {
            Expr::Intrinsic { name: "as", args } => {
                assert!(matches!(&args[1], Expr::Intrinsic { name: "boolToInt", .. }));
            }
            other => panic!("expected as(..), got {:?}", other),
        }
    }
}
