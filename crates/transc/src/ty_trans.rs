use crate::context::Context;
use crate::decl_visit;
use transc_errors::TranslateError;
use transc_front::{CBuiltin, CQualType, CType, DeclId, SourceLoc};
use transc_target::TargetTy;

/// spec §4.B "Builtin typedef fast path": these typedef names short-
/// circuit straight to the Target primitive instead of recursing into
/// their (possibly builtin) underlying type.
const BUILTIN_TYPEDEF_FAST_PATH: &[(&str, &str)] = &[
    ("uint8_t", "u8"),
    ("uint16_t", "u16"),
    ("uint32_t", "u32"),
    ("uint64_t", "u64"),
    ("int8_t", "i8"),
    ("int16_t", "i16"),
    ("int32_t", "i32"),
    ("int64_t", "i64"),
    ("size_t", "usize"),
    ("ssize_t", "isize"),
    ("intptr_t", "isize"),
    ("uintptr_t", "usize"),
];

/// spec §4.B builtin table.
pub fn translate_builtin(b: CBuiltin, loc: &SourceLoc) -> Result<TargetTy, TranslateError> {
    use CBuiltin::*;
    Ok(match b {
        Void => TargetTy::ident("c_void"),
        Bool => TargetTy::ident("bool"),
        // spec: "char/signed char → i8 or u8" — plain `char`'s signedness
        // is platform-defined upstream; this workspace follows the
        // common case of treating bare `char` as unsigned (`u8`) and
        // `signed char` as `i8`, matching `SChar`'s explicit signedness.
        Char | UChar => TargetTy::ident("u8"),
        SChar => TargetTy::ident("i8"),
        Short => TargetTy::ident("c_short"),
        UShort => TargetTy::ident("c_ushort"),
        Int => TargetTy::ident("c_int"),
        UInt => TargetTy::ident("c_uint"),
        Long => TargetTy::ident("c_long"),
        ULong => TargetTy::ident("c_ulong"),
        LongLong => TargetTy::ident("c_longlong"),
        ULongLong => TargetTy::ident("c_ulonglong"),
        Int128 => TargetTy::ident("i128"),
        UInt128 => TargetTy::ident("u128"),
        Float => TargetTy::ident("f32"),
        Double => TargetTy::ident("f64"),
        LongDouble => TargetTy::ident("c_longdouble"),
        Float128 => TargetTy::ident("f128"),
        Float16 => TargetTy::ident("f16"),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(TranslateError::UnsupportedType {
                loc: loc.clone(),
                message: "unrecognised builtin type".into(),
            })
        }
    })
}

/// spec §4.B `was_demoted_to_opaque`: recursively follows typedef/
/// elaborated/attributed chains.
pub fn was_demoted_to_opaque(ctx: &Context, qt: &CQualType) -> bool {
    match &*qt.desugar().ty {
        CType::Record(id) | CType::Enum(id) => ctx.opaque_demoted.contains(id),
        CType::Typedef { target, .. } => was_demoted_to_opaque(ctx, target),
        _ => false,
    }
}

/// spec §4.B: the full C type → Target type dispatch.
pub fn translate_qual_type(
    ctx: &mut Context,
    qt: &CQualType,
    loc: &SourceLoc,
) -> Result<TargetTy, TranslateError> {
    match &*qt.ty {
        CType::Builtin(b) => translate_builtin(*b, loc),
        CType::Pointer(pointee) => translate_pointer(ctx, pointee, loc),
        CType::ConstantArray { elem, size } => {
            Ok(TargetTy::array(*size, translate_qual_type(ctx, elem, loc)?))
        }
        CType::IncompleteArray { elem } => {
            let is_const = elem.is_const;
            Ok(TargetTy::c_ptr(is_const, translate_qual_type(ctx, elem, loc)?))
        }
        CType::Typedef { name, target, canonical } => translate_typedef_ref(ctx, name, target, *canonical, loc),
        CType::Record(id) => {
            let name = decl_visit::translate_record(ctx, *id, loc)?;
            Ok(TargetTy::ident(name))
        }
        CType::Enum(id) => {
            let name = decl_visit::translate_enum(ctx, *id, loc)?;
            Ok(TargetTy::ident(name))
        }
        CType::FunctionProto { ret, params, variadic } => {
            if *variadic {
                return Err(TranslateError::UnsupportedType {
                    loc: loc.clone(),
                    message: "variadic function pointer type".into(),
                });
            }
            let mut out_params = Vec::with_capacity(params.len());
            for p in params {
                out_params.push(translate_qual_type(ctx, p, loc)?);
            }
            let ret_ty = if ret.is_void() {
                TargetTy::ident("void")
            } else {
                translate_qual_type(ctx, ret, loc)?
            };
            Ok(TargetTy::FnProto { params: out_params, ret: Box::new(ret_ty) })
        }
        CType::Elaborated(inner)
        | CType::Paren(inner)
        | CType::Decayed(inner)
        | CType::Attributed(inner)
        | CType::MacroQualified(inner) => translate_qual_type(ctx, inner, loc),
    }
}

fn translate_pointer(
    ctx: &mut Context,
    pointee: &CQualType,
    loc: &SourceLoc,
) -> Result<TargetTy, TranslateError> {
    if let CType::FunctionProto { .. } = &*pointee.desugar().ty {
        let inner = translate_qual_type(ctx, pointee, loc)?;
        return Ok(TargetTy::optional(TargetTy::single_ptr(false, inner)));
    }
    let is_opaque =
        matches!(&*pointee.desugar().ty, CType::Record(_) | CType::Enum(_)) && was_demoted_to_opaque(ctx, pointee);
    let inner = translate_qual_type(ctx, pointee, loc)?;
    if is_opaque {
        Ok(TargetTy::single_ptr(pointee.is_const, inner))
    } else {
        Ok(TargetTy::c_ptr(pointee.is_const, inner))
    }
}

fn translate_typedef_ref(
    ctx: &mut Context,
    name: &str,
    target: &CQualType,
    canonical: DeclId,
    loc: &SourceLoc,
) -> Result<TargetTy, TranslateError> {
    if let Some((_, prim)) = BUILTIN_TYPEDEF_FAST_PATH.iter().find(|(n, _)| *n == name) {
        return Ok(TargetTy::ident(*prim));
    }
    let target_name = decl_visit::translate_typedef_ref_target(ctx, canonical, name, target, loc)?;
    Ok(TargetTy::ident(target_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use transc_front::CBuiltin;

    fn loc() -> SourceLoc {
        SourceLoc { file: "t.c".into(), line: 1, column: 1 }
    }

    #[test]
    fn builtin_int_maps_to_c_int() {
        assert_eq!(translate_builtin(CBuiltin::Int, &loc()).unwrap(), TargetTy::ident("c_int"));
    }

    #[test]
    fn fast_path_size_t_is_usize() {
        let mut ctx = Context::new();
        let qt = CQualType::new(CType::Typedef {
            name: "size_t".into(),
            target: Box::new(CQualType::builtin(CBuiltin::ULong)),
            canonical: DeclId(1),
        });
        let ty = translate_qual_type(&mut ctx, &qt, &loc()).unwrap();
        assert_eq!(ty, TargetTy::ident("usize"));
    }

    #[test]
    fn incomplete_array_becomes_c_pointer() {
        let mut ctx = Context::new();
        let qt = CQualType::new(CType::IncompleteArray {
            elem: Box::new(CQualType::builtin(CBuiltin::Char)),
        });
        let ty = translate_qual_type(&mut ctx, &qt, &loc()).unwrap();
        assert_eq!(ty, TargetTy::c_ptr(false, TargetTy::ident("u8")));
    }
}
