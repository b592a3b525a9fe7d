//! The macro translator: a C tokenizer over a `#define` body, and a
//! precedence-climbing parser that turns the token stream directly into
//! Target AST, because the semantic front-end has already discarded
//! macros by the time it hands over its AST.

mod parser;
mod token;

pub use parser::{parse_macro_body, MacroParseError, MacroTranslation};
pub use token::{tokenize, Token, TokenKind};

use transc_front::MacroDef;

/// Translates one `#define` into its Target-AST equivalent: an object-like
/// macro becomes a single expression, a function-like macro an inline
/// function whose parameters are untyped (`anytype`) and whose return type
/// is inferred with `@TypeOf`.
pub fn translate_macro(def: &MacroDef) -> Result<MacroTranslation, MacroParseError> {
    if is_function_like(def) {
        let (params, body_src) = split_function_like(&def.raw_source).ok_or_else(|| {
            MacroParseError { message: format!("malformed function-like macro {}", def.name) }
        })?;
        let tokens = tokenize(body_src);
        let body = parse_macro_body(&tokens, Some(&params))?;
        Ok(MacroTranslation::FunctionLike { params, body })
    } else {
        let tokens = tokenize(&def.raw_source);
        let body = parse_macro_body(&tokens, None)?;
        Ok(MacroTranslation::ObjectLike(body))
    }
}

/// Wraps a translated macro body into a top-level Target declaration:
/// a `const` for object-like macros, an `inline fn` with `anytype`
/// parameters for function-like ones.
pub fn macro_translation_to_node(name: &str, translation: MacroTranslation) -> transc_target::Node {
    use transc_target::{Block, Node, Stmt, TargetTy};
    match translation {
        MacroTranslation::ObjectLike(value) => {
            Node::ConstDecl { name: name.to_string(), is_pub: true, ty: None, value }
        }
        MacroTranslation::FunctionLike { params, body } => {
            let return_ty = TargetTy::TypeOf(Box::new(body.clone()));
            let mut block = Block::new();
            block.push(Stmt::Return(Some(body)));
            Node::FnDecl {
                name: name.to_string(),
                is_pub: true,
                is_extern: false,
                is_inline: true,
                params: params.into_iter().map(|p| (p, TargetTy::AnyType)).collect(),
                return_ty,
                body: Some(block),
            }
        }
    }
}

/// A macro is function-like iff the first token after its name is `(`
/// immediately adjacent, with no whitespace; otherwise it's object-like.
/// `MacroDef::raw_source` starts exactly at the position following the
/// macro name, so this is a direct prefix check.
pub fn is_function_like(def: &MacroDef) -> bool {
    def.raw_source.starts_with('(')
}

/// If function-like, splits `raw_source` into `(params) body`; the
/// parameter list is returned as the raw comma-separated identifier text
/// between the parens, already trimmed.
pub fn split_function_like(raw_source: &str) -> Option<(Vec<String>, &str)> {
    let rest = raw_source.strip_prefix('(')?;
    let close = rest.find(')')?;
    let (params_text, body) = rest.split_at(close);
    let body = &body[1..]; // drop the ')'
    let params = params_text
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    Some((params, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use transc_front::SourceLoc;
    use transc_target::render;

    fn loc() -> SourceLoc {
        SourceLoc { file: "test.h".into(), line: 1, column: 1 }
    }

    #[test]
    fn function_like_square_macro_becomes_inline_fn() {
        let def = MacroDef { name: "SQ".into(), loc: loc(), raw_source: "(x) ((x)*(x))".into() };
        assert!(is_function_like(&def));
        let translation = translate_macro(&def).expect("parses");
        let node = macro_translation_to_node(&def.name, translation);
        let text = render(std::slice::from_ref(&node));
        assert_eq!(text, "pub inline fn SQ(x: anytype) @TypeOf((x)*(x)) { return (x)*(x); }\n");
    }

    #[test]
    fn object_like_octal_mode_macro() {
        let def = MacroDef { name: "MODE".into(), loc: loc(), raw_source: "0755".into() };
        assert!(!is_function_like(&def));
        let translation = translate_macro(&def).expect("parses");
        let node = macro_translation_to_node(&def.name, translation);
        assert_eq!(render(std::slice::from_ref(&node)), "pub const MODE = 0o755;\n");
    }
}
