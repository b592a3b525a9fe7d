//! A stand-in for the C front-end's semantic AST.
//!
//! Spec §6 treats the real front-end (loading a translation unit, walking
//! top-level decls, source-manager queries) as an external collaborator
//! this system only consumes. This crate is that collaborator's surface,
//! modeled closely enough that the rest of the workspace has something
//! concrete to lower — not a parser, not a type checker, just the shape of
//! the AST a semantic C front-end would have already produced.

mod decl;
mod expr;
mod qual_type;
mod stmt;

pub use decl::*;
pub use expr::*;
pub use qual_type::*;
pub use stmt::*;

/// A location in the original C source, as the front-end's source manager
/// would report it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLoc {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The front-end's stable identity for a declaration, independent of
/// redeclarations ("canonical declaration" in the GLOSSARY).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// A `#define` preprocessing entity, retrieved before the front-end
/// discarded macros in favor of its semantic AST. `raw_source` is exactly
/// what a tokenizer would run over (spec §4.F).
#[derive(Clone, Debug, PartialEq)]
pub struct MacroDef {
    pub name: String,
    pub loc: SourceLoc,
    pub raw_source: String,
}

/// One fully-parsed, semantically-resolved translation unit.
#[derive(Clone, Debug, Default)]
pub struct TranslationUnit {
    pub decls: Vec<CDecl>,
    pub macros: Vec<MacroDef>,
}
