//! The translation error lattice and the diagnostic machinery that turns
//! a recovered failure into a warning comment or a compile-error decl.
//! Grounded on `librustc_errors::diagnostic::Diagnostic`, trimmed down to
//! what a single-pass, no-suggestions translator needs.

use transc_front::SourceLoc;

/// A strict subset lattice: `OutOfMemory` is unrecoverable and propagates;
/// the two `Unsupported*` kinds are caught at declaration boundaries.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("out of memory")]
    OutOfMemory,

    #[error("{loc}: unsupported type: {message}")]
    UnsupportedType { loc: SourceLoc, message: String },

    #[error("{loc}: unsupported translation: {message}")]
    UnsupportedTranslation { loc: SourceLoc, message: String },
}

impl TranslateError {
    /// The two `Unsupported*` kinds are recoverable at a decl boundary;
    /// `OutOfMemory` is not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TranslateError::OutOfMemory)
    }

    pub fn message(&self) -> &str {
        match self {
            TranslateError::OutOfMemory => "out of memory",
            TranslateError::UnsupportedType { message, .. }
            | TranslateError::UnsupportedTranslation { message, .. } => message,
        }
    }

    pub fn loc(&self) -> Option<&SourceLoc> {
        match self {
            TranslateError::OutOfMemory => None,
            TranslateError::UnsupportedType { loc, .. }
            | TranslateError::UnsupportedTranslation { loc, .. } => Some(loc),
        }
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;

/// The warning-comment text that precedes a diagnostic decl, carrying the
/// C source location of the failing construct.
pub fn warning_comment(err: &TranslateError) -> String {
    match err.loc() {
        Some(loc) => format!("{}: {}", loc, err.message()),
        None => err.message().to_string(),
    }
}

/// Builds the `pub const <name> = @compileError("<message>");` decl for an
/// unrecoverable-at-this-decl translation failure, wrapped in its warning
/// comment.
pub fn compile_error_decl(name: impl Into<String>, err: &TranslateError) -> transc_target::Node {
    let inner = transc_target::Node::CompileErrorDecl {
        name: name.into(),
        message: err.message().to_string(),
    };
    transc_target::Node::commented(warning_comment(err), inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLoc {
        SourceLoc { file: "a.c".into(), line: 3, column: 5 }
    }

    #[test]
    fn compile_error_decl_carries_message_and_location() {
        let err = TranslateError::UnsupportedType { loc: loc(), message: "va_list".into() };
        let node = compile_error_decl("foo", &err);
        let text = transc_target::render(&[node]);
        assert!(text.contains("a.c:3:5"));
        assert!(text.contains("@compileError(\"va_list\")"));
    }
}
