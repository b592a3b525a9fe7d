/// One lexeme out of a macro body, produced by running a C tokenizer over
/// the macro body source and skipping line/block comments.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// True if at least one space/tab separated this token from the
    /// previous one — needed by the parser's cast-vs-paren and
    /// string-concatenation-fusion rules.
    pub preceded_by_space: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// Raw literal text, not yet value-parsed: normalization (octal/hex
    /// prefix rewriting, suffix classification) is the parser's job, not
    /// the tokenizer's.
    Number(String),
    Str(String),
    Char(String),
    Punct(&'static str),
    Eof,
}

const PUNCTUATION: &[&str] = &[
    "<<=", ">>=", "...", "->", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", "++", "--", "+", "-", "*", "/", "%", "&", "|", "^", "~", "!",
    "<", ">", "=", "?", ":", ",", ".", "(", ")", "[", "]", "{", "}",
];

/// Tokenizes a macro body to EOL, dropping comments. Mirrors the shape
/// of `libsyntax`'s lexer: one pass, byte-indexed, no backtracking.
pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut i = 0;
    let mut tokens = Vec::new();
    let mut had_space = true; // leading position counts as "preceded by space"

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c == ' ' || c == '\t' {
            had_space = true;
            i += 1;
            continue;
        }
        if c == '\\' && bytes.get(i + 1) == Some(&b'\n') {
            // line continuation
            had_space = true;
            i += 2;
            continue;
        }
        if c == '\n' {
            break; // macro bodies are single logical lines by this point
        }
        if c == '/' && bytes.get(i + 1) == Some(&b'/') {
            break; // line comment runs to EOL
        }
        if c == '/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            had_space = true;
            continue;
        }

        let start = i;
        if c.is_ascii_alphabetic() || c == '_' {
            while i < bytes.len() && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
            {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(source[start..i].to_string()),
                preceded_by_space: had_space,
            });
            had_space = false;
            continue;
        }
        if c.is_ascii_digit() || (c == '.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            i += 1;
            // hex prefix
            if c == '0' && matches!(bytes.get(i), Some(b'x') | Some(b'X')) {
                i += 1;
                while i < bytes.len() && (bytes[i] as char).is_ascii_hexdigit() {
                    i += 1;
                }
            } else {
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_digit() || bytes[i] == b'.' || bytes[i] == b'e'
                        || bytes[i] == b'E'
                        || ((bytes[i] == b'+' || bytes[i] == b'-')
                            && matches!(bytes.get(i.wrapping_sub(1)), Some(b'e') | Some(b'E'))))
                {
                    i += 1;
                }
            }
            // integer/float suffix letters (u, l, f, etc.)
            while i < bytes.len() && (bytes[i] as char).is_ascii_alphabetic() {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number(source[start..i].to_string()),
                preceded_by_space: had_space,
            });
            had_space = false;
            continue;
        }
        if c == '"' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            let text = source[start + 1..i].to_string();
            i = (i + 1).min(bytes.len());
            tokens.push(Token { kind: TokenKind::Str(text), preceded_by_space: had_space });
            had_space = false;
            continue;
        }
        if c == '\'' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'\'' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            let text = source[start + 1..i].to_string();
            i = (i + 1).min(bytes.len());
            tokens.push(Token { kind: TokenKind::Char(text), preceded_by_space: had_space });
            had_space = false;
            continue;
        }

        let rest = &source[start..];
        if let Some(&p) = PUNCTUATION.iter().find(|p| rest.starts_with(*p)) {
            i += p.len();
            tokens.push(Token { kind: TokenKind::Punct(p), preceded_by_space: had_space });
            had_space = false;
            continue;
        }

        // Unknown byte: skip it rather than failing the whole tokenizer.
        i += 1;
        had_space = true;
    }

    tokens.push(Token { kind: TokenKind::Eof, preceded_by_space: had_space });
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_function_like_body() {
        let toks = tokenize("((x)*(x))");
        let kinds: Vec<_> = toks.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Punct("("),
                TokenKind::Punct("("),
                TokenKind::Ident("x".into()),
                TokenKind::Punct(")"),
                TokenKind::Punct("*"),
                TokenKind::Punct("("),
                TokenKind::Ident("x".into()),
                TokenKind::Punct(")"),
                TokenKind::Punct(")"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_block_and_line_comments() {
        let toks = tokenize("/* c */ 1 + 2 // trailing\n3");
        let kinds: Vec<_> = toks.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number("1".into()),
                TokenKind::Punct("+"),
                TokenKind::Number("2".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn octal_literal_lexes_as_one_number_token() {
        let toks = tokenize("0755");
        assert_eq!(toks[0].kind, TokenKind::Number("0755".into()));
    }
}
