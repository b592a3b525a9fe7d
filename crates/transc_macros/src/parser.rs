use crate::token::{Token, TokenKind};
use transc_target::{Block, Expr, NumBase, NumberLiteral, Stmt, TargetTy};

#[derive(Debug, Clone, PartialEq)]
pub struct MacroParseError {
    pub message: String,
}

impl std::fmt::Display for MacroParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
impl std::error::Error for MacroParseError {}

fn err(message: impl Into<String>) -> MacroParseError {
    MacroParseError { message: message.into() }
}

/// The translation of one macro: an object-like macro becomes a single
/// expression, a function-like macro an expression plus its parameter
/// names, since it's emitted as an inline function.
pub enum MacroTranslation {
    ObjectLike(Expr),
    FunctionLike { params: Vec<String>, body: Expr },
}

pub fn parse_macro_body(
    tokens: &[Token],
    params: Option<&[String]>,
) -> Result<Expr, MacroParseError> {
    let mut parser = Parser { tokens, pos: 0, params: params.unwrap_or(&[]) };
    if parser.at_eof() {
        return Err(err("empty macro body"));
    }
    let expr = parser.parse_expr()?;
    if !parser.at_eof() {
        return Err(err(format!("unexpected trailing token {:?}", parser.peek_kind())));
    }
    // Macro bodies are conventionally fully parenthesized (`#define SQ(x)
    // ((x)*(x))`) to protect against operator-precedence surprises at the
    // call site; that outer layer is redundant once the body is a single
    // parsed expression, so peel it before handing the body to the
    // object-like `const` or function-like `inline fn` emitter.
    Ok(match expr {
        Expr::Paren(inner) => *inner,
        other => other,
    })
}

const TYPE_KEYWORDS: &[&str] =
    &["void", "bool", "char", "short", "int", "long", "float", "double", "signed", "unsigned"];

/// Combinations of the C type-keyword run map to a fixed Target
/// identifier. `short`/`unsigned short` round the table out the same way
/// the statement lowerer's builtin table does, so they're included for
/// consistency (documented as a deliberate completion in DESIGN.md).
fn map_type_keywords(words: &[String]) -> Option<TargetTy> {
    let mut signed = false;
    let mut unsigned = false;
    let mut long_count = 0u32;
    let mut short = false;
    let mut base: Option<&str> = None;
    for w in words {
        match w.as_str() {
            "signed" => signed = true,
            "unsigned" => unsigned = true,
            "long" => long_count += 1,
            "short" => short = true,
            "void" | "bool" | "char" | "int" | "float" | "double" => base = Some(w.as_str()),
            _ => return None,
        }
    }
    let base = base.unwrap_or("int");
    Some(match base {
        "void" => TargetTy::ident("c_void"),
        "bool" => TargetTy::ident("bool"),
        "char" => TargetTy::ident("u8"),
        "float" => TargetTy::ident("f32"),
        "double" if long_count > 0 => TargetTy::ident("c_longdouble"),
        "double" => TargetTy::ident("f64"),
        "int" | _ => {
            if short {
                TargetTy::ident(if unsigned { "c_ushort" } else { "c_short" })
            } else if long_count >= 2 {
                TargetTy::ident(if unsigned { "c_ulonglong" } else { "c_longlong" })
            } else if long_count == 1 {
                TargetTy::ident(if unsigned { "c_ulong" } else { "c_long" })
            } else if unsigned {
                TargetTy::ident("c_uint")
            } else {
                let _ = signed;
                TargetTy::ident("c_int")
            }
        }
    })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    params: &'a [String],
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_ahead_punct(&self, n: usize, p: &str) -> bool {
        match self.tokens.get(self.pos + n) {
            Some(Token { kind: TokenKind::Punct(q), .. }) => *q == p,
            _ => false,
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn at_punct(&self, p: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Punct(q) if *q == p)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), MacroParseError> {
        if self.at_punct(p) {
            self.advance();
            Ok(())
        } else {
            Err(err(format!("expected '{}', found {:?}", p, self.peek_kind())))
        }
    }

    // parse_expr → comma-separated cond-exprs (block-valued if multiple)
    fn parse_expr(&mut self) -> Result<Expr, MacroParseError> {
        let mut parts = vec![self.parse_cond_expr()?];
        while self.at_punct(",") {
            self.advance();
            parts.push(self.parse_cond_expr()?);
        }
        if parts.len() == 1 {
            return Ok(parts.pop().unwrap());
        }
        let result = parts.pop().unwrap();
        let mut block = Block::new();
        for p in parts {
            block.push(Stmt::Expr(p));
        }
        block.result = Some(Box::new(result));
        Ok(Expr::Block(block))
    }

    // parse_cond_expr → or ? or : cond_expr
    fn parse_cond_expr(&mut self) -> Result<Expr, MacroParseError> {
        let cond = self.parse_or()?;
        if self.at_punct("?") {
            self.advance();
            let then = self.parse_expr()?;
            self.expect_punct(":")?;
            let els = self.parse_cond_expr()?;
            return Ok(Expr::if_expr(to_bool_operand(cond), then, els));
        }
        Ok(cond)
    }

    fn parse_or(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_and()?;
        while self.at_punct("||") {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::bin("||", to_bool_operand(lhs), to_bool_operand(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_bit_or()?;
        while self.at_punct("&&") {
            self.advance();
            let rhs = self.parse_bit_or()?;
            lhs = Expr::bin("&&", to_bool_operand(lhs), to_bool_operand(rhs));
        }
        Ok(lhs)
    }

    fn parse_bit_or(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_bit_xor()?;
        while self.at_punct("|") {
            self.advance();
            let rhs = self.parse_bit_xor()?;
            lhs = Expr::bin("|", to_int_operand(lhs), to_int_operand(rhs));
        }
        Ok(lhs)
    }

    fn parse_bit_xor(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_bit_and()?;
        while self.at_punct("^") {
            self.advance();
            let rhs = self.parse_bit_and()?;
            lhs = Expr::bin("^", to_int_operand(lhs), to_int_operand(rhs));
        }
        Ok(lhs)
    }

    fn parse_bit_and(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_eq()?;
        while self.at_punct("&") {
            self.advance();
            let rhs = self.parse_eq()?;
            lhs = Expr::bin("&", to_int_operand(lhs), to_int_operand(rhs));
        }
        Ok(lhs)
    }

    fn parse_eq(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_rel()?;
        loop {
            let op = if self.at_punct("==") {
                "=="
            } else if self.at_punct("!=") {
                "!="
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_rel()?;
            lhs = Expr::bin(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_rel(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_shift()?;
        loop {
            let op = if self.at_punct("<") {
                "<"
            } else if self.at_punct("<=") {
                "<="
            } else if self.at_punct(">") {
                ">"
            } else if self.at_punct(">=") {
                ">="
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_shift()?;
            lhs = Expr::bin(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_shift(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_add()?;
        loop {
            let op = if self.at_punct("<<") {
                "<<"
            } else if self.at_punct(">>") {
                ">>"
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_add()?;
            lhs = Expr::bin(op, to_int_operand(lhs), to_int_operand(rhs));
        }
        Ok(lhs)
    }

    fn parse_add(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = if self.at_punct("+") {
                "+"
            } else if self.at_punct("-") {
                "-"
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = Expr::bin(op, to_int_operand(lhs), to_int_operand(rhs));
        }
        Ok(lhs)
    }

    // parse_mul → unary ((* | / | %) unary)* — with cast-vs-multiply
    // disambiguation handled where the ambiguity is structurally
    // decidable: at the closing paren of what might be a type-run (see
    // `try_parse_type_cast`). By the time control reaches here the
    // parenthesized operand has already been resolved one way or the
    // other, so this loop is a plain left-to-right climb.
    fn parse_mul(&mut self) -> Result<Expr, MacroParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = if self.at_punct("*") {
                "*"
            } else if self.at_punct("/") {
                "/"
            } else if self.at_punct("%") {
                "%"
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::bin(op, to_int_operand(lhs), to_int_operand(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, MacroParseError> {
        if self.at_punct("!") {
            self.advance();
            return Ok(Expr::unary("!", to_bool_operand(self.parse_unary()?)));
        }
        if self.at_punct("-") {
            self.advance();
            return Ok(Expr::unary("-", self.parse_unary()?));
        }
        if self.at_punct("+") {
            self.advance();
            return self.parse_unary();
        }
        if self.at_punct("~") {
            self.advance();
            return Ok(Expr::unary("~", to_int_operand(self.parse_unary()?)));
        }
        if self.at_punct("*") {
            self.advance();
            return Ok(Expr::deref(self.parse_unary()?));
        }
        if self.at_punct("&") {
            self.advance();
            return Ok(Expr::addr_of(self.parse_unary()?));
        }
        if let TokenKind::Ident(name) = self.peek_kind() {
            if name == "sizeof" {
                self.advance();
                return self.parse_sizeof_or_alignof("sizeOf");
            }
            if name == "alignof" || name == "_Alignof" {
                self.advance();
                return self.parse_sizeof_or_alignof("alignOf");
            }
        }
        self.parse_postfix()
    }

    fn parse_sizeof_or_alignof(&mut self, intrinsic: &'static str) -> Result<Expr, MacroParseError> {
        if self.at_punct("(") {
            if let Some(ty) = self.try_parse_type_cast_paren()? {
                return Ok(Expr::intrinsic(intrinsic, vec![Expr::type_tag(ty)]));
            }
        }
        let operand = self.parse_unary()?;
        Ok(Expr::intrinsic(intrinsic, vec![operand]))
    }

    fn parse_postfix(&mut self) -> Result<Expr, MacroParseError> {
        let mut e = self.parse_primary()?;
        loop {
            if self.at_punct(".") {
                self.advance();
                let name = self.expect_ident()?;
                e = Expr::field(e, name);
            } else if self.at_punct("->") {
                self.advance();
                let name = self.expect_ident()?;
                e = Expr::field(Expr::deref(e), name);
            } else if self.at_punct("[") {
                self.advance();
                let idx = self.parse_expr()?;
                self.expect_punct("]")?;
                e = Expr::index(e, idx);
            } else if self.at_punct("(") {
                self.advance();
                let mut args = Vec::new();
                if !self.at_punct(")") {
                    args.push(self.parse_cond_expr()?);
                    while self.at_punct(",") {
                        self.advance();
                        args.push(self.parse_cond_expr()?);
                    }
                }
                self.expect_punct(")")?;
                e = Expr::call(e, args);
            } else {
                break;
            }
        }
        Ok(e)
    }

    fn expect_ident(&mut self) -> Result<String, MacroParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(err(format!("expected identifier, found {:?}", other))),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, MacroParseError> {
        match self.peek_kind().clone() {
            TokenKind::Number(text) => {
                self.advance();
                Ok(normalize_numeric_literal(&text))
            }
            TokenKind::Str(text) => {
                self.advance();
                let mut acc = Expr::Str(reencode_escapes(&text));
                // Fuse adjacent string literals (and the macro-concat
                // idiom of a trailing identifier) with `++`.
                loop {
                    match self.peek_kind().clone() {
                        TokenKind::Str(next) => {
                            self.advance();
                            acc = Expr::bin("++", acc, Expr::Str(reencode_escapes(&next)));
                        }
                        TokenKind::Ident(name) if self.params.contains(&name) => {
                            self.advance();
                            acc = Expr::bin("++", acc, Expr::ident(name));
                        }
                        _ => break,
                    }
                }
                Ok(acc)
            }
            TokenKind::Char(text) => {
                self.advance();
                Ok(Expr::int(char_literal_value(&text)))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::ident(name))
            }
            TokenKind::Punct("(") => {
                if let Some(ty) = self.try_parse_type_cast_paren()? {
                    let operand = self.parse_unary()?;
                    return Ok(Expr::intrinsic("as", vec![Expr::type_tag(ty), operand]));
                }
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(Expr::paren(inner))
            }
            other => Err(err(format!("unexpected token {:?}", other))),
        }
    }

    /// Attempts to parse `(` type-keyword-run `*`* `)` as a cast's type
    /// operand. Returns `Ok(None)` and rewinds if the parenthesized
    /// content isn't a type-keyword run, so the caller falls back to
    /// parsing an ordinary parenthesized expression.
    fn try_parse_type_cast_paren(&mut self) -> Result<Option<TargetTy>, MacroParseError> {
        let save = self.pos;
        self.advance(); // '('
        let mut words = Vec::new();
        while let TokenKind::Ident(name) = self.peek_kind() {
            if TYPE_KEYWORDS.contains(&name.as_str()) {
                words.push(name.clone());
                self.advance();
            } else {
                break;
            }
        }
        if words.is_empty() {
            self.pos = save;
            return Ok(None);
        }
        let Some(mut ty) = map_type_keywords(&words) else {
            self.pos = save;
            return Ok(None);
        };
        // A `*` here forms a pointer level only when immediately followed
        // by `)`, to disambiguate a cast from a parenthesized multiply.
        while self.at_punct("*") && self.peek_ahead_punct(1, ")") {
            self.advance();
            ty = TargetTy::c_ptr(false, ty);
        }
        if self.at_punct(")") {
            self.advance();
            Ok(Some(ty))
        } else {
            self.pos = save;
            Ok(None)
        }
    }
}

/// Wraps an operand of a bitwise/shift/arithmetic operator in
/// `@boolToInt` if it is itself a boolean result.
fn to_int_operand(e: Expr) -> Expr {
    if expr_is_bool_result(&e) {
        Expr::intrinsic("boolToInt", vec![e])
    } else {
        e
    }
}

/// The converse: wraps an operand of `&&`/`||`/`?:` in a `!= 0` style
/// int-to-bool conversion unless it's already boolean-valued.
fn to_bool_operand(e: Expr) -> Expr {
    if expr_is_bool_result(&e) {
        e
    } else {
        Expr::bin("!=", e, Expr::int(0))
    }
}

fn expr_is_bool_result(e: &Expr) -> bool {
    match e {
        Expr::Bool(_) => true,
        Expr::Binary { op, .. } => {
            matches!(*op, "==" | "!=" | "<" | "<=" | ">" | ">=" | "&&" | "||")
        }
        Expr::Unary { op: "!", .. } => true,
        Expr::Paren(inner) => expr_is_bool_result(inner),
        _ => false,
    }
}

fn char_literal_value(text: &str) -> i128 {
    let decoded = reencode_escapes(text);
    decoded.chars().next().map(|c| c as i128).unwrap_or(0)
}

/// Re-encodes C character escapes for Target string syntax: `\a \b \f \v`
/// become `\x07 \x08 \x0C \x0B`; octal escapes become `\xNN`; hex escapes
/// are width-normalised to two digits.
fn reencode_escapes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 >= bytes.len() {
            out.push(bytes[i] as char);
            i += 1;
            continue;
        }
        match bytes[i + 1] {
            b'a' => {
                out.push_str("\\x07");
                i += 2;
            }
            b'b' => {
                out.push_str("\\x08");
                i += 2;
            }
            b'f' => {
                out.push_str("\\x0C");
                i += 2;
            }
            b'v' => {
                out.push_str("\\x0B");
                i += 2;
            }
            b'x' => {
                let mut j = i + 2;
                while j < bytes.len() && (bytes[j] as char).is_ascii_hexdigit() {
                    j += 1;
                }
                let digits = &s[i + 2..j];
                let value = u32::from_str_radix(digits, 16).unwrap_or(0);
                out.push_str(&format!("\\x{:02X}", value));
                i = j;
            }
            b'0'..=b'7' => {
                let mut j = i + 1;
                while j < bytes.len() && j < i + 4 && (b'0'..=b'7').contains(&bytes[j]) {
                    j += 1;
                }
                let digits = &s[i + 1..j];
                let value = u32::from_str_radix(digits, 8).unwrap_or(0);
                out.push_str(&format!("\\x{:02X}", value));
                i = j;
            }
            other => {
                out.push('\\');
                out.push(other as char);
                i += 2;
            }
        }
    }
    out
}

/// Normalizes a C numeric literal token (octal/hex prefixes, integer and
/// float suffixes) into a Target number or float literal.
fn normalize_numeric_literal(text: &str) -> Expr {
    let lower = text.to_ascii_lowercase();
    if lower.contains('.') || (lower.contains('e') && !lower.starts_with("0x")) {
        return normalize_float_literal(text);
    }
    if lower.starts_with("0x") {
        let (digits, suffix) = split_int_suffix(&text[2..]);
        return wrap_int_suffix(Expr::Number(NumberLiteral {
            base: NumBase::Hex,
            digits: digits.to_string(),
            negative: false,
        }), suffix);
    }
    if lower.starts_with('0') && lower.len() > 1 && lower.as_bytes()[1].is_ascii_digit() {
        let (digits, suffix) = split_int_suffix(&text[1..]);
        return wrap_int_suffix(Expr::Number(NumberLiteral {
            base: NumBase::Octal,
            digits: digits.to_string(),
            negative: false,
        }), suffix);
    }
    let (digits, suffix) = split_int_suffix(text);
    wrap_int_suffix(
        Expr::Number(NumberLiteral { base: NumBase::Decimal, digits: digits.to_string(), negative: false }),
        suffix,
    )
}

fn split_int_suffix(text: &str) -> (&str, &str) {
    let end = text.len() - text.chars().rev().take_while(|c| c.is_ascii_alphabetic()).count();
    (&text[..end], &text[end..])
}

fn wrap_int_suffix(lit: Expr, suffix: &str) -> Expr {
    let s = suffix.to_ascii_lowercase();
    let ty = match s.as_str() {
        "" => return lit,
        "u" => "c_uint",
        "l" => "c_long",
        "ul" | "lu" => "c_ulong",
        "ll" => "c_longlong",
        "ull" | "llu" => "c_ulonglong",
        _ => return lit,
    };
    Expr::intrinsic("as", vec![Expr::type_tag(TargetTy::ident(ty)), lit])
}

fn normalize_float_literal(text: &str) -> Expr {
    let (mantissa, suffix) = split_int_suffix(text);
    let s = suffix.to_ascii_lowercase();
    match s.as_str() {
        "f" => Expr::intrinsic(
            "as",
            vec![Expr::type_tag(TargetTy::ident("f32")), Expr::Float(mantissa.to_string())],
        ),
        "l" => Expr::intrinsic(
            "as",
            vec![Expr::type_tag(TargetTy::ident("c_longdouble")), Expr::Float(mantissa.to_string())],
        ),
        _ => Expr::Float(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn parse(src: &str) -> Expr {
        let toks = tokenize(src);
        parse_macro_body(&toks, None).expect("should parse")
    }

    #[test]
    fn square_macro_body() {
        let e = parse("((x)*(x))");
        assert_eq!(
            e,
            Expr::bin("*", Expr::paren(Expr::ident("x")), Expr::paren(Expr::ident("x")))
        );
    }

    #[test]
    fn octal_literal_normalizes() {
        let e = parse("0755");
        assert_eq!(
            e,
            Expr::Number(NumberLiteral { base: NumBase::Octal, digits: "755".into(), negative: false })
        );
    }

    #[test]
    fn hex_literal_normalizes() {
        let e = parse("0XFF");
        assert_eq!(
            e,
            Expr::Number(NumberLiteral { base: NumBase::Hex, digits: "FF".into(), negative: false })
        );
    }

    #[test]
    fn unsigned_suffix_wraps_in_as() {
        let e = parse("5u");
        assert_eq!(
            e,
            Expr::intrinsic(
                "as",
                vec![
                    Expr::type_tag(TargetTy::ident("c_uint")),
                    Expr::Number(NumberLiteral {
                        base: NumBase::Decimal,
                        digits: "5".into(),
                        negative: false
                    })
                ]
            )
        );
    }

    #[test]
    fn bitwise_or_of_comparisons_gets_bool_to_int() {
        let e = parse("(a == 1) | (b == 2)");
        match e {
            Expr::Binary { op: "|", lhs, rhs } => {
                assert!(matches!(*lhs, Expr::Intrinsic { name: "boolToInt", .. }));
                assert!(matches!(*rhs, Expr::Intrinsic { name: "boolToInt", .. }));
            }
            other => panic!("expected bitwise or, got {:?}", other),
        }
    }

    #[test]
    fn pointer_cast_with_star_before_close_paren() {
        let e = parse("(unsigned char *)p");
        assert!(matches!(e, Expr::Intrinsic { name: "as", .. }));
    }
}
