use crate::{Block, Expr, NumBase, Node, Stmt, TargetTy};

/// Renders a finished root node list to Target source text. Deliberately
/// not a pretty-printer (spec §1: "does not aim to produce idiomatic
/// Target code") — one top-level decl per line, no alignment, no
/// reflowing.
pub fn render(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out);
        out.push('\n');
    }
    out
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Preamble => {
            out.push_str("usingnamespace @import(\"builtins\");\n");
        }
        Node::ConstDecl { name, is_pub, ty, value } => {
            push_pub(out, *is_pub);
            out.push_str("const ");
            out.push_str(name);
            if let Some(ty) = ty {
                out.push_str(": ");
                render_ty(ty, out);
            }
            out.push_str(" = ");
            render_expr(value, out);
            out.push(';');
        }
        Node::VarDecl { name, is_pub, mutable, is_extern, ty, init, align } => {
            push_pub(out, *is_pub);
            if *is_extern {
                out.push_str("extern ");
            }
            out.push_str(if *mutable { "var " } else { "const " });
            out.push_str(name);
            out.push_str(": ");
            render_ty(ty, out);
            if let Some(align) = align {
                out.push_str(&format!(" align({})", align));
            }
            if let Some(init) = init {
                out.push_str(" = ");
                render_expr(init, out);
            }
            out.push(';');
        }
        Node::FnDecl { name, is_pub, is_extern, is_inline, params, return_ty, body } => {
            push_pub(out, *is_pub);
            if *is_extern {
                out.push_str("extern ");
            }
            if *is_inline {
                out.push_str("inline ");
            }
            out.push_str("fn ");
            out.push_str(name);
            out.push('(');
            for (i, (pname, pty)) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(pname);
                out.push_str(": ");
                render_ty(pty, out);
            }
            out.push_str(") ");
            render_ty(return_ty, out);
            match body {
                Some(block) => {
                    out.push(' ');
                    render_block(block, out);
                }
                None => out.push(';'),
            }
        }
        Node::StructDecl { name, is_pub, fields, align } => {
            push_pub(out, *is_pub);
            out.push_str("const ");
            out.push_str(name);
            out.push_str(" = extern struct { ");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&field.name);
                out.push_str(": ");
                render_ty(&field.ty, out);
                if let Some(align) = field.align {
                    out.push_str(&format!(" align({})", align));
                }
            }
            out.push_str(" }");
            if let Some(align) = align {
                out.push_str(&format!(" align({})", align));
            }
            out.push(';');
        }
        Node::OpaqueDecl { name, is_pub } => {
            push_pub(out, *is_pub);
            out.push_str("const ");
            out.push_str(name);
            out.push_str(" = opaque {};");
        }
        Node::TagEnumDecl { name, is_pub, tag_ty, variants } => {
            push_pub(out, *is_pub);
            out.push_str("const ");
            out.push_str(name);
            out.push_str(" = enum(");
            render_ty(tag_ty, out);
            out.push_str(") { ");
            out.push_str(&variants.join(", "));
            out.push_str(" };");
        }
        Node::EnumConstSet { name, is_pub, tag_ty, consts } => {
            push_pub(out, *is_pub);
            out.push_str("const ");
            out.push_str(name);
            out.push_str("__tag = ");
            render_ty(tag_ty, out);
            out.push(';');
            for (cname, value) in consts {
                out.push('\n');
                push_pub(out, *is_pub);
                out.push_str("const ");
                out.push_str(cname);
                out.push_str(": ");
                render_ty(tag_ty, out);
                out.push_str(&format!(" = {};", value));
            }
        }
        Node::AliasDecl { name, target } => {
            out.push_str("pub const ");
            out.push_str(name);
            out.push_str(" = ");
            out.push_str(target);
            out.push(';');
        }
        Node::CompileErrorDecl { name, message } => {
            out.push_str("pub const ");
            out.push_str(name);
            out.push_str(" = @compileError(\"");
            out.push_str(&escape_str(message));
            out.push_str("\");");
        }
        Node::Commented { comment, inner } => {
            out.push_str("// ");
            out.push_str(comment);
            out.push('\n');
            render_node(inner, out);
        }
    }
}

fn push_pub(out: &mut String, is_pub: bool) {
    if is_pub {
        out.push_str("pub ");
    }
}

fn render_ty(ty: &TargetTy, out: &mut String) {
    match ty {
        TargetTy::Ident(name) => out.push_str(name),
        TargetTy::Optional(inner) => {
            out.push('?');
            render_ty(inner, out);
        }
        TargetTy::SinglePtr { is_const, elem } => {
            out.push('*');
            if *is_const {
                out.push_str("const ");
            }
            render_ty(elem, out);
        }
        TargetTy::CPtr { is_const, elem } => {
            out.push_str("[*c]");
            if *is_const {
                out.push_str("const ");
            }
            render_ty(elem, out);
        }
        TargetTy::Array { len, elem } => {
            out.push('[');
            out.push_str(&len.to_string());
            out.push(']');
            render_ty(elem, out);
        }
        TargetTy::Opaque => out.push_str("opaque {}"),
        TargetTy::FnProto { params, ret } => {
            out.push_str("fn (");
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_ty(p, out);
            }
            out.push_str(") ");
            render_ty(ret, out);
        }
        TargetTy::AnyType => out.push_str("anytype"),
        TargetTy::TypeOf(expr) => {
            out.push_str("@TypeOf(");
            render_expr(expr, out);
            out.push(')');
        }
    }
}

fn render_expr(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Number(n) => {
            if n.negative {
                out.push('-');
            }
            match n.base {
                NumBase::Decimal => out.push_str(&n.digits),
                NumBase::Octal => out.push_str(&format!("0o{}", n.digits)),
                NumBase::Hex => out.push_str(&format!("0x{}", n.digits)),
            }
        }
        Expr::Float(text) => out.push_str(text),
        Expr::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Expr::Null => out.push_str("null"),
        Expr::Str(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Expr::Ident(name) => out.push_str(name),
        Expr::Binary { op, lhs, rhs } => {
            render_expr(lhs, out);
            out.push_str(op);
            render_expr(rhs, out);
        }
        Expr::Unary { op, operand } => {
            out.push_str(op);
            render_expr(operand, out);
        }
        Expr::Call { callee, args } => {
            render_expr(callee, out);
            out.push('(');
            render_arg_list(args, out);
            out.push(')');
        }
        Expr::Intrinsic { name, args } => {
            out.push('@');
            out.push_str(name);
            out.push('(');
            render_arg_list(args, out);
            out.push(')');
        }
        Expr::Field { base, name } => {
            render_expr(base, out);
            out.push('.');
            out.push_str(name);
        }
        Expr::Deref { base } => {
            render_expr(base, out);
            out.push_str(".*");
        }
        Expr::AddrOf { base } => {
            out.push('&');
            render_expr(base, out);
        }
        Expr::Index { base, index } => {
            render_expr(base, out);
            out.push('[');
            render_expr(index, out);
            out.push(']');
        }
        Expr::Paren(inner) => {
            out.push('(');
            render_expr(inner, out);
            out.push(')');
        }
        Expr::If { cond, then, els } => {
            out.push_str("if (");
            render_expr(cond, out);
            out.push_str(") ");
            render_expr(then, out);
            out.push_str(" else ");
            render_expr(els, out);
        }
        Expr::Assign { lhs, op, rhs } => {
            render_expr(lhs, out);
            out.push(' ');
            out.push_str(op);
            out.push(' ');
            render_expr(rhs, out);
        }
        Expr::Block(block) => render_block(block, out),
        Expr::TypeTag(ty) => render_ty(ty, out),
        Expr::StructLiteral(fields) => {
            out.push_str(".{ ");
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push('.');
                out.push_str(name);
                out.push_str(" = ");
                render_expr(value, out);
            }
            out.push_str(" }");
        }
        Expr::ArrayLiteral(elements) => {
            out.push_str(".{ ");
            render_arg_list(elements, out);
            out.push_str(" }");
        }
        Expr::OptionalUnwrap(inner) => {
            render_expr(inner, out);
            out.push_str(".?");
        }
        Expr::Repeat { elem_ty, filler, count } => {
            out.push_str("([_]");
            render_ty(elem_ty, out);
            out.push('{');
            render_expr(filler, out);
            out.push_str("}) ** ");
            render_expr(count, out);
        }
    }
}

fn render_arg_list(args: &[Expr], out: &mut String) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        render_expr(arg, out);
    }
}

fn render_block(block: &Block, out: &mut String) {
    if let Some(label) = &block.label {
        out.push_str(label);
        out.push_str(": ");
    }
    out.push_str("{ ");
    for stmt in &block.stmts {
        render_stmt(stmt, out);
        out.push(' ');
    }
    if let Some(result) = &block.result {
        let label = block.label.as_deref().unwrap_or("blk");
        out.push_str("break :");
        out.push_str(label);
        out.push(' ');
        render_expr(result, out);
        out.push_str("; ");
    }
    out.push('}');
}

fn render_stmt(stmt: &Stmt, out: &mut String) {
    match stmt {
        Stmt::Expr(e) => {
            render_expr(e, out);
            out.push(';');
        }
        Stmt::VarDecl { name, mutable, ty, init } => {
            out.push_str(if *mutable { "var " } else { "const " });
            out.push_str(name);
            if let Some(ty) = ty {
                out.push_str(": ");
                render_ty(ty, out);
            }
            if let Some(init) = init {
                out.push_str(" = ");
                render_expr(init, out);
            }
            out.push(';');
        }
        Stmt::Return(value) => {
            out.push_str("return");
            if let Some(v) = value {
                out.push(' ');
                render_expr(v, out);
            }
            out.push(';');
        }
        Stmt::Break { label, value } => {
            out.push_str("break");
            if let Some(label) = label {
                out.push_str(" :");
                out.push_str(label);
            }
            if let Some(value) = value {
                out.push(' ');
                render_expr(value, out);
            }
            out.push(';');
        }
        Stmt::Continue(label) => {
            out.push_str("continue");
            if let Some(label) = label {
                out.push_str(" :");
                out.push_str(label);
            }
            out.push(';');
        }
        Stmt::If { cond, then, els } => {
            out.push_str("if (");
            render_expr(cond, out);
            out.push_str(") ");
            render_block(then, out);
            if let Some(els) = els {
                out.push_str(" else ");
                render_block(els, out);
            }
        }
        Stmt::While { cond, continue_expr, body } => {
            out.push_str("while (");
            render_expr(cond, out);
            out.push(')');
            if let Some(inc) = continue_expr {
                out.push_str(" : (");
                render_expr(inc, out);
                out.push(')');
            }
            out.push(' ');
            render_block(body, out);
        }
        Stmt::Switch { cond, cases, else_body } => {
            out.push_str("switch (");
            render_expr(cond, out);
            out.push_str(") { ");
            for case in cases {
                render_arg_list(&case.values, out);
                out.push_str(" => ");
                render_block(&case.body, out);
                out.push_str(", ");
            }
            if let Some(else_body) = else_body {
                out.push_str("else => ");
                render_block(else_body, out);
                out.push_str(", ");
            }
            out.push('}');
        }
        Stmt::Block(block) => render_block(block, out),
    }
}

fn escape_str(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_typedef() {
        let node = Node::ConstDecl {
            name: "my_int".into(),
            is_pub: true,
            ty: None,
            value: Expr::ident("c_int"),
        };
        assert_eq!(render(&[node]), "pub const my_int = c_int;\n");
    }

    #[test]
    fn opaque_struct_with_warning() {
        let node = Node::commented(
            "bit-field member struct_S: demoted to opaque",
            Node::OpaqueDecl { name: "struct_S".into(), is_pub: true },
        );
        let text = render(&[node]);
        assert!(text.contains("demoted to opaque"));
        assert!(text.contains("pub const struct_S = opaque {};"));
    }

    #[test]
    fn octal_literal() {
        let node = Node::ConstDecl {
            name: "MODE".into(),
            is_pub: true,
            ty: None,
            value: Expr::Number(NumberLiteral {
                base: NumBase::Octal,
                digits: "755".into(),
                negative: false,
            }),
        };
        assert_eq!(render(&[node]), "pub const MODE = 0o755;\n");
    }
}
