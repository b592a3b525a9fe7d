//! The finalizer (spec §4.H): prepends the preamble, flushes the pending
//! tag-name aliases every record/enum translation queued, and hands back
//! the ordered node list the renderer consumes.

use crate::context::Context;
use transc_target::Node;

/// Consumes `ctx`'s accumulated root nodes and pending aliases, returning
/// the final node list in render order: preamble first, then every decl
/// in the order it was translated, then the flushed aliases.
pub fn finalize(ctx: &mut Context) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(ctx.root_nodes.len() + 1 + ctx.pending_aliases.len());
    nodes.push(Node::Preamble);
    nodes.append(&mut ctx.root_nodes);

    // spec §4.H: "skip any alias whose name is already a top-level
    // symbol" — a function or variable may have already claimed the tag
    // name a record/enum alias wanted.
    for (alias, target) in ctx.pending_aliases.drain(..) {
        if ctx.root_committed_names.contains(&alias) {
            tracing::warn!("alias {} -> {} skipped: name already committed at root scope", alias, target);
            continue;
        }
        ctx.root_committed_names.insert(alias.clone());
        nodes.push(Node::AliasDecl { name: alias, target });
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_is_always_first() {
        let mut ctx = Context::new();
        ctx.root_nodes.push(Node::AliasDecl { name: "a".into(), target: "b".into() });
        let nodes = finalize(&mut ctx);
        assert_eq!(nodes[0], Node::Preamble);
    }

    #[test]
    fn pending_alias_skipped_when_name_already_committed() {
        let mut ctx = Context::new();
        ctx.root_committed_names.insert("S".to_string());
        ctx.queue_alias("S".to_string(), "struct_S".to_string());
        let nodes = finalize(&mut ctx);
        assert!(!nodes.iter().any(|n| matches!(n, Node::AliasDecl { name, .. } if name == "S")));
    }

    #[test]
    fn pending_alias_flushed_when_unclaimed() {
        let mut ctx = Context::new();
        ctx.queue_alias("S".to_string(), "struct_S".to_string());
        let nodes = finalize(&mut ctx);
        assert!(nodes.iter().any(
            |n| matches!(n, Node::AliasDecl { name, target } if name == "S" && target == "struct_S")
        ));
    }
}
