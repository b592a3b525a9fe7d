use transc_ds::{FxHashMap, FxHashSet};
use transc_front::{CDecl, DeclId};
use transc_target::Node;

/// Target reserved words and primitive type names. Spec §4.A: "Primitive-
/// type names ... are always treated as collisions at any scope."
pub const RESERVED_WORDS: &[&str] = &[
    "align", "and", "anyframe", "anytype", "asm", "break", "catch", "comptime", "const",
    "continue", "defer", "else", "enum", "errdefer", "error", "export", "extern", "fn", "for",
    "if", "inline", "noalias", "nosuspend", "noreturn", "opaque", "or", "orelse", "packed", "pub",
    "resume", "return", "linksection", "struct", "suspend", "switch", "test", "threadlocal",
    "try", "union", "unreachable", "usingnamespace", "var", "volatile", "while",
];

pub const PRIMITIVE_TYPE_NAMES: &[&str] = &[
    "i8",
    "u8",
    "i16",
    "u16",
    "i32",
    "u32",
    "i64",
    "u64",
    "i128",
    "u128",
    "isize",
    "usize",
    "c_short",
    "c_ushort",
    "c_int",
    "c_uint",
    "c_long",
    "c_ulong",
    "c_longlong",
    "c_ulonglong",
    "c_longdouble",
    "c_void",
    "f16",
    "f32",
    "f64",
    "f128",
    "bool",
    "void",
    "anytype",
    "anyopaque",
    "noreturn",
    "type",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name) || PRIMITIVE_TYPE_NAMES.contains(&name)
}

/// Process-wide translation state (spec §3 "Context"). The output arena
/// and bookkeeping allocator spec §3/§5 describe are folded into plain
/// ownership here (`Vec`/`Box`/`String`); see DESIGN.md for why that's a
/// faithful simplification rather than a missing feature.
pub struct Context {
    /// Canonical C decl identity → the Target name assigned to it.
    /// Write-once: checked before translating a decl to avoid double-work.
    pub decl_table: FxHashMap<DeclId, String>,
    /// Canonical record/enum identities demoted to opaque.
    pub opaque_demoted: FxHashSet<DeclId>,
    /// Pre-populated by a first pass over all decls and macros, so early
    /// mangling decisions don't collide with names not yet visited.
    pub global_names: FxHashSet<String>,
    /// Names already actually committed at root scope (as opposed to
    /// merely *intended*, which is what `global_names` tracks).
    pub root_committed_names: FxHashSet<String>,
    /// Pending `struct Foo` / `Foo` alias pairs to flush at the end.
    pub pending_aliases: Vec<(String, String)>,
    pub mangle_counter: u32,
    pub root_nodes: Vec<Node>,
    /// Canonical decl identity → full decl, so a type reference that only
    /// carries a `DeclId` (`CType::Record`/`CType::Enum`) can reach the
    /// definition it names. Populated once before translation begins.
    pub decls_by_id: FxHashMap<DeclId, CDecl>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            decl_table: FxHashMap::default(),
            opaque_demoted: FxHashSet::default(),
            global_names: FxHashSet::default(),
            root_committed_names: FxHashSet::default(),
            pending_aliases: Vec::new(),
            mangle_counter: 0,
            root_nodes: Vec::new(),
            decls_by_id: FxHashMap::default(),
        }
    }

    /// spec §4.A `contains_now`: bound right now at root, no lookahead
    /// into `global_names`.
    pub fn contains_now(&self, name: &str) -> bool {
        is_reserved(name) || self.root_committed_names.contains(name)
    }

    /// spec §4.A `make_mangled_name`, specialised to root-level decl
    /// naming (block-scope mangling goes through `Session::mangle`).
    pub fn make_root_mangled_name(&mut self, desired: &str) -> String {
        if !self.contains_now(desired) {
            self.root_committed_names.insert(desired.to_string());
            return desired.to_string();
        }
        loop {
            self.mangle_counter += 1;
            let candidate = format!("{}_{}", desired, self.mangle_counter);
            if !self.contains_now(&candidate) {
                self.root_committed_names.insert(candidate.clone());
                return candidate;
            }
        }
    }

    pub fn was_translated(&self, id: DeclId) -> bool {
        self.decl_table.contains_key(&id)
    }

    pub fn queue_alias(&mut self, alias: String, target: String) {
        self.pending_aliases.push((alias, target));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_mangling_avoids_committed_collisions() {
        let mut ctx = Context::new();
        assert_eq!(ctx.make_root_mangled_name("foo"), "foo");
        assert_eq!(ctx.make_root_mangled_name("foo"), "foo_1");
        assert_eq!(ctx.make_root_mangled_name("foo"), "foo_2");
    }

    #[test]
    fn primitive_type_names_always_collide() {
        let mut ctx = Context::new();
        assert_eq!(ctx.make_root_mangled_name("usize"), "usize_1");
    }
}
