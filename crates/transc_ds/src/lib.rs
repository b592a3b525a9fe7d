//! Low-level plumbing shared by the translator crates: fast hash-map
//! aliases keyed the way the teacher's compiler crates key theirs.
//! Mirrors `librustc_data_structures` in the teacher tree, collapsed to
//! just the hash-map aliases since transc has no need for the rest of it.

use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

/// A `HashMap` keyed by the non-cryptographic `FxHash` used throughout the
/// teacher's compiler crates, where keys are small and adversarial input
/// is not a concern.
pub type FxHashMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A `HashSet` keyed the same way as [`FxHashMap`].
pub type FxHashSet<T> = std::collections::HashSet<T, BuildHasherDefault<FxHasher>>;
