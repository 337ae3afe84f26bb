use serde::{Serialize, Serializer};
use std::fmt;

/// Hierarchical location of a declaration: the sequence of class/function
/// names from the module root down to the declaration itself.
///
/// The module root is the empty path, distinct from every named path and
/// (because lookups return `Option`) from "no address at all". Addresses are
/// the join key between the implementation tree and the stub tree: the same
/// declaration produces the same address in both, even though the two trees
/// are independent objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    segments: Vec<String>,
}

impl Address {
    /// The module root address.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build an address from name segments.
    pub fn from_segments(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<module>")
        } else {
            f.write_str(&self.segments.join("."))
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Depth tracker shared in discipline (but never in instance) by the
/// collector and the rewrite engine.
///
/// Push on entering a class or function, pop on leaving it; `current()`
/// snapshots the path into an owned [`Address`], so map keys never alias
/// the live stack.
#[derive(Debug, Default)]
pub struct AddressTracker {
    segments: Vec<String>,
}

impl AddressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a named declaration.
    pub fn push(&mut self, name: &str) {
        self.segments.push(name.to_string());
    }

    /// Leave the current declaration. Pops exactly one name.
    pub fn pop(&mut self) {
        debug_assert!(!self.segments.is_empty(), "pop on an empty address stack");
        self.segments.pop();
    }

    /// Snapshot the current path.
    pub fn current(&self) -> Address {
        Address {
            segments: self.segments.clone(),
        }
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}
