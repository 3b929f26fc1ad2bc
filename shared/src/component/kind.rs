use std::fmt;

/// Stable numeric identifier for a component type, unique within a
/// replication session. Every peer must register the same kinds with the
/// same ids for payloads to be interpretable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind(u32);

impl ComponentKind {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ComponentKind({})", self.0)
    }
}
